//! Validation of a merged document against the shipped defaults

mod diagnostic;
mod validator;

pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use validator::{COMMON_PARAMS, INTERNAL_PARAMS, PROTECTED_CHECK, Validator};
