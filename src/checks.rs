#![forbid(unsafe_code)]

//! Check state resolution and the check registry seam

mod registry;
mod state;

pub use registry::{CheckRegistry, StaticCheckRegistry};
pub use state::{CheckState, NewChecksPolicy, PENDING};
