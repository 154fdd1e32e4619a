//! Path matching and file scoping

pub mod matcher;
mod resolver;

pub use matcher::{Pattern, is_absolute, normalize, relative_to, to_absolute};
