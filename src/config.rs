//! Configuration documents, values and obsoletion data

pub mod document;
pub mod obsoletion;
pub mod value;

pub use document::{ConfigDocument, DOTFILE, DOTFILE_PREFIX};
pub use obsoletion::{NoObsoletion, ObsoleteConfigPolicy, ObsoletionTable};
pub use value::{ConfigValue, Options, RegexPattern};
