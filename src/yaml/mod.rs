//! YAML snapshot loading and error reporting

pub mod diagnostics;
pub mod parser;

pub use diagnostics::{YamlError, YamlSyntaxError};
pub use parser::{load_catalog, load_quote, parse_yaml, parse_yaml_file};
