//! YAML error diagnostics pointing at the offending line

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::core::error::PricingError;

/// YAML syntax or shape error with source location
#[derive(Debug, Error, Diagnostic)]
#[error("Invalid snapshot file: {message}")]
#[diagnostic(code(devis::yaml::syntax))]
pub struct YamlSyntaxError {
    #[source_code]
    src: NamedSource<String>,

    #[label("here")]
    span: SourceSpan,

    #[help]
    help: Option<String>,

    message: String,
}

impl YamlSyntaxError {
    /// Build from a serde_yml error
    pub fn from_serde_error(err: &serde_yml::Error, source: &str, filename: &str) -> Self {
        let (line, column) = err
            .location()
            .map(|loc| (loc.line(), loc.column()))
            .unwrap_or((1, 1));

        let offset = line_col_to_offset(source, line, column);
        let message = err.to_string();
        let help = generate_help(&message);

        Self {
            src: NamedSource::new(filename, source.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1)),
            help,
            message,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors raised while loading a catalog or quote snapshot
#[derive(Debug, Error, Diagnostic)]
pub enum YamlError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] YamlSyntaxError),

    #[error("Cannot read {path}: {source}")]
    #[diagnostic(code(devis::yaml::io))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file parsed but its content cannot be priced
    #[error("{path}: {source}")]
    #[diagnostic(code(devis::yaml::pricing))]
    Pricing {
        path: String,
        #[source]
        source: PricingError,
    },
}

/// Convert a 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let within = text
                .char_indices()
                .nth(column.saturating_sub(1))
                .map(|(i, _)| i)
                .unwrap_or(text.len().saturating_sub(1));
            return line_start + within;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Suggest a fix for the mistakes most often made in snapshot files
fn generate_help(message: &str) -> Option<String> {
    let msg = message.to_lowercase();

    if msg.contains("vat rate") {
        return Some("vat_rate must be one of 0, 7, 10, 14 or 20".to_string());
    }

    if msg.contains("missing field") {
        return Some(
            "Materials and labor need id, name, unit and unit_price; works need id, name and unit"
                .to_string(),
        );
    }

    if msg.contains("unknown variant") {
        return Some(
            "Line kinds are product, service, work, section or chapter".to_string(),
        );
    }

    if msg.contains("tab") {
        return Some("YAML requires spaces for indentation, not tabs.".to_string());
    }

    if msg.contains("decimal") || msg.contains("invalid type") {
        return Some("Amounts must be plain numbers, e.g. unit_price: 45.50".to_string());
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_col_to_offset() {
        let source = "line1\nline2\nline3";
        assert_eq!(line_col_to_offset(source, 1, 1), 0);
        assert_eq!(line_col_to_offset(source, 2, 1), 6);
        assert_eq!(line_col_to_offset(source, 3, 3), 14);
    }

    #[test]
    fn test_help_generation() {
        assert!(generate_help("Unknown VAT rate: 19%").is_some());
        assert!(generate_help("missing field `unit_price`").is_some());
        assert!(generate_help("unknown variant `option`").is_some());
        assert!(generate_help("some random error").is_none());
    }
}
