//! Snapshot parsing with error handling

use serde::de::DeserializeOwned;
use std::path::Path;

use crate::core::catalog::CatalogSnapshot;
use crate::core::config::ValidationPolicy;
use crate::entities::Quote;
use crate::yaml::diagnostics::{YamlError, YamlSyntaxError};

/// Parse YAML content into a typed value with located error messages
pub fn parse_yaml<T: DeserializeOwned>(content: &str, filename: &str) -> Result<T, YamlError> {
    serde_yml::from_str(content).map_err(|e| {
        YamlError::Syntax(YamlSyntaxError::from_serde_error(&e, content, filename))
    })
}

/// Parse YAML from a file path
pub fn parse_yaml_file<T: DeserializeOwned>(path: &Path) -> Result<T, YamlError> {
    let filename = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| YamlError::Io {
        path: filename.clone(),
        source,
    })?;
    parse_yaml(&content, &filename)
}

/// Load a catalog snapshot (`materials`, `labor`, `works` lists)
pub fn load_catalog(path: &Path) -> Result<CatalogSnapshot, YamlError> {
    let snapshot: CatalogSnapshot = parse_yaml_file(path)?;
    tracing::debug!(
        path = %path.display(),
        materials = snapshot.materials.len(),
        labor = snapshot.labor.len(),
        works = snapshot.works.len(),
        "loaded catalog"
    );
    Ok(snapshot)
}

/// Load a quote and recompute every cached total
pub fn load_quote(path: &Path, policy: ValidationPolicy) -> Result<Quote, YamlError> {
    let mut quote: Quote = parse_yaml_file(path)?;
    quote.recompute(policy).map_err(|source| YamlError::Pricing {
        path: path.display().to_string(),
        source,
    })?;
    Ok(quote)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_parse_invalid_vat_reports_location() {
        let yaml = "id: M1\nname: Sable\nunit: m3\nunit_price: 10\nvat_rate: 19\n";
        let result: Result<crate::entities::Material, _> = parse_yaml(yaml, "catalog.yaml");
        match result {
            Err(YamlError::Syntax(err)) => assert!(err.message().contains("VAT")),
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_quote_recomputes() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quote.yaml");
        std::fs::write(
            &path,
            "id: Q-1\nitems:\n  - id: L1\n    kind: work\n    designation: Carrelage\n    unit: m2\n    quantity: 25\n    unit_price: 45\n    vat_rate: 20\n",
        )
        .unwrap();

        let quote = load_quote(&path, ValidationPolicy::Reject).unwrap();
        assert_eq!(quote.total_ttc(), dec!(1350));
    }

    #[test]
    fn test_load_quote_with_invalid_discount() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("quote.yaml");
        std::fs::write(
            &path,
            "id: Q-1\nitems:\n  - id: L1\n    designation: Remise\n    quantity: 1\n    unit_price: 10\n    discount: 120\n",
        )
        .unwrap();

        assert!(matches!(
            load_quote(&path, ValidationPolicy::Reject),
            Err(YamlError::Pricing { .. })
        ));
        let quote = load_quote(&path, ValidationPolicy::Clamp).unwrap();
        assert_eq!(quote.total_ht(), dec!(0));
    }

    #[test]
    fn test_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/catalog.yaml"));
        assert!(matches!(result, Err(YamlError::Io { .. })));
    }
}
