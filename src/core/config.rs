//! Engine configuration with layered hierarchy

use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::entities::vat::VatRate;

/// What to do with an out-of-range pricing input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum ValidationPolicy {
    /// Return a typed error
    #[default]
    Reject,
    /// Bring the value back into range and log a warning
    Clamp,
}

impl std::fmt::Display for ValidationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationPolicy::Reject => write!(f, "reject"),
            ValidationPolicy::Clamp => write!(f, "clamp"),
        }
    }
}

impl std::str::FromStr for ValidationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(ValidationPolicy::Reject),
            "clamp" => Ok(ValidationPolicy::Clamp),
            _ => Err(format!(
                "Invalid validation policy: {}. Use 'reject' or 'clamp'",
                s
            )),
        }
    }
}

/// Settings threaded into every engine call
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Handling of negative quantities, out-of-range discounts, ...
    pub validation: ValidationPolicy,

    /// Margin applied to works that do not set one
    pub default_margin: Decimal,

    /// VAT rate for lines created from catalog items that carry none
    pub default_vat: VatRate,

    /// Maximum nesting of sub-works before a rollup gives up
    pub max_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            validation: ValidationPolicy::Reject,
            default_margin: Decimal::from(20),
            default_vat: VatRate::Twenty,
            max_depth: 64,
        }
    }
}

/// On-disk representation; every field is optional so layers can be merged
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    validation: Option<ValidationPolicy>,
    default_margin: Option<Decimal>,
    default_vat: Option<VatRate>,
    max_depth: Option<usize>,
}

impl EngineConfig {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(Self::global_config_path().as_deref(), &cwd)
    }

    /// Load configuration using an explicit global file and working directory
    pub fn load_from(global_path: Option<&Path>, cwd: &Path) -> Self {
        // 1. Built-in defaults
        let mut config = EngineConfig::default();

        // 2. Global user config (~/.config/devis/config.yaml)
        if let Some(path) = global_path {
            if let Some(global) = Self::read_file(path) {
                config.merge(global);
            }
        }

        // 3. Project config (.devis/config.yaml)
        let project_path = cwd.join(".devis").join("config.yaml");
        if let Some(project) = Self::read_file(&project_path) {
            config.merge(project);
        }

        // 4. Environment variables
        config.apply_env();

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "devis")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    fn read_file(path: &Path) -> Option<ConfigFile> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<ConfigFile>(&contents) {
            Ok(file) => Some(file),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Merge a config layer into this one (the layer takes precedence)
    fn merge(&mut self, other: ConfigFile) {
        if let Some(validation) = other.validation {
            self.validation = validation;
        }
        if let Some(margin) = other.default_margin {
            self.default_margin = margin;
        }
        if let Some(vat) = other.default_vat {
            self.default_vat = vat;
        }
        if let Some(depth) = other.max_depth {
            self.max_depth = depth;
        }
    }

    fn apply_env(&mut self) {
        if let Ok(value) = std::env::var("DEVIS_VALIDATION") {
            match value.parse() {
                Ok(policy) => self.validation = policy,
                Err(e) => tracing::warn!("DEVIS_VALIDATION ignored: {}", e),
            }
        }
        if let Ok(value) = std::env::var("DEVIS_DEFAULT_MARGIN") {
            match value.parse::<Decimal>() {
                Ok(margin) => self.default_margin = margin,
                Err(e) => tracing::warn!("DEVIS_DEFAULT_MARGIN ignored: {}", e),
            }
        }
        if let Ok(value) = std::env::var("DEVIS_DEFAULT_VAT") {
            match value.parse::<VatRate>() {
                Ok(vat) => self.default_vat = vat,
                Err(e) => tracing::warn!("DEVIS_DEFAULT_VAT ignored: {}", e),
            }
        }
        if let Ok(value) = std::env::var("DEVIS_MAX_DEPTH") {
            match value.parse::<usize>() {
                Ok(depth) => self.max_depth = depth,
                Err(e) => tracing::warn!("DEVIS_MAX_DEPTH ignored: {}", e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.validation, ValidationPolicy::Reject);
        assert_eq!(config.default_margin, dec!(20));
        assert_eq!(config.default_vat, VatRate::Twenty);
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_project_layer_overrides_global() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.yaml");
        std::fs::write(&global, "default_margin: 15\nmax_depth: 10\n").unwrap();

        std::fs::create_dir_all(tmp.path().join(".devis")).unwrap();
        std::fs::write(
            tmp.path().join(".devis/config.yaml"),
            "default_margin: 25\nvalidation: clamp\n",
        )
        .unwrap();

        let config = EngineConfig::load_from(Some(&global), tmp.path());
        assert_eq!(config.default_margin, dec!(25));
        assert_eq!(config.max_depth, 10);
        assert_eq!(config.validation, ValidationPolicy::Clamp);
    }

    #[test]
    fn test_invalid_file_is_ignored() {
        let tmp = TempDir::new().unwrap();
        let global = tmp.path().join("global.yaml");
        std::fs::write(&global, "default_vat: 19\n").unwrap();

        let config = EngineConfig::load_from(Some(&global), tmp.path());
        assert_eq!(config.default_vat, VatRate::Twenty);
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("CLAMP".parse::<ValidationPolicy>().unwrap(), ValidationPolicy::Clamp);
        assert!("ignore".parse::<ValidationPolicy>().is_err());
    }
}
