//! Shared test helpers for integration tests
//!
//! This module provides common utilities used across all test files.

#![allow(dead_code)]

use assert_cmd::cargo;
use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

/// Empty directory used as HOME and working directory for every command
fn sandbox() -> &'static Path {
    static SANDBOX: OnceLock<TempDir> = OnceLock::new();
    SANDBOX.get_or_init(|| TempDir::new().unwrap()).path()
}

/// Helper to get a devis command isolated from the user's environment
///
/// No `DEVIS_*` variable, no global config and no project config leak in;
/// tests that need a project directory set their own `current_dir`.
pub fn devis() -> Command {
    let mut cmd = Command::new(cargo::cargo_bin!("devis"));
    for var in [
        "DEVIS_VALIDATION",
        "DEVIS_DEFAULT_MARGIN",
        "DEVIS_DEFAULT_VAT",
        "DEVIS_MAX_DEPTH",
        "DEVIS_LOG",
    ] {
        cmd.env_remove(var);
    }
    let home = sandbox();
    cmd.env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("APPDATA", home)
        .current_dir(home);
    cmd
}

/// Plaster work (2 kg plaster + 1 h plasterer) and a finish that embeds it
pub const CATALOG_YAML: &str = r#"
materials:
  - id: MAT-PLATRE
    name: Plâtre
    unit: kg
    unit_price: 10
    vat_rate: 20
labor:
  - id: MO-PLATRIER
    name: Plâtrier
    unit: h
    unit_price: 50
works:
  - id: OUV-ENDUIT
    name: Enduit plâtre
    unit: m2
    components:
      - component_id: MAT-PLATRE
        quantity: 2
      - component_id: MO-PLATRIER
        quantity: 1
  - id: OUV-FINITION
    name: Finition complète
    unit: m2
    margin: 10
    components:
      - component_id: OUV-ENDUIT
        quantity: 1
      - component_id: MAT-PLATRE
        quantity: 1
      - component_id: MAT-FANTOME
        quantity: 3
"#;

/// Two works referencing each other
pub const CYCLIC_CATALOG_YAML: &str = r#"
works:
  - id: OUV-A
    name: Ouvrage A
    unit: u
    components:
      - component_id: OUV-B
        quantity: 1
  - id: OUV-B
    name: Ouvrage B
    unit: u
    components:
      - component_id: OUV-A
        quantity: 1
"#;

/// Two priced lines at 20% (1125 + 945 HT) under a section heading
pub const QUOTE_YAML: &str = r#"
id: DEV-2024-001
status: draft
client_id: CLI-042
issue_date: 2024-03-01
valid_until: 2024-04-30
items:
  - id: LINE-1
    kind: section
    position: 1
    designation: Revêtements de sol
  - id: LINE-2
    kind: product
    position: 2
    designation: Carrelage grès cérame
    unit: m2
    quantity: 25
    unit_price: 45
    vat_rate: 20
  - id: LINE-3
    kind: service
    position: 3
    designation: Pose
    unit: m2
    quantity: 15
    unit_price: 63
    vat_rate: 20
"#;

/// Write `content` to `name` inside a fresh temp dir
pub fn write_fixture(name: &str, content: &str) -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join(name);
    fs::write(&path, content).unwrap();
    (tmp, path)
}

pub fn catalog_fixture() -> (TempDir, PathBuf) {
    write_fixture("catalog.yaml", CATALOG_YAML)
}

pub fn quote_fixture() -> (TempDir, PathBuf) {
    write_fixture("quote.yaml", QUOTE_YAML)
}
