//! Entity trait - common interface for catalog entities

use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Serialize};

/// Common trait for Material, Labor and Work catalog entries
pub trait CatalogEntity: Serialize + DeserializeOwned {
    /// The catalog kind this entity belongs to
    const KIND: ItemKind;

    /// Get the entity's unique ID
    fn id(&self) -> &str;

    /// Get the entity's display name
    fn name(&self) -> &str;

    /// Get the unit of measure (m², h, u, ...)
    fn unit(&self) -> &str;

    /// Price of one unit when this entity is used as a component
    fn unit_price(&self) -> Decimal;
}

/// Kind of catalog entry a component id resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Material,
    Labor,
    Work,
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ItemKind::Material => write!(f, "material"),
            ItemKind::Labor => write!(f, "labor"),
            ItemKind::Work => write!(f, "work"),
        }
    }
}
