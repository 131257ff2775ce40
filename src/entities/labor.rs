//! Labor entity type - Workforce billed per unit of time

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::entity::{CatalogEntity, ItemKind};

/// A Labor catalog entry
///
/// Labor has no VAT rate of its own; VAT is chosen on the quote line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labor {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit of measure, usually time based (h, j)
    pub unit: String,

    /// Price of one unit, excluding VAT
    pub unit_price: Decimal,

    /// Trade category (masonry, plumbing, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Labor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        unit_price: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            unit_price,
            category: None,
        }
    }
}

impl CatalogEntity for Labor {
    const KIND: ItemKind = ItemKind::Labor;

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> &str {
        &self.unit
    }

    fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}
