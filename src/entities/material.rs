//! Material entity type - Purchased supplies priced per unit

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::entity::{CatalogEntity, ItemKind};
use crate::entities::vat::VatRate;

/// A Material catalog entry (leaf of the composition graph)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit of measure (m², kg, u, ...)
    pub unit: String,

    /// Price of one unit, excluding VAT
    pub unit_price: Decimal,

    /// VAT rate applied when sold directly on a quote line
    #[serde(default)]
    pub vat_rate: VatRate,

    /// Manufacturer or internal reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Supplier name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier: Option<String>,

    /// Units currently in stock
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<Decimal>,
}

impl Material {
    /// Create a new material with the default VAT rate
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
            vat_rate: VatRate::default(),
            reference: None,
            supplier: None,
            stock: None,
        }
    }
}

impl CatalogEntity for Material {
    const KIND: ItemKind = ItemKind::Material;

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
