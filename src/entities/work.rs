//! Work entity type - Composite construction tasks built from components
//!
//! A Work references Materials, Labor entries and other Works through its
//! component list. Its recommended price is derived by
//! [`rollup`](crate::core::rollup::rollup) and cached on the entity.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::config::EngineConfig;
use crate::core::entity::{CatalogEntity, ItemKind};
use crate::core::error::PricingError;
use crate::core::catalog::Catalog;
use crate::core::rollup::{rollup, WorkCost};

/// Reference from a Work to one of its constituents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    /// Material, Labor or Work ID
    pub component_id: String,

    /// Quantity of the component per unit of the parent work
    pub quantity: Decimal,
}

impl Component {
    pub fn new(component_id: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            component_id: component_id.into(),
            quantity,
        }
    }
}

/// A Work catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit of measure (m², ml, u, ...)
    pub unit: String,

    /// Margin percentage applied over the total cost (engine default when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Decimal>,

    /// Constituents of one unit of this work
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    /// Cached result of the last rollup
    #[serde(default)]
    pub recommended_price: Decimal,
}

impl Work {
    /// Create a new work with no components
    pub fn new(id: impl Into<String>, name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            unit: unit.into(),
            margin: None,
            components: Vec::new(),
            recommended_price: Decimal::ZERO,
        }
    }

    /// Add a component reference
    pub fn add_component(&mut self, component_id: impl Into<String>, quantity: Decimal) {
        self.components.push(Component::new(component_id, quantity));
    }

    /// Builder-style variant of [`Work::add_component`]
    pub fn with_component(mut self, component_id: impl Into<String>, quantity: Decimal) -> Self {
        self.add_component(component_id, quantity);
        self
    }

    /// Margin to apply, falling back to the configured default
    pub fn effective_margin(&self, config: &EngineConfig) -> Decimal {
        self.margin.unwrap_or(config.default_margin)
    }

    /// Whether `id` appears directly in this work's component list
    pub fn references(&self, id: &str) -> bool {
        self.components.iter().any(|c| c.component_id == id)
    }

    /// Roll up the work against `catalog` and cache the recommended price
    pub fn recompute_recommended_price(
        &mut self,
        catalog: &Catalog<'_>,
        config: &EngineConfig,
    ) -> Result<WorkCost, PricingError> {
        let cost = rollup(self, catalog, config)?;
        self.recommended_price = cost.recommended_price;
        Ok(cost)
    }
}

impl CatalogEntity for Work {
    const KIND: ItemKind = ItemKind::Work;

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
        self.recommended_price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Labor, Material};
    use rust_decimal_macros::dec;

    #[test]
    fn test_effective_margin_defaults_to_config() {
        let config = EngineConfig::default();
        let mut work = Work::new("W1", "Enduit", "m2");
        assert_eq!(work.effective_margin(&config), dec!(20));

        work.margin = Some(dec!(35));
        assert_eq!(work.effective_margin(&config), dec!(35));
    }

    #[test]
    fn test_recompute_recommended_price() {
        let materials = vec![Material::new("M1", "Plâtre", "kg", dec!(10))];
        let labor = vec![Labor::new("L1", "Plâtrier", "h", dec!(50))];
        let catalog = Catalog::new(&materials, &labor, &[]);

        let mut work = Work::new("W1", "Enduit plâtre", "m2")
            .with_component("M1", dec!(2))
            .with_component("L1", dec!(1));
        let cost = work
            .recompute_recommended_price(&catalog, &EngineConfig::default())
            .unwrap();

        assert_eq!(cost.total_cost, dec!(70));
        assert_eq!(work.recommended_price, dec!(84));
        assert!(work.references("M1"));
        assert!(!work.references("M2"));
    }

    #[test]
    fn test_work_yaml_without_margin() {
        let yaml = r#"
id: W9
name: Chape
unit: m2
components:
  - component_id: M1
    quantity: 0.05
"#;
        let work: Work = serde_yml::from_str(yaml).unwrap();
        assert_eq!(work.margin, None);
        assert_eq!(work.components[0].quantity, dec!(0.05));
        assert_eq!(work.recommended_price, Decimal::ZERO);
    }
}
