//! Composition rollup - recursive cost of a Work and its recommended price
//!
//! A Work's cost is the sum of its components: materials and labor at their
//! catalog price, sub-works at their own (recursively rolled up) recommended
//! price. The traversal keeps the chain of works being rolled up so a work
//! that contains itself is reported instead of recursing forever.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::config::{EngineConfig, ValidationPolicy};
use crate::core::error::PricingError;
use crate::core::money::{
    checked_add, checked_mul, checked_percent_of, round_money, round_percent, share_of,
};
use crate::entities::Work;

use crate::core::catalog::{Catalog, CatalogItem, ComponentKind};

/// Cost contribution of one direct component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostLine {
    pub component_id: String,
    pub kind: ComponentKind,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub line_cost: Decimal,
}

/// Result of rolling up a Work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCost {
    pub work_id: String,
    pub material_cost: Decimal,
    pub labor_cost: Decimal,
    pub sub_works_cost: Decimal,
    pub total_cost: Decimal,
    /// Margin percentage that was applied
    pub margin: Decimal,
    pub margin_amount: Decimal,
    pub recommended_price: Decimal,
    pub material_pct: Decimal,
    pub labor_pct: Decimal,
    pub sub_works_pct: Decimal,
    /// Direct components, in declaration order
    pub lines: Vec<CostLine>,
    /// Component ids that matched nothing, at any depth
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

impl WorkCost {
    pub fn has_unresolved(&self) -> bool {
        !self.unresolved.is_empty()
    }
}

/// Roll up the cost of `work` against `catalog`
///
/// `work` does not need to be part of the catalog, so an edited copy can be
/// priced before it is saved.
pub fn rollup(
    work: &Work,
    catalog: &Catalog<'_>,
    config: &EngineConfig,
) -> Result<WorkCost, PricingError> {
    let mut ctx = Rollup::new(catalog, config);
    let mut cost = ctx.cost_of(work)?;
    cost.unresolved = ctx.unresolved;
    Ok(cost)
}

/// Roll up a catalog work by id
pub fn rollup_by_id(
    id: &str,
    catalog: &Catalog<'_>,
    config: &EngineConfig,
) -> Result<WorkCost, PricingError> {
    let work = catalog
        .work(id)
        .ok_or_else(|| PricingError::UnknownWork { id: id.to_string() })?;
    rollup(work, catalog, config)
}

/// Recompute the recommended price of every work in the catalog
///
/// Returns updated copies, in catalog order. The catalog itself is not
/// modified.
pub fn refresh_recommended_prices(
    catalog: &Catalog<'_>,
    config: &EngineConfig,
) -> Result<Vec<Work>, PricingError> {
    let mut ctx = Rollup::new(catalog, config);
    catalog
        .works()
        .iter()
        .map(|work| {
            let price = ctx.recommended_price_of(work)?;
            let mut updated = work.clone();
            updated.recommended_price = price;
            Ok(updated)
        })
        .collect()
}

/// Traversal state for one rollup call
struct Rollup<'c, 'a> {
    catalog: &'c Catalog<'a>,
    config: &'c EngineConfig,
    /// Ids of the works currently being rolled up, outermost first
    path: Vec<String>,
    /// Recommended prices already computed in this call
    prices: HashMap<String, Decimal>,
    unresolved: Vec<String>,
}

impl<'c, 'a> Rollup<'c, 'a> {
    fn new(catalog: &'c Catalog<'a>, config: &'c EngineConfig) -> Self {
        Self {
            catalog,
            config,
            path: Vec::new(),
            prices: HashMap::new(),
            unresolved: Vec::new(),
        }
    }

    fn recommended_price_of(&mut self, work: &Work) -> Result<Decimal, PricingError> {
        if let Some(price) = self.prices.get(&work.id) {
            return Ok(*price);
        }
        let cost = self.cost_of(work)?;
        self.prices.insert(work.id.clone(), cost.recommended_price);
        Ok(cost.recommended_price)
    }

    fn cost_of(&mut self, work: &Work) -> Result<WorkCost, PricingError> {
        if let Some(start) = self.path.iter().position(|id| *id == work.id) {
            let mut ids = self.path[start..].to_vec();
            ids.push(work.id.clone());
            return Err(PricingError::CompositionCycle { ids });
        }
        if self.path.len() > self.config.max_depth {
            return Err(PricingError::DepthExceeded {
                id: work.id.clone(),
                max_depth: self.config.max_depth,
            });
        }

        self.path.push(work.id.clone());
        let result = self.sum_components(work);
        self.path.pop();
        result
    }

    fn checked_quantity(
        &self,
        work: &Work,
        component: &str,
        value: Decimal,
    ) -> Result<Decimal, PricingError> {
        if value > Decimal::ZERO {
            return Ok(value);
        }
        match self.config.validation {
            ValidationPolicy::Reject => Err(PricingError::InvalidComponentQuantity {
                work: work.id.clone(),
                component: component.to_string(),
                value,
            }),
            ValidationPolicy::Clamp => {
                tracing::warn!(
                    work = %work.id,
                    component,
                    %value,
                    "non-positive component quantity clamped to 0"
                );
                Ok(Decimal::ZERO)
            }
        }
    }

    fn checked_unit_price(&self, id: &str, value: Decimal) -> Result<Decimal, PricingError> {
        if value >= Decimal::ZERO {
            return Ok(value);
        }
        match self.config.validation {
            ValidationPolicy::Reject => Err(PricingError::NegativeUnitPrice { value }),
            ValidationPolicy::Clamp => {
                tracing::warn!(component = id, %value, "negative catalog price clamped to 0");
                Ok(Decimal::ZERO)
            }
        }
    }

    fn checked_margin(&self, work: &Work) -> Result<Decimal, PricingError> {
        let value = work.effective_margin(self.config);
        if value >= Decimal::ZERO {
            return Ok(value);
        }
        match self.config.validation {
            ValidationPolicy::Reject => Err(PricingError::NegativeMargin { value }),
            ValidationPolicy::Clamp => {
                tracing::warn!(work = %work.id, %value, "negative work margin clamped to 0");
                Ok(Decimal::ZERO)
            }
        }
    }

    fn sum_components(&mut self, work: &Work) -> Result<WorkCost, PricingError> {
        let mut material_cost = Decimal::ZERO;
        let mut labor_cost = Decimal::ZERO;
        let mut sub_works_cost = Decimal::ZERO;
        let mut lines = Vec::with_capacity(work.components.len());

        for component in &work.components {
            let id = component.component_id.as_str();
            let quantity = self.checked_quantity(work, id, component.quantity)?;
            let (kind, name, unit_price) = match self.catalog.resolve(id) {
                Some(CatalogItem::Material(m)) => (
                    ComponentKind::Material,
                    m.name.clone(),
                    self.checked_unit_price(id, m.unit_price)?,
                ),
                Some(CatalogItem::Labor(l)) => (
                    ComponentKind::Labor,
                    l.name.clone(),
                    self.checked_unit_price(id, l.unit_price)?,
                ),
                Some(CatalogItem::Work(sub)) => {
                    let price = self.recommended_price_of(sub)?;
                    (ComponentKind::Work, sub.name.clone(), price)
                }
                None => {
                    tracing::warn!(
                        work = %work.id,
                        component = id,
                        "unresolved component contributes no cost"
                    );
                    if !self.unresolved.iter().any(|u| u == id) {
                        self.unresolved.push(id.to_string());
                    }
                    (ComponentKind::Unresolved, id.to_string(), Decimal::ZERO)
                }
            };

            let line_cost = round_money(checked_mul(unit_price, quantity, "component cost")?);
            match kind {
                ComponentKind::Material => {
                    material_cost = checked_add(material_cost, line_cost, "material cost")?
                }
                ComponentKind::Labor => {
                    labor_cost = checked_add(labor_cost, line_cost, "labor cost")?
                }
                ComponentKind::Work => {
                    sub_works_cost = checked_add(sub_works_cost, line_cost, "sub-works cost")?
                }
                ComponentKind::Unresolved => {}
            }

            lines.push(CostLine {
                component_id: id.to_string(),
                kind,
                name,
                quantity,
                unit_price,
                line_cost,
            });
        }

        let total_cost = checked_add(
            checked_add(material_cost, labor_cost, "work cost")?,
            sub_works_cost,
            "work cost",
        )?;
        let margin = self.checked_margin(work)?;
        let margin_amount = round_money(checked_percent_of(total_cost, margin, "work margin")?);
        let recommended_price = checked_add(total_cost, margin_amount, "recommended price")?;

        tracing::debug!(
            work = %work.id,
            %total_cost,
            %recommended_price,
            "rolled up work"
        );

        Ok(WorkCost {
            work_id: work.id.clone(),
            material_cost,
            labor_cost,
            sub_works_cost,
            total_cost,
            margin,
            margin_amount,
            recommended_price,
            material_pct: round_percent(share_of(material_cost, total_cost)),
            labor_pct: round_percent(share_of(labor_cost, total_cost)),
            sub_works_pct: round_percent(share_of(sub_works_cost, total_cost)),
            lines,
            unresolved: Vec::new(),
        })
    }
}

/// Works whose cost depends on `component_id`, directly or through sub-works
///
/// Direct users come first, then their users, and so on.
pub fn where_used<'a>(component_id: &str, works: &'a [Work]) -> Vec<&'a Work> {
    let mut found: Vec<&'a Work> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::from([component_id]);

    while let Some(id) = queue.pop_front() {
        for work in works.iter().filter(|w| w.references(id)) {
            if seen.insert(work.id.as_str()) {
                found.push(work);
                queue.push_back(work.id.as_str());
            }
        }
    }

    found
}

/// Every composition cycle in the catalog, as closed id chains
///
/// An empty result means every work can be rolled up.
pub fn find_cycles(catalog: &Catalog<'_>) -> Vec<Vec<String>> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        InProgress,
        Done,
    }

    fn visit<'a>(
        work: &'a Work,
        catalog: &Catalog<'a>,
        marks: &mut HashMap<&'a str, Mark>,
        path: &mut Vec<&'a str>,
        cycles: &mut Vec<Vec<String>>,
    ) {
        marks.insert(work.id.as_str(), Mark::InProgress);
        path.push(work.id.as_str());

        for component in &work.components {
            let Some(sub) = catalog.work(&component.component_id) else {
                continue;
            };
            match marks.get(sub.id.as_str()) {
                Some(Mark::InProgress) => {
                    let start = path.iter().position(|id| *id == sub.id).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|id| id.to_string()).collect();
                    cycle.push(sub.id.clone());
                    cycles.push(cycle);
                }
                Some(Mark::Done) => {}
                None => visit(sub, catalog, marks, path, cycles),
            }
        }

        path.pop();
        marks.insert(work.id.as_str(), Mark::Done);
    }

    let mut marks: HashMap<&str, Mark> = HashMap::new();
    let mut cycles = Vec::new();
    let mut path = Vec::new();

    for work in catalog.works() {
        if !marks.contains_key(work.id.as_str()) {
            visit(work, catalog, &mut marks, &mut path, &mut cycles);
        }
    }

    cycles
}
