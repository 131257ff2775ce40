//! Core module - pricing engine and shared utilities

pub mod aggregate;
pub mod bom;
pub mod catalog;
pub mod config;
pub mod entity;
pub mod error;
pub mod money;
pub mod pricing;
pub mod rollup;

pub use aggregate::{apply_global_discount, apply_global_margin, aggregate, QuoteTotals, VatBucket};
pub use bom::{flatten, BomEntry, Expansion, Flatten};
pub use catalog::{Catalog, CatalogItem, CatalogSnapshot, ComponentKind};
pub use config::{EngineConfig, ValidationPolicy};
pub use entity::{CatalogEntity, ItemKind};
pub use error::PricingError;
pub use pricing::{
    coefficient, ht_to_ttc, margin_from_cost_and_price, price_from_cost_and_margin, price_line,
    price_line_with, ttc_to_ht, LineInput, LinePricing,
};
pub use rollup::{
    find_cycles, refresh_recommended_prices, rollup, rollup_by_id, where_used, CostLine, WorkCost,
};
