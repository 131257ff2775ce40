//! Devis: work composition and quote pricing engine
//!
//! Prices individual quote lines (discount, margin, VAT), totals quotes with
//! a per-rate VAT breakdown, and rolls up the cost of composite works built
//! from materials, labor and other works.

pub mod cli;
pub mod core;
pub mod entities;
pub mod yaml;
