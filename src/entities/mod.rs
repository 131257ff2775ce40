//! Entity type definitions
//!
//! **Catalog:**
//! - [`Material`] - Purchased supplies with their own VAT rate
//! - [`Labor`] - Workforce priced per unit of time
//! - [`Work`] - Composite tasks built from materials, labor and other works
//!
//! **Quoting:**
//! - [`Quote`] - Customer quotation with derived totals
//! - [`QuoteItem`] - Priced line or section heading
//! - [`VatRate`] - The fixed set of VAT rates

pub mod labor;
pub mod material;
pub mod quote;
pub mod vat;
pub mod work;

pub use labor::Labor;
pub use material::Material;
pub use quote::{LineKind, Quote, QuoteItem, QuoteStatus};
pub use vat::VatRate;
pub use work::{Component, Work};
