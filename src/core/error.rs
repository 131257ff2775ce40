//! Pricing engine errors

use miette::Diagnostic;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur while pricing lines or rolling up works
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum PricingError {
    #[error("Quantity cannot be negative (got {value})")]
    #[diagnostic(code(devis::pricing::negative_quantity))]
    NegativeQuantity { value: Decimal },

    #[error("Unit price cannot be negative (got {value})")]
    #[diagnostic(code(devis::pricing::negative_unit_price))]
    NegativeUnitPrice { value: Decimal },

    #[error("Discount must be between 0 and 100 percent (got {value})")]
    #[diagnostic(code(devis::pricing::discount_out_of_range))]
    DiscountOutOfRange { value: Decimal },

    #[error("Margin cannot be negative (got {value})")]
    #[diagnostic(code(devis::pricing::negative_margin))]
    NegativeMargin { value: Decimal },

    #[error("Component {component} of work {work} must have a positive quantity (got {value})")]
    #[diagnostic(code(devis::rollup::component_quantity))]
    InvalidComponentQuantity {
        work: String,
        component: String,
        value: Decimal,
    },

    #[error("Amount too large while computing the {operation}")]
    #[diagnostic(
        code(devis::pricing::overflow),
        help("Check the quantities and prices for an extra digit or a runaway nesting")
    )]
    AmountOverflow { operation: &'static str },

    #[error("Unknown VAT rate: {value}%")]
    #[diagnostic(
        code(devis::pricing::unknown_vat_rate),
        help("Use one of 0, 7, 10, 14 or 20")
    )]
    UnknownVatRate { value: String },

    #[error("Composition cycle detected, involving ids {}", ids.join(" -> "))]
    #[diagnostic(
        code(devis::rollup::cycle),
        help("A work cannot contain itself, directly or through sub-works")
    )]
    CompositionCycle { ids: Vec<String> },

    #[error("Composition of {id} is deeper than {max_depth} levels")]
    #[diagnostic(code(devis::rollup::depth_exceeded))]
    DepthExceeded { id: String, max_depth: usize },

    #[error("Work not found: {id}")]
    #[diagnostic(code(devis::rollup::unknown_work))]
    UnknownWork { id: String },
}

impl PricingError {
    /// True for input validation failures (as opposed to composition failures)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PricingError::NegativeQuantity { .. }
                | PricingError::NegativeUnitPrice { .. }
                | PricingError::DiscountOutOfRange { .. }
                | PricingError::NegativeMargin { .. }
                | PricingError::InvalidComponentQuantity { .. }
                | PricingError::UnknownVatRate { .. }
        )
    }
}
