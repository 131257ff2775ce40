//! Line pricing - turns one quote line's inputs into a priced breakdown
//!
//! The order of operations is fixed: the discount is taken off the base
//! price, the margin is added on the discounted price, and VAT is computed
//! on the margin-inclusive amount. Every money step is rounded to cents
//! before the next one so the breakdown always reconciles exactly.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::config::ValidationPolicy;
use crate::core::error::PricingError;
use crate::core::money::{
    checked_add, checked_mul, checked_percent_of, percent_of, round_money, round_percent,
    safe_div, HUNDRED,
};
use crate::entities::vat::VatRate;

/// Inputs of a single priced line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineInput {
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount_pct: Decimal,
    #[serde(default)]
    pub vat_rate: VatRate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin_pct: Option<Decimal>,
}

impl LineInput {
    /// Line with no discount and no margin
    pub fn new(quantity: Decimal, unit_price: Decimal, vat_rate: VatRate) -> Self {
        Self {
            quantity,
            unit_price,
            discount_pct: Decimal::ZERO,
            vat_rate,
            margin_pct: None,
        }
    }

    pub fn with_discount(mut self, discount_pct: Decimal) -> Self {
        self.discount_pct = discount_pct;
        self
    }

    pub fn with_margin(mut self, margin_pct: Decimal) -> Self {
        self.margin_pct = Some(margin_pct);
        self
    }

    /// Check the inputs against their domains
    ///
    /// With [`ValidationPolicy::Clamp`] the returned copy has every value
    /// brought back into range; with [`ValidationPolicy::Reject`] the first
    /// offending value is reported.
    pub fn validate(&self, policy: ValidationPolicy) -> Result<LineInput, PricingError> {
        let mut checked = self.clone();

        if checked.quantity.is_sign_negative() && !checked.quantity.is_zero() {
            let value = checked.quantity;
            match policy {
                ValidationPolicy::Reject => return Err(PricingError::NegativeQuantity { value }),
                ValidationPolicy::Clamp => {
                    tracing::warn!(%value, "negative quantity clamped to 0");
                    checked.quantity = Decimal::ZERO;
                }
            }
        }

        if checked.unit_price.is_sign_negative() && !checked.unit_price.is_zero() {
            let value = checked.unit_price;
            match policy {
                ValidationPolicy::Reject => return Err(PricingError::NegativeUnitPrice { value }),
                ValidationPolicy::Clamp => {
                    tracing::warn!(%value, "negative unit price clamped to 0");
                    checked.unit_price = Decimal::ZERO;
                }
            }
        }

        if checked.discount_pct < Decimal::ZERO || checked.discount_pct > HUNDRED {
            let value = checked.discount_pct;
            match policy {
                ValidationPolicy::Reject => {
                    return Err(PricingError::DiscountOutOfRange { value })
                }
                ValidationPolicy::Clamp => {
                    let clamped = value.clamp(Decimal::ZERO, HUNDRED);
                    tracing::warn!(%value, %clamped, "discount clamped into 0..=100");
                    checked.discount_pct = clamped;
                }
            }
        }

        if let Some(value) = checked.margin_pct {
            if value < Decimal::ZERO {
                match policy {
                    ValidationPolicy::Reject => {
                        return Err(PricingError::NegativeMargin { value })
                    }
                    ValidationPolicy::Clamp => {
                        tracing::warn!(%value, "negative margin clamped to 0");
                        checked.margin_pct = Some(Decimal::ZERO);
                    }
                }
            }
        }

        Ok(checked)
    }
}

/// Priced breakdown of a single line
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LinePricing {
    pub base_price: Decimal,
    pub discount_amount: Decimal,
    pub price_after_discount: Decimal,
    pub margin_amount: Decimal,
    pub total_ht: Decimal,
    pub vat_amount: Decimal,
    pub total_ttc: Decimal,
}

/// Price a line, rejecting out-of-range inputs
pub fn price_line(input: &LineInput) -> Result<LinePricing, PricingError> {
    price_line_with(input, ValidationPolicy::Reject)
}

/// Price a line under the given validation policy
pub fn price_line_with(
    input: &LineInput,
    policy: ValidationPolicy,
) -> Result<LinePricing, PricingError> {
    let input = input.validate(policy)?;

    let base_price = round_money(checked_mul(
        input.quantity,
        input.unit_price,
        "line base price",
    )?);
    let discount_amount = round_money(checked_percent_of(
        base_price,
        input.discount_pct,
        "line discount",
    )?);
    let price_after_discount = base_price - discount_amount;

    let margin_amount = match input.margin_pct {
        Some(margin) if margin > Decimal::ZERO => round_money(checked_percent_of(
            price_after_discount,
            margin,
            "line margin",
        )?),
        _ => Decimal::ZERO,
    };

    let total_ht = checked_add(price_after_discount, margin_amount, "line total HT")?;
    let vat_amount = round_money(checked_percent_of(
        total_ht,
        input.vat_rate.as_decimal(),
        "line VAT",
    )?);
    let total_ttc = checked_add(total_ht, vat_amount, "line total TTC")?;

    Ok(LinePricing {
        base_price,
        discount_amount,
        price_after_discount,
        margin_amount,
        total_ht,
        vat_amount,
        total_ttc,
    })
}

/// Tax-inclusive amount for a pre-tax amount
pub fn ht_to_ttc(ht: Decimal, vat_rate: VatRate) -> Decimal {
    round_money(ht * (HUNDRED + vat_rate.as_decimal()) / HUNDRED)
}

/// Pre-tax amount for a tax-inclusive amount
pub fn ttc_to_ht(ttc: Decimal, vat_rate: VatRate) -> Decimal {
    round_money(ttc * HUNDRED / (HUNDRED + vat_rate.as_decimal()))
}

/// Margin percentage realised when selling at `price` something that costs `cost`
///
/// Returns 0 for a zero cost.
pub fn margin_from_cost_and_price(cost: Decimal, price: Decimal) -> Decimal {
    round_percent(safe_div(price - cost, cost) * HUNDRED)
}

/// Sale coefficient (`price / cost`), 0 for a zero cost
pub fn coefficient(cost: Decimal, price: Decimal) -> Decimal {
    safe_div(price, cost).round_dp(4)
}

/// Sale price obtained by applying a margin percentage on a cost
pub fn price_from_cost_and_margin(cost: Decimal, margin_pct: Decimal) -> Decimal {
    round_money(cost + percent_of(cost, margin_pct))
}
