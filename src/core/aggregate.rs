//! Quote aggregation - totals and VAT breakdown over a list of lines

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::config::ValidationPolicy;
use crate::core::error::PricingError;
use crate::core::money::checked_add;
use crate::entities::quote::QuoteItem;
use crate::entities::vat::VatRate;

/// Amounts accumulated for one VAT rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VatBucket {
    /// Pre-tax base taxed at this rate
    pub amount: Decimal,
    /// VAT collected at this rate
    pub vat_amount: Decimal,
}

/// Quote-level totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTotals {
    pub total_ht: Decimal,
    pub total_vat: Decimal,
    pub total_ttc: Decimal,
    /// Number of lines that carried money
    pub priceable_count: usize,
    /// One entry per VAT rate, zeroed when unused
    pub vat_breakdown: BTreeMap<VatRate, VatBucket>,
}

impl Default for QuoteTotals {
    fn default() -> Self {
        Self {
            total_ht: Decimal::ZERO,
            total_vat: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
            priceable_count: 0,
            vat_breakdown: VatRate::all()
                .iter()
                .map(|rate| (*rate, VatBucket::default()))
                .collect(),
        }
    }
}

impl QuoteTotals {
    /// Breakdown entries that actually received an amount
    pub fn used_rates(&self) -> impl Iterator<Item = (&VatRate, &VatBucket)> {
        self.vat_breakdown
            .iter()
            .filter(|(_, bucket)| !bucket.amount.is_zero() || !bucket.vat_amount.is_zero())
    }
}

/// Aggregate the cached totals of every priceable line
///
/// A line's VAT is taken as `total_ttc - total_ht` rather than re-derived
/// from its rate, since `total_ht` already includes the line margin.
pub fn aggregate(lines: &[QuoteItem]) -> Result<QuoteTotals, PricingError> {
    let mut totals = QuoteTotals::default();

    for line in lines.iter().filter(|l| l.is_priceable()) {
        let vat = line.total_ttc() - line.total_ht();

        totals.total_ht = checked_add(totals.total_ht, line.total_ht(), "quote total HT")?;
        totals.total_vat = checked_add(totals.total_vat, vat, "quote VAT")?;
        totals.total_ttc = checked_add(totals.total_ttc, line.total_ttc(), "quote total TTC")?;
        totals.priceable_count += 1;

        let bucket = totals.vat_breakdown.entry(line.vat_rate()).or_default();
        bucket.amount = checked_add(bucket.amount, line.total_ht(), "VAT base")?;
        bucket.vat_amount = checked_add(bucket.vat_amount, vat, "VAT amount")?;
    }

    Ok(totals)
}

/// Add `pct` to the discount of every priceable line
pub fn apply_global_discount(
    lines: &[QuoteItem],
    pct: Decimal,
    policy: ValidationPolicy,
) -> Result<Vec<QuoteItem>, PricingError> {
    map_priceable(lines, |line| {
        let current = line.discount().unwrap_or(Decimal::ZERO);
        let next = if pct.is_zero() {
            line.discount()
        } else {
            Some(current + pct)
        };
        line.set_discount(next, policy).map(|_| ())
    })
}

/// Replace the margin of every priceable line with `pct`
pub fn apply_global_margin(
    lines: &[QuoteItem],
    pct: Decimal,
    policy: ValidationPolicy,
) -> Result<Vec<QuoteItem>, PricingError> {
    map_priceable(lines, |line| line.set_margin(Some(pct), policy).map(|_| ()))
}

fn map_priceable<F>(lines: &[QuoteItem], mut change: F) -> Result<Vec<QuoteItem>, PricingError>
where
    F: FnMut(&mut QuoteItem) -> Result<(), PricingError>,
{
    lines
        .iter()
        .map(|line| {
            let mut line = line.clone();
            if line.is_priceable() {
                change(&mut line)?;
            }
            Ok(line)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::quote::LineKind;
    use rust_decimal_macros::dec;

    fn line(qty: Decimal, price: Decimal, vat: VatRate) -> QuoteItem {
        QuoteItem::priced(LineKind::Product, "Ligne", "u", qty, price, vat).unwrap()
    }

    #[test]
    fn test_sections_only_is_all_zero() {
        let lines = vec![QuoteItem::section("A"), QuoteItem::chapter("B")];
        let totals = aggregate(&lines).unwrap();

        assert_eq!(totals, QuoteTotals::default());
        assert_eq!(totals.vat_breakdown.len(), VatRate::all().len());
        assert!(totals.vat_breakdown.values().all(|b| *b == VatBucket::default()));
        assert_eq!(totals.used_rates().count(), 0);
    }

    #[test]
    fn test_breakdown_per_rate() {
        let lines = vec![
            line(dec!(1), dec!(100), VatRate::Twenty),
            QuoteItem::section("Lot 2"),
            line(dec!(2), dec!(50), VatRate::Ten),
            line(dec!(1), dec!(10), VatRate::Twenty),
        ];
        let totals = aggregate(&lines).unwrap();

        assert_eq!(totals.priceable_count, 3);
        assert_eq!(totals.total_ht, dec!(210));
        assert_eq!(totals.total_vat, dec!(32));
        assert_eq!(totals.total_ttc, dec!(242));

        let twenty = totals.vat_breakdown[&VatRate::Twenty];
        assert_eq!(twenty.amount, dec!(110));
        assert_eq!(twenty.vat_amount, dec!(22));
        assert_eq!(totals.vat_breakdown[&VatRate::Ten].vat_amount, dec!(10));
        assert_eq!(totals.vat_breakdown[&VatRate::Seven], VatBucket::default());
        assert_eq!(totals.used_rates().count(), 2);
    }

    #[test]
    fn test_totals_overflow_is_reported() {
        let lines = vec![
            line(Decimal::MAX - dec!(1000), dec!(1), VatRate::Zero),
            line(dec!(2000), dec!(1), VatRate::Zero),
        ];

        assert!(matches!(
            aggregate(&lines),
            Err(PricingError::AmountOverflow { .. })
        ));
        assert!(aggregate(&lines[..1]).is_ok());
    }

    #[test]
    fn test_global_discount_adds_to_existing() {
        let mut discounted = line(dec!(1), dec!(100), VatRate::Twenty);
        discounted
            .set_discount(Some(dec!(5)), ValidationPolicy::Reject)
            .unwrap();
        let lines = vec![discounted, QuoteItem::section("S"), line(dec!(1), dec!(100), VatRate::Twenty)];

        let result = apply_global_discount(&lines, dec!(10), ValidationPolicy::Reject).unwrap();
        assert_eq!(result[0].discount(), Some(dec!(15)));
        assert_eq!(result[0].total_ht(), dec!(85));
        assert_eq!(result[1], lines[1]);
        assert_eq!(result[2].discount(), Some(dec!(10)));
        assert_eq!(result[2].total_ht(), dec!(90));

        // input untouched
        assert_eq!(lines[0].discount(), Some(dec!(5)));
    }

    #[test]
    fn test_global_discount_overflow_is_rejected() {
        let mut line = line(dec!(1), dec!(100), VatRate::Twenty);
        line.set_discount(Some(dec!(95)), ValidationPolicy::Reject).unwrap();
        let lines = vec![line];

        assert!(apply_global_discount(&lines, dec!(10), ValidationPolicy::Reject).is_err());
        let clamped = apply_global_discount(&lines, dec!(10), ValidationPolicy::Clamp).unwrap();
        assert_eq!(clamped[0].discount(), Some(dec!(100)));
    }

    #[test]
    fn test_zero_discount_and_same_margin_are_noops() {
        let mut with_margin = line(dec!(3), dec!(12.5), VatRate::Seven);
        with_margin
            .set_margin(Some(dec!(15)), ValidationPolicy::Reject)
            .unwrap();
        let lines = vec![with_margin.clone(), QuoteItem::section("S")];

        assert_eq!(
            apply_global_discount(&lines, dec!(0), ValidationPolicy::Reject).unwrap(),
            lines
        );
        assert_eq!(
            apply_global_margin(&lines, dec!(15), ValidationPolicy::Reject).unwrap(),
            lines
        );
    }

    #[test]
    fn test_global_margin_replaces() {
        let mut with_margin = line(dec!(1), dec!(100), VatRate::Twenty);
        with_margin
            .set_margin(Some(dec!(50)), ValidationPolicy::Reject)
            .unwrap();
        let lines = vec![with_margin, line(dec!(1), dec!(100), VatRate::Zero)];

        let result = apply_global_margin(&lines, dec!(20), ValidationPolicy::Reject).unwrap();
        assert_eq!(result[0].margin(), Some(dec!(20)));
        assert_eq!(result[0].total_ht(), dec!(120));
        assert_eq!(result[1].total_ttc(), dec!(120));
    }
}
