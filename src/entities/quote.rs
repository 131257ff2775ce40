//! Quote entity type - Customer quotations made of priced lines
//!
//! Line totals and quote totals are derived values: they are recomputed by
//! every setter and cannot be written from outside this module.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::core::aggregate::{aggregate, QuoteTotals};
use crate::core::config::{EngineConfig, ValidationPolicy};
use crate::core::error::PricingError;
use crate::core::pricing::{price_line_with, LineInput, LinePricing};
use crate::core::catalog::CatalogItem;
use crate::entities::vat::VatRate;

/// Quote lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[derive(Default)]
pub enum QuoteStatus {
    /// Being written
    #[default]
    Draft,
    /// Sent to the client
    Sent,
    /// Accepted by the client
    Accepted,
    /// Declined by the client
    Rejected,
    /// Validity period is over
    Expired,
}

impl std::fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QuoteStatus::Draft => write!(f, "draft"),
            QuoteStatus::Sent => write!(f, "sent"),
            QuoteStatus::Accepted => write!(f, "accepted"),
            QuoteStatus::Rejected => write!(f, "rejected"),
            QuoteStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for QuoteStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(QuoteStatus::Draft),
            "sent" => Ok(QuoteStatus::Sent),
            "accepted" => Ok(QuoteStatus::Accepted),
            "rejected" => Ok(QuoteStatus::Rejected),
            "expired" => Ok(QuoteStatus::Expired),
            _ => Err(format!(
                "Invalid quote status: {}. Use draft, sent, accepted, rejected, or expired",
                s
            )),
        }
    }
}

/// Kind of quote line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[derive(Default)]
pub enum LineKind {
    #[default]
    Product,
    Service,
    Work,
    /// Structural heading, never priced
    Section,
    /// Structural heading, never priced
    Chapter,
}

impl LineKind {
    /// Whether lines of this kind carry money
    pub fn is_priceable(&self) -> bool {
        !matches!(self, LineKind::Section | LineKind::Chapter)
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LineKind::Product => write!(f, "product"),
            LineKind::Service => write!(f, "service"),
            LineKind::Work => write!(f, "work"),
            LineKind::Section => write!(f, "section"),
            LineKind::Chapter => write!(f, "chapter"),
        }
    }
}

/// A single quote line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteItem {
    /// Unique identifier
    pub id: String,

    /// Line kind
    #[serde(default)]
    pub kind: LineKind,

    /// Display and print order
    #[serde(default)]
    pub position: u32,

    /// Text printed on the quote
    pub designation: String,

    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Catalog reference the line was created from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    /// Unit of measure
    #[serde(default)]
    pub unit: String,

    #[serde(default)]
    quantity: Decimal,

    #[serde(default)]
    unit_price: Decimal,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    discount: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    margin: Option<Decimal>,

    #[serde(default)]
    vat_rate: VatRate,

    #[serde(skip_deserializing)]
    total_ht: Decimal,

    #[serde(skip_deserializing)]
    total_ttc: Decimal,
}

fn new_line_id() -> String {
    format!("LINE-{}", Ulid::new())
}

impl QuoteItem {
    /// Create a priced line and compute its totals
    pub fn priced(
        kind: LineKind,
        designation: impl Into<String>,
        unit: impl Into<String>,
        quantity: Decimal,
        unit_price: Decimal,
        vat_rate: VatRate,
    ) -> Result<Self, PricingError> {
        let mut item = Self {
            id: new_line_id(),
            kind,
            position: 0,
            designation: designation.into(),
            description: None,
            reference: None,
            unit: unit.into(),
            quantity,
            unit_price,
            discount: None,
            margin: None,
            vat_rate,
            total_ht: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
        };
        item.recompute(ValidationPolicy::Reject)?;
        Ok(item)
    }

    /// Create a section heading
    pub fn section(designation: impl Into<String>) -> Self {
        Self::heading(LineKind::Section, designation)
    }

    /// Create a chapter heading
    pub fn chapter(designation: impl Into<String>) -> Self {
        Self::heading(LineKind::Chapter, designation)
    }

    fn heading(kind: LineKind, designation: impl Into<String>) -> Self {
        Self {
            id: new_line_id(),
            kind,
            position: 0,
            designation: designation.into(),
            description: None,
            reference: None,
            unit: String::new(),
            quantity: Decimal::ZERO,
            unit_price: Decimal::ZERO,
            discount: None,
            margin: None,
            vat_rate: VatRate::default(),
            total_ht: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
        }
    }

    /// Create a line from a catalog entry
    ///
    /// Materials become product lines at their own VAT rate, labor becomes a
    /// service line and works are sold at their recommended price; both use
    /// the configured default VAT rate.
    pub fn from_catalog(
        item: CatalogItem<'_>,
        quantity: Decimal,
        config: &EngineConfig,
    ) -> Result<Self, PricingError> {
        let (kind, vat_rate) = match item {
            CatalogItem::Material(m) => (LineKind::Product, m.vat_rate),
            CatalogItem::Labor(_) => (LineKind::Service, config.default_vat),
            CatalogItem::Work(_) => (LineKind::Work, config.default_vat),
        };
        let mut line = Self::priced(
            kind,
            item.name(),
            item.unit(),
            Decimal::ZERO,
            item.unit_price(),
            vat_rate,
        )?;
        line.reference = Some(item.id().to_string());
        line.set_quantity(quantity, config.validation)?;
        Ok(line)
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    pub fn discount(&self) -> Option<Decimal> {
        self.discount
    }

    pub fn margin(&self) -> Option<Decimal> {
        self.margin
    }

    pub fn vat_rate(&self) -> VatRate {
        self.vat_rate
    }

    /// Cached pre-tax total
    pub fn total_ht(&self) -> Decimal {
        self.total_ht
    }

    /// Cached tax-inclusive total
    pub fn total_ttc(&self) -> Decimal {
        self.total_ttc
    }

    pub fn is_priceable(&self) -> bool {
        self.kind.is_priceable()
    }

    pub fn set_quantity(
        &mut self,
        quantity: Decimal,
        policy: ValidationPolicy,
    ) -> Result<LinePricing, PricingError> {
        self.update(policy, |item| item.quantity = quantity)
    }

    pub fn set_unit_price(
        &mut self,
        unit_price: Decimal,
        policy: ValidationPolicy,
    ) -> Result<LinePricing, PricingError> {
        self.update(policy, |item| item.unit_price = unit_price)
    }

    pub fn set_discount(
        &mut self,
        discount: Option<Decimal>,
        policy: ValidationPolicy,
    ) -> Result<LinePricing, PricingError> {
        self.update(policy, |item| item.discount = discount)
    }

    pub fn set_margin(
        &mut self,
        margin: Option<Decimal>,
        policy: ValidationPolicy,
    ) -> Result<LinePricing, PricingError> {
        self.update(policy, |item| item.margin = margin)
    }

    pub fn set_vat_rate(&mut self, vat_rate: VatRate) -> Result<LinePricing, PricingError> {
        self.update(ValidationPolicy::Reject, |item| item.vat_rate = vat_rate)
    }

    /// Apply a change and recompute; the line is left untouched on error
    fn update(
        &mut self,
        policy: ValidationPolicy,
        change: impl FnOnce(&mut Self),
    ) -> Result<LinePricing, PricingError> {
        let mut next = self.clone();
        change(&mut next);
        let pricing = next.recompute(policy)?;
        *self = next;
        Ok(pricing)
    }

    /// Pricing inputs of this line
    pub fn line_input(&self) -> LineInput {
        LineInput {
            quantity: self.quantity,
            unit_price: self.unit_price,
            discount_pct: self.discount.unwrap_or(Decimal::ZERO),
            vat_rate: self.vat_rate,
            margin_pct: self.margin,
        }
    }

    /// Recompute the cached totals from the line inputs
    ///
    /// Under [`ValidationPolicy::Clamp`] the clamped values are written back
    /// so the stored inputs always match the totals.
    pub fn recompute(&mut self, policy: ValidationPolicy) -> Result<LinePricing, PricingError> {
        if !self.is_priceable() {
            self.total_ht = Decimal::ZERO;
            self.total_ttc = Decimal::ZERO;
            return Ok(LinePricing::default());
        }

        let input = self.line_input().validate(policy)?;
        let pricing = price_line_with(&input, policy)?;

        self.quantity = input.quantity;
        self.unit_price = input.unit_price;
        if self.discount.is_some() {
            self.discount = Some(input.discount_pct);
        }
        self.margin = input.margin_pct;
        self.total_ht = pricing.total_ht;
        self.total_ttc = pricing.total_ttc;
        Ok(pricing)
    }
}

/// A customer quote
///
/// Totals are written out but never read back: a deserialized quote has
/// zero totals and unsorted lines until [`Quote::recompute`] runs
/// ([`load_quote`](crate::yaml::load_quote) does this).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Unique identifier
    pub id: String,

    /// Lifecycle status
    #[serde(default)]
    pub status: QuoteStatus,

    /// Client reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// Project (construction site) reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    /// Date the quote was issued
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_date: Option<NaiveDate>,

    /// Last day the quote can be accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<NaiveDate>,

    /// Lines, sorted by position by `recompute` and every mutator
    #[serde(default)]
    items: Vec<QuoteItem>,

    #[serde(skip_deserializing)]
    total_ht: Decimal,

    #[serde(skip_deserializing)]
    total_vat: Decimal,

    #[serde(skip_deserializing)]
    total_ttc: Decimal,
}

impl Quote {
    /// Create an empty draft quote
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: QuoteStatus::default(),
            client_id: None,
            project_id: None,
            issue_date: None,
            valid_until: None,
            items: Vec::new(),
            total_ht: Decimal::ZERO,
            total_vat: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
        }
    }

    /// Lines in position order (file order for a quote not yet recomputed)
    pub fn items(&self) -> &[QuoteItem] {
        &self.items
    }

    pub fn total_ht(&self) -> Decimal {
        self.total_ht
    }

    pub fn total_vat(&self) -> Decimal {
        self.total_vat
    }

    pub fn total_ttc(&self) -> Decimal {
        self.total_ttc
    }

    /// Full aggregation, including the VAT breakdown
    pub fn totals(&self) -> Result<QuoteTotals, PricingError> {
        aggregate(&self.items)
    }

    /// Append a line at the end and refresh the totals
    ///
    /// The line is not added when the totals would overflow.
    pub fn add_item(&mut self, mut item: QuoteItem) -> Result<(), PricingError> {
        item.position = self.items.len() as u32 + 1;
        self.items.push(item);
        if let Err(e) = self.refresh_totals() {
            self.items.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Remove a line by id, renumbering the following lines
    pub fn remove_item(&mut self, id: &str) -> Result<Option<QuoteItem>, PricingError> {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return Ok(None);
        };
        let removed = self.items.remove(index);
        self.renumber();
        self.refresh_totals()?;
        Ok(Some(removed))
    }

    /// Move a line to a 1-based position, shifting the others
    pub fn move_item(&mut self, id: &str, position: u32) -> bool {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return false;
        };
        let item = self.items.remove(index);
        let target = (position.max(1) as usize - 1).min(self.items.len());
        self.items.insert(target, item);
        self.renumber();
        true
    }

    /// Mutate one line through its setters and refresh the totals
    ///
    /// The quote is left untouched when the change fails.
    pub fn update_item<F>(&mut self, id: &str, change: F) -> Result<bool, PricingError>
    where
        F: FnOnce(&mut QuoteItem) -> Result<LinePricing, PricingError>,
    {
        let Some(index) = self.items.iter().position(|i| i.id == id) else {
            return Ok(false);
        };
        let mut item = self.items[index].clone();
        change(&mut item)?;
        let previous = std::mem::replace(&mut self.items[index], item);
        if let Err(e) = self.refresh_totals() {
            self.items[index] = previous;
            return Err(e);
        }
        Ok(true)
    }

    /// Replace every line (e.g. after a global discount) and refresh the totals
    pub fn replace_items(&mut self, items: Vec<QuoteItem>) -> Result<(), PricingError> {
        let totals = aggregate(&items)?;
        self.items = items;
        self.renumber();
        self.store_totals(&totals);
        Ok(())
    }

    /// Recompute every line and the quote totals
    ///
    /// Required after deserializing a quote.
    pub fn recompute(&mut self, policy: ValidationPolicy) -> Result<QuoteTotals, PricingError> {
        self.items.sort_by_key(|i| i.position);
        for item in &mut self.items {
            item.recompute(policy)?;
        }
        let totals = aggregate(&self.items)?;
        self.store_totals(&totals);
        Ok(totals)
    }

    /// Check if the validity period is over on `today`
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.valid_until.is_some_and(|valid_until| valid_until < today)
    }

    fn renumber(&mut self) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.position = i as u32 + 1;
        }
    }

    fn refresh_totals(&mut self) -> Result<(), PricingError> {
        let totals = aggregate(&self.items)?;
        self.store_totals(&totals);
        Ok(())
    }

    fn store_totals(&mut self, totals: &QuoteTotals) {
        self.total_ht = totals.total_ht;
        self.total_vat = totals.total_vat;
        self.total_ttc = totals.total_ttc;
    }
}
