//! `devis price` command - Price a single line

use console::style;
use miette::Result;
use rust_decimal::Decimal;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::format_money;
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::config::EngineConfig;
use crate::core::pricing::{price_line_with, LineInput};
use crate::entities::VatRate;

#[derive(clap::Args, Debug)]
pub struct PriceArgs {
    /// Quantity sold
    #[arg(long)]
    pub qty: Decimal,

    /// Unit price excluding VAT
    #[arg(long)]
    pub unit_price: Decimal,

    /// Discount percentage (0-100)
    #[arg(long, default_value = "0")]
    pub discount: Decimal,

    /// Margin percentage applied after the discount
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// VAT rate (0, 7, 10, 14 or 20)
    #[arg(long, default_value = "20")]
    pub vat: VatRate,
}

pub fn run(args: PriceArgs, global: &GlobalOpts) -> Result<()> {
    let config = EngineConfig::load();

    let mut input = LineInput::new(args.qty, args.unit_price, args.vat).with_discount(args.discount);
    if let Some(margin) = args.margin {
        input = input.with_margin(margin);
    }

    let pricing = price_line_with(&input, config.validation)?;

    if print_structured(&pricing, global.format)? {
        return Ok(());
    }

    let vat_label = format!("VAT {}", args.vat);
    let rows = [
        ("Base price", format_money(pricing.base_price)),
        ("Discount", format!("-{}", format_money(pricing.discount_amount))),
        ("After discount", format_money(pricing.price_after_discount)),
        ("Margin", format_money(pricing.margin_amount)),
        ("Total HT", format_money(pricing.total_ht)),
        (vat_label.as_str(), format_money(pricing.vat_amount)),
    ];

    let mut builder = Builder::default();
    builder.push_record(["".to_string(), "Amount".to_string()]);
    for (label, amount) in rows {
        builder.push_record([label.to_string(), amount]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
    println!(
        "{} {}",
        style("Total TTC:").green().bold(),
        format_money(pricing.total_ttc)
    );

    Ok(())
}
