//! `devis quote` command - Quote totals and global adjustments

use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use console::style;
use miette::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_money, format_percent, truncate_str};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::aggregate::{apply_global_discount, apply_global_margin, QuoteTotals};
use crate::core::config::EngineConfig;
use crate::entities::{Quote, QuoteItem};
use crate::yaml::load_quote;

#[derive(Subcommand, Debug)]
pub enum QuoteCommands {
    /// Show lines, totals and VAT breakdown of a quote file
    Totals(TotalsArgs),
}

#[derive(clap::Args, Debug)]
pub struct TotalsArgs {
    /// Quote YAML file
    pub file: PathBuf,

    /// Add this discount percentage to every priced line
    #[arg(long)]
    pub discount: Option<Decimal>,

    /// Replace the margin of every priced line with this percentage
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Date used for the validity check (default: today)
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

/// Structured output of `quote totals`
#[derive(Serialize)]
struct TotalsReport<'a> {
    quote: &'a Quote,
    totals: QuoteTotals,
    expired: bool,
}

pub fn run(cmd: QuoteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        QuoteCommands::Totals(args) => run_totals(args, global),
    }
}

fn run_totals(args: TotalsArgs, global: &GlobalOpts) -> Result<()> {
    let config = EngineConfig::load();
    let mut quote = load_quote(&args.file, config.validation)?;

    if let Some(pct) = args.margin {
        let items = apply_global_margin(quote.items(), pct, config.validation)?;
        quote.replace_items(items)?;
    }
    if let Some(pct) = args.discount {
        let items = apply_global_discount(quote.items(), pct, config.validation)?;
        quote.replace_items(items)?;
    }

    let today = args.today.unwrap_or_else(|| Utc::now().date_naive());
    let report = TotalsReport {
        totals: quote.totals()?,
        expired: quote.is_expired(today),
        quote: &quote,
    };

    if print_structured(&report, global.format)? {
        return Ok(());
    }

    print_lines(quote.items());
    print_totals(&report.totals);

    if report.expired {
        if let Some(valid_until) = quote.valid_until {
            println!(
                "{} quote {} expired on {}",
                style("Warning:").yellow().bold(),
                quote.id,
                valid_until
            );
        }
    }

    Ok(())
}

fn print_lines(items: &[QuoteItem]) {
    let mut builder = Builder::default();
    builder.push_record(
        ["#", "Designation", "Qty", "Unit", "Unit price", "Disc.", "Margin", "VAT", "Total HT"]
            .map(String::from),
    );

    for item in items {
        if !item.is_priceable() {
            builder.push_record([
                item.position.to_string(),
                style(truncate_str(&item.designation, 40)).bold().to_string(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
                String::new(),
            ]);
            continue;
        }
        builder.push_record([
            item.position.to_string(),
            truncate_str(&item.designation, 40),
            item.quantity().normalize().to_string(),
            item.unit.clone(),
            format_money(item.unit_price()),
            item.discount().map(format_percent).unwrap_or_default(),
            item.margin().map(format_percent).unwrap_or_default(),
            item.vat_rate().to_string(),
            format_money(item.total_ht()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
}

fn print_totals(totals: &QuoteTotals) {
    let mut builder = Builder::default();
    builder.push_record(["VAT rate", "Base HT", "VAT"].map(String::from));
    for (rate, bucket) in totals.used_rates() {
        builder.push_record([
            rate.to_string(),
            format_money(bucket.amount),
            format_money(bucket.vat_amount),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);

    println!("{} {}", style("Total HT: ").bold(), format_money(totals.total_ht));
    println!("{} {}", style("Total VAT:").bold(), format_money(totals.total_vat));
    println!(
        "{} {}",
        style("Total TTC:").green().bold(),
        format_money(totals.total_ttc)
    );
    println!(
        "{}",
        style(format!("{} priced line(s)", totals.priceable_count)).dim()
    );
}
