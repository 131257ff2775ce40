//! `devis work` command - Cost rollup and bill of materials for works

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{format_money, format_percent, tree_prefix, truncate_str};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::bom::{flatten, BomEntry, Expansion};
use crate::core::catalog::ComponentKind;
use crate::core::config::EngineConfig;
use crate::core::error::PricingError;
use crate::core::rollup::{find_cycles, rollup, where_used, WorkCost};
use crate::yaml::load_catalog;

#[derive(Subcommand, Debug)]
pub enum WorkCommands {
    /// Roll up the cost and recommended price of a work
    Cost(CostArgs),

    /// Show the indented bill of materials of a work
    Bom(BomArgs),

    /// List the works that depend on a material, labor entry or work
    WhereUsed(WhereUsedArgs),

    /// Check a catalog for composition cycles
    Check(CheckArgs),
}

#[derive(clap::Args, Debug)]
pub struct CostArgs {
    /// Catalog YAML file
    pub catalog: PathBuf,

    /// Work ID
    pub work: String,
}

#[derive(clap::Args, Debug)]
pub struct BomArgs {
    /// Catalog YAML file
    pub catalog: PathBuf,

    /// Work ID
    pub work: String,

    /// Expand this sub-work (repeatable)
    #[arg(long = "expand", short = 'e')]
    pub expand: Vec<String>,

    /// Expand every sub-work
    #[arg(long, conflicts_with = "expand")]
    pub all: bool,
}

#[derive(clap::Args, Debug)]
pub struct WhereUsedArgs {
    /// Catalog YAML file
    pub catalog: PathBuf,

    /// Material, labor or work ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct CheckArgs {
    /// Catalog YAML file
    pub catalog: PathBuf,
}

pub fn run(cmd: WorkCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        WorkCommands::Cost(args) => run_cost(args, global),
        WorkCommands::Bom(args) => run_bom(args, global),
        WorkCommands::WhereUsed(args) => run_where_used(args, global),
        WorkCommands::Check(args) => run_check(args, global),
    }
}

fn run_cost(args: CostArgs, global: &GlobalOpts) -> Result<()> {
    let config = EngineConfig::load();
    let snapshot = load_catalog(&args.catalog)?;
    let catalog = snapshot.catalog();

    let work = catalog
        .work(&args.work)
        .ok_or_else(|| PricingError::UnknownWork { id: args.work.clone() })?;
    let cost = rollup(work, &catalog, &config)?;

    if print_structured(&cost, global.format)? {
        return Ok(());
    }

    println!(
        "{} {} ({})",
        style("Work:").bold(),
        work.name,
        style(&work.id).cyan()
    );
    print_cost_lines(&cost);
    print_cost_summary(&cost);

    if cost.has_unresolved() {
        println!(
            "{} unresolved component(s) counted at zero: {}",
            style("Warning:").yellow().bold(),
            cost.unresolved.join(", ")
        );
    }

    Ok(())
}

fn print_cost_lines(cost: &WorkCost) {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Kind", "Name", "Qty", "Unit price", "Cost"].map(String::from));
    for line in &cost.lines {
        builder.push_record([
            line.component_id.clone(),
            line.kind.to_string(),
            truncate_str(&line.name, 36),
            line.quantity.normalize().to_string(),
            format_money(line.unit_price),
            format_money(line.line_cost),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
}

fn print_cost_summary(cost: &WorkCost) {
    let rows = [
        ("Materials", cost.material_cost, cost.material_pct),
        ("Labor", cost.labor_cost, cost.labor_pct),
        ("Sub-works", cost.sub_works_cost, cost.sub_works_pct),
    ];
    for (label, amount, pct) in rows {
        println!(
            "  {:<10} {:>12}  {}",
            label,
            format_money(amount),
            style(format_percent(pct)).dim()
        );
    }
    println!("{} {}", style("Total cost:").bold(), format_money(cost.total_cost));
    println!(
        "{} {} ({})",
        style("Margin:").bold(),
        format_money(cost.margin_amount),
        format_percent(cost.margin)
    );
    println!(
        "{} {}",
        style("Recommended price:").green().bold(),
        format_money(cost.recommended_price)
    );
}

fn run_bom(args: BomArgs, global: &GlobalOpts) -> Result<()> {
    let config = EngineConfig::load();
    let snapshot = load_catalog(&args.catalog)?;
    let catalog = snapshot.catalog();

    let work = catalog
        .work(&args.work)
        .ok_or_else(|| PricingError::UnknownWork { id: args.work.clone() })?;

    let expanded: HashSet<String> = args.expand.iter().cloned().collect();
    let expansion = if args.all {
        Expansion::All
    } else if expanded.is_empty() {
        Expansion::None
    } else {
        Expansion::Only(&expanded)
    };

    let entries: Vec<BomEntry> =
        flatten(work, &catalog, expansion, config.max_depth).collect::<Result<_, _>>()?;

    if print_structured(&entries, global.format)? {
        return Ok(());
    }

    println!("{} {}", style("Bill of materials:").bold(), work.name);
    for entry in &entries {
        let marker = match entry.kind {
            ComponentKind::Work if entry.expanded => "▾ ",
            ComponentKind::Work => "▸ ",
            _ => "",
        };
        let name = if entry.kind == ComponentKind::Unresolved {
            style(format!("{} (not found)", entry.name)).red().to_string()
        } else {
            entry.name.clone()
        };
        let cached = if entry.kind == ComponentKind::Work {
            style(" (cached)").dim().to_string()
        } else {
            String::new()
        };
        println!(
            "{}{}{}: {} × {} {} @ {}{}",
            tree_prefix(entry.depth),
            marker,
            style(&entry.component_id).cyan(),
            name,
            entry.quantity.normalize(),
            entry.unit,
            format_money(entry.unit_price),
            cached
        );
    }
    if entries.iter().any(|e| e.kind == ComponentKind::Work) {
        println!(
            "{}",
            style("Sub-work prices are the stored recommended prices; `devis work cost` recomputes them.")
                .dim()
        );
    }

    Ok(())
}

#[derive(Serialize)]
struct WhereUsedRow<'a> {
    id: &'a str,
    name: &'a str,
    direct: bool,
}

fn run_where_used(args: WhereUsedArgs, global: &GlobalOpts) -> Result<()> {
    let snapshot = load_catalog(&args.catalog)?;
    let users = where_used(&args.id, &snapshot.works);

    let rows: Vec<WhereUsedRow> = users
        .iter()
        .map(|w| WhereUsedRow {
            id: &w.id,
            name: &w.name,
            direct: w.references(&args.id),
        })
        .collect();

    if print_structured(&rows, global.format)? {
        return Ok(());
    }

    if rows.is_empty() {
        println!("No work uses {}", args.id);
        return Ok(());
    }

    for row in &rows {
        let how = if row.direct { "direct" } else { "via sub-work" };
        println!("{}: {} ({})", style(row.id).cyan(), row.name, style(how).dim());
    }
    println!();
    println!("{} work(s) found", style(rows.len()).cyan());

    Ok(())
}

fn run_check(args: CheckArgs, global: &GlobalOpts) -> Result<()> {
    let snapshot = load_catalog(&args.catalog)?;
    let cycles = find_cycles(&snapshot.catalog());

    if !print_structured(&cycles, global.format)? {
        if cycles.is_empty() {
            println!(
                "{} {} work(s), no composition cycle",
                style("✓").green(),
                snapshot.works.len()
            );
        }
        for cycle in &cycles {
            println!("{} {}", style("✗ cycle:").red().bold(), cycle.join(" -> "));
        }
    }

    if cycles.is_empty() {
        Ok(())
    } else {
        Err(miette::miette!(
            "{} composition cycle(s) found in {}",
            cycles.len(),
            args.catalog.display()
        ))
    }
}
