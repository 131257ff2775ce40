use clap::Parser;
use miette::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use devis::cli::{Cli, Commands, GlobalOpts};

fn init_logging(global: &GlobalOpts) {
    let filter = if global.quiet {
        "error"
    } else if global.verbose {
        "devis=debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_env("DEVIS_LOG").unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(&cli.global);

    match cli.command {
        Commands::Price(args) => devis::cli::commands::price::run(args, &cli.global),
        Commands::Quote(cmd) => devis::cli::commands::quote::run(cmd, &cli.global),
        Commands::Work(cmd) => devis::cli::commands::work::run(cmd, &cli.global),
    }
}
