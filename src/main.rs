use anyhow::Result;
use clap::Parser;
use scriptbundle::js::cli::BundleCommands;
use tracing_subscriber::EnvFilter;

/// Concatenate, minify and source-map script bundles
#[derive(Parser, Debug)]
#[command(name = "scriptbundle", version, about)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: BundleCommands,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    cli.command.run()
}
