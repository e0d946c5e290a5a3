//! CLI application for mobile-payment receipt capture.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{accounts, batch, commission, config, patterns, process};

/// Receipt capture - extract, reconcile and price mobile-payment receipts
#[derive(Parser)]
#[command(name = "slipscan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single receipt image or text file
    Process(process::ProcessArgs),

    /// Process multiple receipt files
    Batch(batch::BatchArgs),

    /// Inspect and test extraction patterns
    Patterns(patterns::PatternsArgs),

    /// Inspect payment accounts
    Accounts(accounts::AccountsArgs),

    /// Compute an agent commission
    Commission(commission::CommissionArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Patterns(args) => patterns::run(args, config_path).await,
        Commands::Accounts(args) => accounts::run(args, config_path).await,
        Commands::Commission(args) => commission::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
