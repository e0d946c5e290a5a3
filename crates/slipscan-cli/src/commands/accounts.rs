//! Accounts command - list configured receiving accounts.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use slipscan_core::receipt::normalize_account_number;
use slipscan_core::PatternRepository;

use super::{load_catalog, load_config};

/// Arguments for the accounts command.
#[derive(Args)]
pub struct AccountsArgs {
    #[command(subcommand)]
    command: AccountsCommand,
}

#[derive(Subcommand)]
enum AccountsCommand {
    /// List accounts receipts are matched against
    List {
        /// Include inactive accounts
        #[arg(long)]
        all: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Pattern/account catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

pub async fn run(args: AccountsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        AccountsCommand::List { all, json, catalog } => {
            let config = load_config(config_path)?;
            let catalog = load_catalog(catalog.as_deref(), &config)?;

            let accounts = if all {
                catalog.accounts.clone()
            } else {
                catalog.list_active_accounts()?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&accounts)?);
                return Ok(());
            }

            if accounts.is_empty() {
                println!("{} No accounts configured.", style("ℹ").blue());
                return Ok(());
            }

            println!(
                "{:<10} {:<20} {:<18} {:<16} {}",
                style("TYPE").bold(),
                style("NAME").bold(),
                style("NUMBER").bold(),
                style("MATCHES AS").bold(),
                style("HOLDER").bold()
            );

            for account in accounts {
                let mut name = account.account_name.clone();
                if account.is_primary {
                    name.push_str(" *");
                }
                if !account.is_active {
                    name.push_str(" (inactive)");
                }
                println!(
                    "{:<10} {:<20} {:<18} {:<16} {}",
                    account.account_type,
                    name,
                    account.account_number,
                    normalize_account_number(&account.account_number),
                    account.account_holder_name
                );
            }

            Ok(())
        }
    }
}
