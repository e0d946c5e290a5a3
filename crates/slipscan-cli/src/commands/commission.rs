//! Commission command - price a receipt without capturing it.

use clap::Args;
use rust_decimal::Decimal;

use slipscan_core::receipt::rules::format_amount;
use slipscan_core::receipt::{calculate_commission, round_currency};

use super::{load_config, parse_money};

/// Arguments for the commission command.
#[derive(Args)]
pub struct CommissionArgs {
    /// Total amount received, tip included
    #[arg(value_parser = parse_money)]
    amount: Decimal,

    /// Customer tip included in the amount
    #[arg(long, value_parser = parse_money, default_value = "0")]
    tip: Decimal,

    /// Percent of the service portion (default: from config)
    #[arg(long, value_parser = parse_money)]
    service_rate: Option<Decimal>,

    /// Percent of the tip (default: from config)
    #[arg(long, value_parser = parse_money)]
    tip_rate: Option<Decimal>,
}

pub async fn run(args: CommissionArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let service_rate = args.service_rate.unwrap_or(config.commission.service_rate);
    let tip_rate = args.tip_rate.unwrap_or(config.commission.tip_rate);

    let commission = calculate_commission(args.amount, args.tip, service_rate, tip_rate);
    println!("{}", format_amount(round_currency(commission)));

    Ok(())
}
