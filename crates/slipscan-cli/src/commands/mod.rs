//! Subcommands and the helpers they share.

pub mod accounts;
pub mod batch;
pub mod commission;
pub mod config;
pub mod patterns;
pub mod process;

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use slipscan_core::{Catalog, SlipscanConfig};

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("slipscan")
        .join("config.json")
}

/// Load the configuration from `-c`, the default location, or built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<SlipscanConfig> {
    if let Some(path) = config_path {
        return Ok(SlipscanConfig::from_file(Path::new(path))?);
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Using config from {}", default_path.display());
        Ok(SlipscanConfig::from_file(&default_path)?)
    } else {
        Ok(SlipscanConfig::default())
    }
}

/// Load the pattern/account catalog.
///
/// An explicit `--catalog` must exist. The configured catalog path falls
/// back to the stock GCash pattern with no accounts.
pub fn load_catalog(explicit: Option<&Path>, config: &SlipscanConfig) -> anyhow::Result<Catalog> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Catalog file not found: {}", path.display());
            }
            Ok(Catalog::load(path)?)
        }
        None => {
            let path = &config.storage.catalog_path;
            if path.exists() {
                Ok(Catalog::load(path)?)
            } else {
                warn!(
                    "Catalog {} not found, using the default GCash pattern",
                    path.display()
                );
                Ok(Catalog::with_default_pattern())
            }
        }
    }
}

/// Clap value parser for money amounts that may not be negative.
pub fn parse_money(value: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(value.trim().replace(',', "").as_str())
        .map_err(|_| format!("'{}' is not a valid amount", value))?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(format!("'{}' must not be negative", value));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_money() {
        assert_eq!(parse_money("1,000.50"), Ok(Decimal::new(100050, 2)));
        assert_eq!(parse_money(" 0 "), Ok(Decimal::ZERO));
        assert!(parse_money("-5").is_err());
        assert!(parse_money("abc").is_err());
    }
}
