//! Patterns command - list and test extraction patterns.

use std::fs;
use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use slipscan_core::models::catalog::ExtractionPattern;
use slipscan_core::receipt::{probe_pattern, CompiledPattern, FieldProbe};
use slipscan_core::PatternRepository;

use super::{load_catalog, load_config};

/// Arguments for the patterns command.
#[derive(Args)]
pub struct PatternsArgs {
    #[command(subcommand)]
    command: PatternsCommand,
}

#[derive(Subcommand)]
enum PatternsCommand {
    /// List patterns in evaluation order
    List {
        /// Include inactive patterns
        #[arg(long)]
        all: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Pattern/account catalog file
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Test pattern regexes against sample receipt text
    Test(TestArgs),
}

#[derive(Args)]
struct TestArgs {
    /// File containing recognized receipt text
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    file: Option<PathBuf>,

    /// Sample text given inline
    #[arg(long)]
    text: Option<String>,

    /// Only test the pattern with this name
    #[arg(short, long, conflicts_with = "defaults")]
    pattern: Option<String>,

    /// Test the configured default rules instead of the catalog
    #[arg(long)]
    defaults: bool,

    /// Print JSON instead of a report
    #[arg(long)]
    json: bool,

    /// Pattern/account catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,
}

pub async fn run(args: PatternsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        PatternsCommand::List { all, json, catalog } => list_patterns(all, json, catalog, config_path),
        PatternsCommand::Test(test_args) => test_patterns(test_args, config_path),
    }
}

fn list_patterns(
    all: bool,
    json: bool,
    catalog: Option<PathBuf>,
    config_path: Option<&str>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let catalog = load_catalog(catalog.as_deref(), &config)?;

    let patterns = if all {
        catalog.patterns.clone()
    } else {
        catalog.list_active_patterns()?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&patterns)?);
        return Ok(());
    }

    if patterns.is_empty() {
        println!("{} No patterns configured.", style("ℹ").blue());
        return Ok(());
    }

    println!(
        "{:<8} {:<10} {:<28} {}",
        style("PRIORITY").bold(),
        style("TYPE").bold(),
        style("NAME").bold(),
        style("STATUS").bold()
    );

    for pattern in patterns {
        let status = pattern_status(&pattern);
        println!(
            "{:<8} {:<10} {:<28} {}",
            pattern.priority, pattern.account_type, pattern.pattern_name, status
        );
    }

    Ok(())
}

fn pattern_status(pattern: &ExtractionPattern) -> String {
    if !pattern.is_active {
        return style("inactive").dim().to_string();
    }

    let errors = CompiledPattern::compile(pattern.clone()).errors();
    if errors.is_empty() {
        style("ok").green().to_string()
    } else {
        let reasons: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        style(reasons.join("; ")).red().to_string()
    }
}

fn test_patterns(args: TestArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let text = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => {
            if !path.exists() {
                anyhow::bail!("Input file not found: {}", path.display());
            }
            fs::read_to_string(path)?
        }
        (None, None) => anyhow::bail!("Provide a text file or --text"),
    };

    let patterns: Vec<ExtractionPattern> = if args.defaults {
        vec![config.extraction.default_rules.to_pattern("defaults")]
    } else {
        let catalog = load_catalog(args.catalog.as_deref(), &config)?;
        let active = catalog.list_active_patterns()?;
        match &args.pattern {
            Some(name) => {
                let selected: Vec<_> = active
                    .into_iter()
                    .filter(|p| p.pattern_name.eq_ignore_ascii_case(name))
                    .collect();
                if selected.is_empty() {
                    anyhow::bail!("No active pattern named '{}'", name);
                }
                selected
            }
            None => active,
        }
    };

    let reports: Vec<PatternReport> = patterns
        .iter()
        .map(|pattern| PatternReport {
            pattern: pattern.pattern_name.clone(),
            account_type: pattern.account_type.clone(),
            fields: probe_pattern(&text, pattern),
        })
        .collect();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!(
            "{} {} ({})",
            style("▸").cyan(),
            style(&report.pattern).bold(),
            report.account_type
        );
        for probe in &report.fields {
            println!("    {:<24} {}", probe.rule, describe_probe(probe));
        }
        println!();
    }

    Ok(())
}

#[derive(serde::Serialize)]
struct PatternReport {
    pattern: String,
    account_type: String,
    fields: Vec<FieldProbe>,
}

fn describe_probe(probe: &FieldProbe) -> String {
    if let Some(error) = &probe.error {
        return style(error).red().to_string();
    }
    match (&probe.value, &probe.full_match) {
        (Some(value), _) => format!("{} {}", style("✓").green(), value.trim()),
        (None, Some(full)) => format!("{} matched '{}' without a capture group", style("!").yellow(), full),
        (None, None) => style("no match").dim().to_string(),
    }
}
