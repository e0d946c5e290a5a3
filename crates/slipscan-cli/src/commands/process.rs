//! Process command - capture a single receipt.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use slipscan_core::models::config::OcrConfig;
use slipscan_core::receipt::rules::format_amount;
use slipscan_core::{
    CaptureOutcome, Catalog, FileReceiptStore, PureOcrEngine, ReceiptImage, ReceiptPipeline,
    SlipscanConfig,
};

use super::{load_catalog, load_config, parse_money};

/// Image extensions routed through OCR.
pub const IMAGE_EXTENSIONS: [&str; 7] = ["png", "jpg", "jpeg", "webp", "tiff", "tif", "bmp"];

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (receipt image, or .txt with already-recognized text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Pattern/account catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Customer tip included in the amount
    #[arg(long, value_parser = parse_money)]
    tip: Option<Decimal>,

    /// Sender name, overriding the extracted one
    #[arg(long)]
    sender: Option<String>,

    /// Free-text notes stored with the receipt
    #[arg(long)]
    notes: Option<String>,

    /// Save the receipt, even when there are warnings
    #[arg(long)]
    save: bool,

    /// Agent saving the receipt (required with --save)
    #[arg(long)]
    agent: Option<String>,

    /// Receipt store directory (default: from config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }
    let catalog = load_catalog(args.catalog.as_deref(), &config)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }
    if args.save && args.agent.as_deref().is_none_or(|a| a.trim().is_empty()) {
        anyhow::bail!("--agent is required with --save");
    }

    info!("Processing file: {}", args.input.display());

    let mut outcome = capture_file(&args.input, &catalog, &config, None, true)?;
    outcome.apply_review(
        args.sender.clone(),
        args.tip,
        args.notes.clone(),
        &config.commission,
    );

    if !outcome.warnings.is_empty() {
        eprintln!("{}", style("Review warnings:").yellow());
        for warning in &outcome.warnings {
            eprintln!("  - {}", warning);
        }
    }

    if args.save {
        let data_dir = args.data_dir.clone().unwrap_or_else(|| config.storage.data_dir.clone());
        let store = FileReceiptStore::new(data_dir);
        let image = if is_image(&args.input) {
            Some(ReceiptImage::from_path(&args.input)?)
        } else {
            None
        };

        let pipeline = ReceiptPipeline::new(&catalog, &config);
        let stored = pipeline.save(&store, &outcome, image.as_ref(), args.agent.as_deref().unwrap_or_default())?;
        eprintln!(
            "{} Saved receipt {} to {}",
            style("✓").green(),
            stored.id,
            store.records_path().display()
        );
    }

    let output = format_outcome(&outcome, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

pub fn is_text(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("txt"))
}

/// Create the OCR engine, with a hint when models are missing.
pub fn load_engine(config: &OcrConfig) -> anyhow::Result<PureOcrEngine> {
    PureOcrEngine::from_config(config.clone()).map_err(|e| {
        anyhow::anyhow!(
            "{}\n\nPlace {}, {} and {} in {} or pass --model-dir.",
            e,
            config.detection_model,
            config.recognition_model,
            config.dictionary,
            config.model_dir.display()
        )
    })
}

/// Run one file through the pipeline.
///
/// Text files bypass OCR. `engine` is reused when given; otherwise one is
/// loaded for image inputs.
pub fn capture_file(
    path: &Path,
    catalog: &Catalog,
    config: &SlipscanConfig,
    engine: Option<&PureOcrEngine>,
    show_progress: bool,
) -> anyhow::Result<CaptureOutcome> {
    let pipeline = ReceiptPipeline::new(catalog, config);

    if is_text(path) {
        let text = fs::read_to_string(path)?;
        return Ok(pipeline.process_text(&text)?);
    }
    if !is_image(path) {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    let loaded;
    let engine = match engine {
        Some(engine) => engine,
        None => {
            loaded = load_engine(&config.ocr)?;
            &loaded
        }
    };

    let image = image::open(path)?;

    let pb = if show_progress {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
                .progress_chars("##-"),
        );
        pb.set_message("Running OCR...");
        pb
    } else {
        ProgressBar::hidden()
    };

    let outcome = pipeline.process_image(engine, &image, &mut |percent: u8| pb.set_position(percent as u64))?;
    pb.finish_with_message("Done");

    Ok(outcome)
}

pub fn format_outcome(outcome: &CaptureOutcome, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(outcome)?),
        OutputFormat::Csv => format_csv(outcome),
        OutputFormat::Text => Ok(format_text(outcome)),
    }
}

/// CSV columns for one receipt.
pub const CSV_HEADER: [&str; 14] = [
    "amount",
    "reference_number",
    "date_time",
    "sender_name",
    "receiver_name",
    "receiver_number",
    "transaction_type",
    "status",
    "is_valid_account",
    "customer_tip",
    "agent_commission",
    "matched_pattern",
    "matched_account",
    "warnings",
];

pub fn csv_row(outcome: &CaptureOutcome) -> Vec<String> {
    let receipt = &outcome.receipt;
    let money = |value: Option<Decimal>| value.map(|v| format!("{:.2}", v.round_dp(2))).unwrap_or_default();

    vec![
        money(receipt.amount),
        receipt.reference_number.clone().unwrap_or_default(),
        receipt.date_time_string().unwrap_or_default(),
        receipt.sender_name.clone().unwrap_or_default(),
        receipt.receiver_name.clone().unwrap_or_default(),
        receipt.receiver_number.clone().unwrap_or_default(),
        label(&receipt.transaction_type),
        label(&receipt.status),
        receipt.is_valid_account.to_string(),
        money(receipt.customer_tip),
        money(receipt.agent_commission),
        receipt.matched_pattern.clone().unwrap_or_default(),
        receipt.matched_account.clone().unwrap_or_default(),
        outcome.warnings.join("; "),
    ]
}

/// The serde name of a unit enum variant.
fn label<T: Serialize>(value: &T) -> String {
    serde_json::to_value(value)
        .ok()
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_default()
}

fn format_csv(outcome: &CaptureOutcome) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(CSV_HEADER)?;
    wtr.write_record(csv_row(outcome))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(outcome: &CaptureOutcome) -> String {
    let receipt = &outcome.receipt;
    let or_dash = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());
    let money = |value: Option<Decimal>| value.map(format_amount).unwrap_or_else(|| "-".to_string());

    let mut output = String::new();

    output.push_str(&format!("Amount:      {}\n", money(receipt.amount)));
    output.push_str(&format!("Reference:   {}\n", or_dash(&receipt.reference_number)));
    output.push_str(&format!("Date:        {}\n", or_dash(&receipt.date_time_string())));
    output.push_str(&format!("Sender:      {}\n", or_dash(&receipt.sender_name)));
    output.push_str(&format!(
        "Receiver:    {} ({})\n",
        or_dash(&receipt.receiver_name),
        or_dash(&receipt.receiver_number)
    ));
    output.push_str(&format!("Type:        {}\n", label(&receipt.transaction_type)));
    output.push('\n');

    let account = match &receipt.matched_account {
        Some(name) => format!("{} (valid)", name),
        None => "no configured account matched".to_string(),
    };
    output.push_str(&format!("Account:     {}\n", account));
    output.push_str(&format!("Pattern:     {}\n", or_dash(&receipt.matched_pattern)));
    output.push('\n');

    output.push_str(&format!("Tip:         {}\n", money(receipt.customer_tip)));
    output.push_str(&format!("Commission:  {}\n", money(receipt.agent_commission)));

    if let Some(notes) = &receipt.notes {
        output.push_str(&format!("\nNotes: {}\n", notes));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_kinds() {
        assert!(is_image(Path::new("receipt.JPG")));
        assert!(is_text(Path::new("ocr.txt")));
        assert!(!is_image(Path::new("ocr.txt")));
        assert!(!is_text(Path::new("scan.pdf")));
    }

    #[test]
    fn test_csv_row_matches_header() {
        let catalog = Catalog::with_default_pattern();
        let config = SlipscanConfig::default();
        let outcome = ReceiptPipeline::new(&catalog, &config)
            .process_text("Amount 150.00 Ref No. 42 Aug 5, 2025 9:00 AM")
            .unwrap();

        let row = csv_row(&outcome);
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[0], "150.00");
        assert_eq!(row[2], "2025-08-05T09:00");
        assert_eq!(row[6], "send");
    }
}
