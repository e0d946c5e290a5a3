//! Batch processing command for multiple receipt files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use slipscan_core::{CaptureOutcome, FileReceiptStore, ReceiptImage, ReceiptPipeline};

use super::process::{
    capture_file, csv_row, format_outcome, is_image, is_text, load_engine, OutputFormat,
    CSV_HEADER,
};
use super::{load_catalog, load_config};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Pattern/account catalog file
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Save every processed receipt for this agent
    #[arg(long)]
    agent: Option<String>,

    /// Receipt store directory (default: from config)
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

/// What happened to one input file.
struct FileReport {
    path: PathBuf,
    /// Output file name without the format extension.
    output_stem: String,
    outcome: Result<CaptureOutcome, String>,
    elapsed_ms: u64,
}

impl FileReport {
    fn file_name(&self) -> &str {
        self.path.file_name().and_then(|s| s.to_str()).unwrap_or("")
    }
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(model_dir) = &args.model_dir {
        config.ocr.model_dir = model_dir.clone();
    }
    let catalog = load_catalog(args.catalog.as_deref(), &config)?;

    // Expand glob pattern
    let mut files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_image(p) || is_text(p))
        .collect();
    files.sort();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // One engine for every image in the batch
    let engine = if files.iter().any(|p| is_image(p)) {
        Some(load_engine(&config.ocr)?)
    } else {
        None
    };

    let store = args.agent.as_ref().map(|_| {
        FileReceiptStore::new(args.data_dir.clone().unwrap_or_else(|| config.storage.data_dir.clone()))
    });
    let pipeline = ReceiptPipeline::new(&catalog, &config);

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut reports = Vec::with_capacity(files.len());

    let stems = output_stems(&files);

    for (path, output_stem) in files.into_iter().zip(stems) {
        let began = Instant::now();
        let captured = capture_file(&path, &catalog, &config, engine.as_ref(), false).and_then(|outcome| {
            if let (Some(store), Some(agent)) = (&store, &args.agent) {
                let image = if is_image(&path) {
                    Some(ReceiptImage::from_path(&path)?)
                } else {
                    None
                };
                let stored = pipeline.save(store, &outcome, image.as_ref(), agent)?;
                debug!("Saved {} as {}", path.display(), stored.id);
            }
            Ok(outcome)
        });
        let elapsed_ms = began.elapsed().as_millis() as u64;

        let outcome = match captured {
            Ok(outcome) => Ok(outcome),
            Err(e) if args.continue_on_error => {
                warn!("Skipping {}: {}", path.display(), e);
                Err(e.to_string())
            }
            Err(e) => {
                error!("Failed to process {}: {}", path.display(), e);
                anyhow::bail!("Processing {} failed: {}", path.display(), e);
            }
        };

        reports.push(FileReport {
            path,
            output_stem,
            outcome,
            elapsed_ms,
        });
        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<(&FileReport, &CaptureOutcome)> = reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().ok().map(|o| (r, o)))
        .collect();
    let failed: Vec<(&FileReport, &String)> = reports
        .iter()
        .filter_map(|r| r.outcome.as_ref().err().map(|e| (r, e)))
        .collect();

    if let Some(output_dir) = &args.output_dir {
        for (report, outcome) in &successful {
            let output_path = output_dir.join(format!(
                "{}.{}",
                report.output_stem,
                args.format.extension()
            ));

            fs::write(&output_path, format_outcome(outcome, args.format)?)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    if args.summary {
        let summary_path = match &args.output_dir {
            Some(dir) => dir.join("summary.csv"),
            None => PathBuf::from("summary.csv"),
        };

        write_summary(&summary_path, &reports)?;
        eprintln!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    let flagged = successful.iter().filter(|(_, o)| !o.warnings.is_empty()).count();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        reports.len(),
        start.elapsed()
    );
    println!(
        "   {} captured ({} need review), {} failed",
        style(successful.len()).green(),
        style(flagged).yellow(),
        style(failed.len()).red()
    );

    for (report, reason) in &failed {
        println!("  {} {}: {}", style("✗").red(), report.path.display(), reason);
    }

    Ok(())
}

fn write_summary(path: &Path, reports: &[FileReport]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["filename", "status"];
    header.extend(CSV_HEADER);
    header.extend(["processing_time_ms", "error"]);
    wtr.write_record(&header)?;

    for report in reports {
        let mut record = vec![report.file_name().to_string()];
        match &report.outcome {
            Ok(outcome) => {
                record.push("success".to_string());
                record.extend(csv_row(outcome));
                record.push(report.elapsed_ms.to_string());
                record.push(String::new());
            }
            Err(reason) => {
                record.push("error".to_string());
                record.extend(CSV_HEADER.iter().map(|_| String::new()));
                record.push(report.elapsed_ms.to_string());
                record.push(reason.clone());
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Output stems for each input, in order.
///
/// Inputs sharing a stem (`a.txt`, `a.png`) keep their extension as a
/// suffix (`a_txt`, `a_png`) so no output overwrites another.
fn output_stems(paths: &[PathBuf]) -> Vec<String> {
    let stem = |path: &PathBuf| {
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("receipt")
            .to_string()
    };

    let mut seen: HashMap<String, usize> = HashMap::new();
    for path in paths {
        *seen.entry(stem(path)).or_default() += 1;
    }

    paths
        .iter()
        .map(|path| {
            let base = stem(path);
            match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if seen[&base] > 1 => format!("{}_{}", base, ext),
                _ => base,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_stems_keep_distinct_names() {
        let paths = vec![
            PathBuf::from("in/a.png"),
            PathBuf::from("in/a.txt"),
            PathBuf::from("in/b.jpg"),
            PathBuf::from("other/b.txt"),
            PathBuf::from("in/c.txt"),
        ];

        assert_eq!(output_stems(&paths), vec!["a_png", "a_txt", "b_jpg", "b_txt", "c"]);
    }
}
