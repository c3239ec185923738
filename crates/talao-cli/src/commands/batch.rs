//! Batch processing command for multiple receipt files.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use talao_core::{ParsedReceipt, RuleReceiptParser};

use super::process::{extract_file, format_receipt, is_supported_input, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern matching receipt files (PDF or text)
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
}

const SUMMARY_FILE: &str = "summary.csv";

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    receipt: Option<ParsedReceipt>,
    error: Option<String>,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && is_supported_input(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let parser = RuleReceiptParser::from_config(&config.parser);
    let mut results = Vec::with_capacity(files.len());

    for path in files {
        match extract_file(&path, &parser, &config) {
            Ok(result) => {
                results.push(ProcessResult {
                    path,
                    receipt: Some(result.receipt),
                    error: None,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(ProcessResult {
                        path,
                        receipt: None,
                        error: Some(error_msg),
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }

        pb.inc(1);
    }

    pb.finish_and_clear();

    let successful: Vec<_> = results.iter().filter(|r| r.receipt.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    if let Some(output_dir) = &args.output_dir {
        let mut used = HashSet::new();
        if args.summary {
            used.insert(SUMMARY_FILE.to_string());
        }

        for result in &successful {
            if let Some(receipt) = &result.receipt {
                let name = output_name(&result.path, args.format.extension(), &mut used);
                let output_path = output_dir.join(name);

                fs::write(&output_path, format_receipt(receipt, args.format)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join(SUMMARY_FILE))
            .unwrap_or_else(|| PathBuf::from(SUMMARY_FILE));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

/// Output file name for `path`, unique within one batch run.
///
/// `march.txt` becomes `march.json`. When another input already took that
/// name (`march.pdf`), the source extension is kept (`march.txt.json`), then
/// a counter is appended.
fn output_name(path: &Path, extension: &str, used: &mut HashSet<String>) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("receipt");
    let source_ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

    let mut name = format!("{}.{}", stem, extension);
    if used.contains(&name) {
        if !source_ext.is_empty() {
            name = format!("{}.{}.{}", stem, source_ext, extension);
        }
        let mut counter = 2;
        while used.contains(&name) {
            name = format!("{}-{}.{}", stem, counter, extension);
            counter += 1;
        }
        warn!(
            "Output name for {} already taken, writing {}",
            path.display(),
            name
        );
    }

    used.insert(name.clone());
    name
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "invoice_date",
        "total",
        "item_count",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(receipt) = &result.receipt {
            wtr.write_record([
                filename,
                "success",
                &receipt.invoice_date_label(),
                &receipt.total.map(|t| t.to_string()).unwrap_or_default(),
                &receipt.items.len().to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
