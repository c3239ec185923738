//! Process command - extract line items from a single receipt file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use talao_core::models::config::TalaoConfig;
use talao_core::pdf::{PdfExtractor, PdfProcessor, PdfType};
use talao_core::receipt::rules::format_amount;
use talao_core::{ExtractionResult, ParsedReceipt, ReceiptParser, RuleReceiptParser};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or extracted text)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Exit with an error when no line items are found
    #[arg(long)]
    fail_on_empty: bool,

    /// Print extraction warnings
    #[arg(long)]
    validate: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output, one row per line item
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
    let config = super::load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    pb.set_message("Reading receipt...");
    let parser = RuleReceiptParser::from_config(&config.parser);
    let result = extract_file(&args.input, &parser, &config)?;
    pb.finish_and_clear();

    if args.validate && !result.warnings.is_empty() {
        eprintln!("{}", style("Validation issues:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    let receipt = result.receipt;
    if args.fail_on_empty && receipt.items.is_empty() {
        anyhow::bail!("No line items found in {}", args.input.display());
    }

    let output = format_receipt(&receipt, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
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

/// Receipt file extensions accepted by [`extract_file`].
pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "txt", "text"];

fn lowercase_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

pub fn is_supported_input(path: &Path) -> bool {
    SUPPORTED_EXTENSIONS.contains(&lowercase_extension(path).as_str())
}

/// Read a receipt file and run the parser on its text.
///
/// PDFs go through text extraction first; `.txt` and `.text` files are read
/// as UTF-8 text.
pub fn extract_file(
    path: &Path,
    parser: &RuleReceiptParser,
    config: &TalaoConfig,
) -> anyhow::Result<ExtractionResult> {
    let extension = lowercase_extension(path);

    let result = match extension.as_str() {
        "pdf" => {
            let text = extract_pdf_text(path, config)?;
            parser.parse(&text)?
        }
        "txt" | "text" => {
            let data = fs::read(path)?;
            parser.parse_bytes(&data)?
        }
        _ => anyhow::bail!("Unsupported file format: {}", extension),
    };

    debug!(
        "{}: {} items, {} warnings",
        path.display(),
        result.receipt.items.len(),
        result.warnings.len()
    );

    Ok(result)
}

fn extract_pdf_text(path: &Path, config: &TalaoConfig) -> anyhow::Result<String> {
    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::from_config(&config.pdf);
    extractor.load(&data)?;

    debug!("PDF has {} pages", extractor.page_count());

    let content = extractor.extract_all()?;
    match content.pdf_type {
        PdfType::Text => Ok(content.text),
        PdfType::Scanned => {
            anyhow::bail!("PDF contains only scanned images; OCR is not supported")
        }
        PdfType::Empty => anyhow::bail!("PDF appears to be empty"),
    }
}

pub fn format_receipt(receipt: &ParsedReceipt, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(receipt)?),
        OutputFormat::Csv => format_csv(receipt),
        OutputFormat::Text => Ok(format_text(receipt)),
    }
}

fn format_csv(receipt: &ParsedReceipt) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "invoice_date",
        "name",
        "quantity",
        "unit_price",
        "price",
        "category",
    ])?;

    let date = receipt.invoice_date_label();
    for item in &receipt.items {
        wtr.write_record([
            date.as_str(),
            item.name.as_str(),
            &item.quantity.to_string(),
            &item.unit_price.map(|p| p.to_string()).unwrap_or_default(),
            &item.price.to_string(),
            item.category.as_deref().unwrap_or(""),
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(receipt: &ParsedReceipt) -> String {
    let mut output = String::new();
    let currency = &receipt.currency;

    match receipt.invoice_date {
        Some(_) => output.push_str(&format!("Date:  {}\n", receipt.invoice_date_label())),
        None => output.push_str("Date:  unknown\n"),
    }
    match receipt.total {
        Some(total) => output.push_str(&format!("Total: {} {}\n", format_amount(total), currency)),
        None => output.push_str("Total: unknown\n"),
    }
    output.push('\n');

    let width = receipt
        .items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(0);

    for item in &receipt.items {
        output.push_str(&format!(
            "  {:>7} x {:<width$}  {:>10}\n",
            item.quantity.to_string(),
            item.name,
            format_amount(item.price),
            width = width
        ));
    }

    let sum = receipt
        .items_total()
        .map(format_amount)
        .unwrap_or_else(|| "overflow".to_string());
    output.push_str(&format!(
        "\nItems: {} (sum {} {})\n",
        receipt.items.len(),
        sum,
        currency
    ));

    output
}
