//! Stats command - spending per article and per month.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use console::style;
use glob::glob;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};

use talao_core::receipt::rules::format_amount;
use talao_core::{
    aggregate, filter_articles, monthly_totals, summarize, AggregationOptions, ArticleSort,
    ArticleSummary, ParsedReceipt,
};

use super::process::OutputFormat;

/// Arguments for the stats command.
#[derive(Args)]
pub struct StatsArgs {
    /// Glob pattern matching receipt JSON files written by `process` or `batch`
    #[arg(required = true)]
    input: String,

    /// Sort articles by (default: from config)
    #[arg(short, long, value_enum)]
    sort: Option<SortBy>,

    /// Only show articles whose name contains this term
    #[arg(long)]
    search: Option<String>,

    /// Include totals per month
    #[arg(long)]
    monthly: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum SortBy {
    /// Total quantity bought
    Quantity,
    /// Total amount spent
    Total,
}

impl From<SortBy> for ArticleSort {
    fn from(sort: SortBy) -> Self {
        match sort {
            SortBy::Quantity => ArticleSort::Quantity,
            SortBy::Total => ArticleSort::Total,
        }
    }
}

#[derive(Serialize)]
struct StatsReport {
    receipts: usize,
    articles: Vec<ArticleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    monthly: Option<BTreeMap<String, Decimal>>,
}

pub async fn run(args: StatsArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"))
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No receipt JSON files found for pattern: {}", args.input);
    }

    let mut receipts = Vec::with_capacity(files.len());
    for path in &files {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let receipt: ParsedReceipt = serde_json::from_str(&content)
            .with_context(|| format!("{} is not a receipt JSON file", path.display()))?;
        debug!("{}: {} items", path.display(), receipt.items.len());
        receipts.push(receipt);
    }

    info!("Loaded {} receipts", receipts.len());

    let options = AggregationOptions::from_config(&config.aggregation);
    let totals = aggregate(receipts.iter().flat_map(|r| r.items.iter()), &options);

    let sort = args.sort.map(ArticleSort::from).unwrap_or(config.aggregation.sort);
    let mut articles = summarize(&totals, sort);
    if let Some(term) = &args.search {
        articles = filter_articles(articles, term);
    }

    let report = StatsReport {
        receipts: receipts.len(),
        articles,
        monthly: args.monthly.then(|| monthly_totals(&receipts)),
    };

    let output = match args.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report)?,
        OutputFormat::Csv => format_csv(&report)?,
        OutputFormat::Text => format_text(&report),
    };

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    Ok(())
}

/// Articles as CSV, or months when `--monthly` is given.
fn format_csv(report: &StatsReport) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    if let Some(monthly) = &report.monthly {
        wtr.write_record(["Month", "Total"])?;
        for (month, total) in monthly {
            wtr.write_record([month.as_str(), &format!("{:.2}", total)])?;
        }
    } else {
        wtr.write_record(["Article", "Total Qty", "Total Value"])?;
        for article in &report.articles {
            wtr.write_record([
                article.name.as_str(),
                &article.quantity.normalize().to_string(),
                &format!("{:.2}", article.total),
            ])?;
        }
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(report: &StatsReport) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} receipts, {} articles\n\n",
        report.receipts,
        report.articles.len()
    ));

    let width = report
        .articles
        .iter()
        .map(|a| a.name.chars().count())
        .max()
        .unwrap_or(0);

    for article in &report.articles {
        output.push_str(&format!(
            "  {:<width$}  {:>8}  {:>10}\n",
            article.name,
            article.quantity.normalize().to_string(),
            format_amount(article.total),
            width = width
        ));
    }

    if let Some(monthly) = &report.monthly {
        output.push_str("\nMonthly totals:\n");
        for (month, total) in monthly {
            output.push_str(&format!("  {}  {:>10}\n", month, format_amount(*total)));
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn report(monthly: bool) -> StatsReport {
        let mut months = BTreeMap::new();
        months.insert("2024-03".to_string(), Decimal::from_str("33.5").unwrap());

        StatsReport {
            receipts: 2,
            articles: vec![ArticleSummary {
                name: "ATUM OLEO 85G".to_string(),
                quantity: Decimal::from_str("9.000").unwrap(),
                total: Decimal::from_str("8.43").unwrap(),
            }],
            monthly: monthly.then_some(months),
        }
    }

    #[test]
    fn test_article_csv() {
        let csv = format_csv(&report(false)).unwrap();
        assert_eq!(csv, "Article,Total Qty,Total Value\nATUM OLEO 85G,9,8.43\n");
    }

    #[test]
    fn test_monthly_csv() {
        let csv = format_csv(&report(true)).unwrap();
        assert_eq!(csv, "Month,Total\n2024-03,33.50\n");
    }

    #[test]
    fn test_text_report() {
        let text = format_text(&report(true));
        assert!(text.starts_with("2 receipts, 1 articles"));
        assert!(text.contains("ATUM OLEO 85G"));
        assert!(text.contains("2024-03"));
        assert!(text.contains("33,50"));
    }
}
