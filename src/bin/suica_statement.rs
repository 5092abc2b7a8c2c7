//! CLI binary for suica-statement.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use std::path::PathBuf;
use suica_statement::{extract, inspect, ExtractionConfig, ExtractionOutput, FeatureSet};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a statement and print the transaction table
  suica-statement statement.pdf

  # Structured JSON (rows, metadata, raw text)
  suica-statement --json statement.pdf > statement.json

  # Write JSON to a file
  suica-statement --json statement.pdf -o statement.json

  # Only the transaction rows, nothing else
  suica-statement --features table_rows statement.pdf

  # Encrypted statement
  suica-statement --password secret statement.pdf

  # Inspect PDF metadata only, no parsing
  suica-statement --inspect-only statement.pdf

FEATURES (comma-separated, default all):
  statement_metadata   heading block: card number, creation date, summary
  table_rows           the parsed transaction table
  raw_text             full-document text, one line per visual line
  document_metadata    PDF info dictionary (title, producer, …)

ENVIRONMENT VARIABLES:
  SUICA_STATEMENT_PASSWORD  PDF user password
  PDFIUM_LIB_PATH           Path to an existing libpdfium shared library
  RUST_LOG                  Tracing filter (overrides -v/-q)
"#;

/// Parse Mobile Suica balance-history PDF statements.
#[derive(Parser, Debug)]
#[command(
    name = "suica-statement",
    version,
    about = "Parse Mobile Suica balance-history PDF statements into structured rows",
    long_about = "Parse the Mobile Suica balance-history PDF export into structured transaction \
rows. The table is rebuilt geometrically from positioned text, so station names, balances, and \
amounts keep their columns even though the PDF carries no table structure.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the statement PDF.
    input: PathBuf,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "SUICA_STATEMENT_OUTPUT")]
    output: Option<PathBuf>,

    /// Extraction passes to run, comma-separated
    /// (statement_metadata, table_rows, raw_text, document_metadata).
    #[arg(long, value_delimiter = ',')]
    features: Vec<String>,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "SUICA_STATEMENT_PASSWORD")]
    password: Option<String>,

    /// Output structured JSON instead of a table.
    #[arg(long)]
    json: bool,

    /// Print PDF metadata only, no parsing.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let meta = inspect(&cli.input).context("Failed to inspect PDF")?;
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialise metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    // ── Build config and extract ─────────────────────────────────────────
    let mut builder = ExtractionConfig::builder().features(FeatureSet::from_strings(&cli.features));
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.as_str());
    }
    let config = builder.build().context("Invalid configuration")?;

    let output = extract(&cli.input, &config).context("Extraction failed")?;

    let rendered = if cli.json {
        let mut json =
            serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        json.push('\n');
        json
    } else {
        render_table(&output)
    };

    match cli.output {
        Some(ref path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet {
                eprintln!(
                    "{}  {} rows  →  {}",
                    green("✔"),
                    bold(&output.rows.len().to_string()),
                    bold(&path.display().to_string()),
                );
            }
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet && !cli.json {
        eprintln!(
            "{}  {} rows  {}  {}",
            green("✔"),
            bold(&output.rows.len().to_string()),
            dim(&format!("{:?}", output.statement_type)),
            dim(&format!("{} pages", output.page_count)),
        );
    }

    Ok(())
}

/// Human-readable rendering: heading block first, then an aligned table.
fn render_table(output: &ExtractionOutput) -> String {
    let mut out = String::new();

    if let Some(ref meta) = output.metadata {
        if let Some(ref heading) = meta.heading {
            out.push_str(&format!("{}\n", cyan(heading)));
        }
        if let Some(ref card) = meta.card_number_line {
            out.push_str(&format!("{card}\n"));
        }
        if let Some(date) = meta.created_date {
            out.push_str(&format!("{}\n", dim(&format!("created {date}"))));
        }
        if meta.heading.is_some() || meta.card_number_line.is_some() {
            out.push('\n');
        }
    }

    let has_balance = output.statement_type.has_balance_column();
    out.push_str(&format!(
        "{:>3}  {:<7}  {:>2} {:>2}  {:<6} {:<10}  {:<6} {:<10}",
        "#", "y-month", "m", "d", "type", "station in", "type", "station out"
    ));
    if has_balance {
        out.push_str(&format!("  {:>10}", "balance"));
    }
    out.push_str(&format!("  {:>10}\n", "amount"));

    for row in &output.rows {
        out.push_str(&format!(
            "{:>3}  {:<7}  {:>2} {:>2}  {:<6} {:<10}  {:<6} {:<10}",
            row.row_number,
            row.year_month,
            row.month,
            row.day,
            row.type_in,
            row.station_in,
            row.type_out,
            row.station_out,
        ));
        if has_balance {
            out.push_str(&format!(
                "  {:>10}",
                row.balance.as_deref().unwrap_or_default()
            ));
        }
        out.push_str(&format!("  {:>10}\n", row.amount));
    }

    out
}
