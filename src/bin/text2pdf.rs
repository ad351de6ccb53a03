//! CLI binary for edgequake-text2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` / `SearchQuery` and prints results.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use edgequake_text2pdf::{
    CountMetric, IngestResult, PipelineConfig, SearchQuery, SortOrder, TextPage, TextPipeline,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ingest a text given on the command line
  text2pdf ingest "The quick brown fox jumps over the lazy dog."

  # Ingest files concurrently, JSON output
  text2pdf ingest --file notes.txt --file draft.txt --concurrency 8 --json

  # Ingest from stdin
  cat letter.txt | text2pdf ingest

  # Second page of stored texts containing "fox", oldest first
  text2pdf list --page 2 --limit 10 --search fox --sort oldest

ENVIRONMENT VARIABLES:
  TEXT2PDF_DB           SQLite database file (default: text2pdf.db)
  TEXT2PDF_OUTPUT_DIR   Directory for generated PDFs (default: artifacts)
  TEXT2PDF_COUNT_METRIC characters | words
  RUST_LOG              Override the log filter (e.g. edgequake_text2pdf=debug)
"#;

/// Tokenize text, render it to PDF and keep a searchable record.
#[derive(Parser, Debug)]
#[command(
    name = "text2pdf",
    version,
    about = "Tokenize text, render it to PDF and keep a deduplicated, searchable record",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "TEXT2PDF_DB", default_value = "text2pdf.db", global = true)]
    db: PathBuf,

    /// Directory receiving generated PDFs.
    #[arg(long, env = "TEXT2PDF_OUTPUT_DIR", default_value = "artifacts", global = true)]
    output_dir: PathBuf,

    /// Metric stored as the record count.
    #[arg(
        long,
        env = "TEXT2PDF_COUNT_METRIC",
        value_parser = clap::value_parser!(CountMetric),
        default_value = "characters",
        global = true
    )]
    count_metric: CountMetric,

    /// Maximum accepted text length in characters.
    #[arg(long, env = "TEXT2PDF_MAX_CHARS", default_value_t = 20_000, global = true)]
    max_chars: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "TEXT2PDF_VERBOSE", global = true)]
    verbose: bool,

    /// Suppress all output except errors and results.
    #[arg(short, long, env = "TEXT2PDF_QUIET", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ingest one or more texts (stdin when none given).
    Ingest {
        /// Texts to ingest.
        texts: Vec<String>,

        /// Read a text from this file (repeatable).
        #[arg(short, long)]
        file: Vec<PathBuf>,

        /// Number of texts processed concurrently.
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        /// Output structured JSON instead of a summary.
        #[arg(long)]
        json: bool,
    },
    /// List stored texts.
    List {
        /// Page number (1-indexed).
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Records per page (1–100).
        #[arg(long, default_value_t = 10)]
        limit: u32,

        /// Case-insensitive substring filter.
        #[arg(long)]
        search: Option<String>,

        /// Creation-time ordering: newest | oldest.
        #[arg(long, value_parser = clap::value_parser!(SortOrder), default_value = "newest")]
        sort: SortOrder,

        /// Output structured JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = PipelineConfig::builder()
        .output_dir(&cli.output_dir)
        .database_path(&cli.db)
        .count_metric(cli.count_metric)
        .max_text_chars(cli.max_chars)
        .build()
        .context("Invalid configuration")?;
    let pipeline = TextPipeline::from_config(&config).context("Failed to open record store")?;

    match cli.command {
        Command::Ingest {
            ref texts,
            ref file,
            concurrency,
            json,
        } => ingest(&pipeline, texts, file, concurrency, json, cli.quiet).await,
        Command::List {
            page,
            limit,
            ref search,
            sort,
            json,
        } => {
            let mut query = SearchQuery::new(page, limit)
                .context("Invalid pagination")?
                .sort(sort);
            if let Some(term) = search {
                query = query.search(term.as_str());
            }
            let page = pipeline.list_texts(&query).await.context("Listing failed")?;
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&page).context("Failed to serialise output")?
                );
            } else {
                print_page(&page, &query);
            }
            Ok(())
        }
    }
}

async fn ingest(
    pipeline: &TextPipeline,
    texts: &[String],
    files: &[PathBuf],
    concurrency: usize,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let mut inputs: Vec<String> = texts.to_vec();
    for path in files {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        inputs.push(text);
    }
    if inputs.is_empty() {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        inputs.push(buf);
    }

    let spinner = (!quiet && !json && inputs.len() > 1).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}  ⏱ {elapsed_precise}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(format!("Ingesting {} texts…", inputs.len()));
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    });

    let results = pipeline.process_batch(&inputs, concurrency).await;

    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }

    let mut ok: Vec<&IngestResult> = Vec::new();
    let mut failed = 0;
    for (i, result) in results.iter().enumerate() {
        match result {
            Ok(r) => ok.push(r),
            Err(e) => {
                failed += 1;
                eprintln!("{} input {}: {}", red("✗"), i + 1, e);
            }
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ok).context("Failed to serialise output")?
        );
    } else {
        for r in &ok {
            let langs: Vec<&str> = r.languages.iter().map(String::as_str).collect();
            println!(
                "{} {}  {}  {}",
                green("✓"),
                bold(&r.file_path.display().to_string()),
                dim(&format!("count {} · {} words", r.count, r.word_count)),
                dim(&format!("[{}]", langs.join(", "))),
            );
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed}/{} inputs failed", results.len());
    }
    Ok(())
}

fn print_page(page: &TextPage, query: &SearchQuery) {
    for r in &page.texts {
        let preview: String = r.text.chars().take(60).collect();
        let preview = preview.replace('\n', " ");
        let ellipsis = if r.text.chars().count() > 60 { "…" } else { "" };
        println!(
            "{:>5}  {}  {:>7}  {}{}",
            r.id,
            dim(&r.created_at.format("%Y-%m-%d %H:%M:%S").to_string()),
            r.count,
            preview,
            ellipsis
        );
    }
    eprintln!(
        "{}",
        dim(&format!(
            "page {} · {} shown · {} total",
            query.page(),
            page.texts.len(),
            page.total_count
        ))
    );
}
