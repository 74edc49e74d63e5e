use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::warn;

use ops_extract::batch::{read_codes, run_batch, Progress};
use ops_extract::config::Settings;
use ops_extract::export::{render_text, write_csv, write_json};
use ops_extract::{assemble_with, ExtractionResult, HttpFetcher};

#[derive(Parser)]
#[command(
    name = "ops-extract",
    version,
    about = "Fetch official OPS code descriptions from gesund.bund.de"
)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    /// Output format (default: text for single, csv for batch)
    #[arg(short, long, value_enum, global = true)]
    format: Option<Format>,

    /// Write output to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a single code, e.g. 5-787.3M
    Single { code: String },
    /// Look up every code in the first column of a CSV file ("-" for stdin)
    Batch { input: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Text,
    Json,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let options = cli.settings.fetch_options();
    let fetcher = HttpFetcher::new(&options).context("invalid fetch settings")?;

    let (results, default_format) = match &cli.command {
        Commands::Single { code } => {
            let code = code.trim();
            if code.is_empty() {
                warn!("no code given, nothing to do");
                return Ok(());
            }
            (vec![assemble_with(&fetcher, code)], Format::Text)
        }
        Commands::Batch { input } => {
            let codes = load_codes(input)?;
            if codes.is_empty() {
                warn!(input = %input.display(), "no valid OPS codes found");
                return Ok(());
            }

            let mut progress = BarProgress::default();
            let results = run_batch(&fetcher, &codes, &mut progress);
            let failed = results.iter().filter(|r| r.is_error()).count();
            eprintln!("{} codes, {} failed", results.len(), failed);
            (results, Format::Csv)
        }
    };

    write_output(
        &results,
        cli.format.unwrap_or(default_format),
        cli.output.as_deref(),
    )
}

fn load_codes(input: &Path) -> Result<Vec<String>> {
    if input == Path::new("-") {
        return read_codes(io::stdin().lock()).context("failed to read codes from stdin");
    }
    let file =
        File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    read_codes(file).with_context(|| format!("failed to read codes from {}", input.display()))
}

fn write_output(results: &[ExtractionResult], format: Format, path: Option<&Path>) -> Result<()> {
    let mut out: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    match format {
        Format::Csv => write_csv(results, &mut out).context("failed to write CSV")?,
        Format::Json => {
            write_json(results, &mut out).context("failed to write JSON")?;
            writeln!(out)?;
        }
        Format::Text => writeln!(out, "{}", render_text(results))?,
    }

    out.flush()?;
    Ok(())
}

/// Terminal progress bar on stderr for batch runs.
#[derive(Default)]
struct BarProgress {
    bar: Option<ProgressBar>,
}

impl Progress for BarProgress {
    fn begin(&mut self, total: usize) {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        self.bar = Some(bar);
    }

    fn item_done(&mut self, _index: usize, result: &ExtractionResult) {
        if let Some(bar) = &self.bar {
            bar.set_message(result.code.clone());
            bar.inc(1);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
