// ora2mssql: rewrite an Oracle SQL Developer export into SQL Server scripts.
// One pass over the dump produces a definitions file and an inserts file;
// the inserts are then split into fixed-size chunks and optionally sampled.

mod converter;
mod error;
mod logger;
mod output;
mod parser;
mod progress;
mod rewrite;
mod sampler;

use clap::{CommandFactory, Parser};
use converter::{Converter, ConverterOptions, RunReport};
use error::{IoContext, Result};
use output::OutputPaths;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

// Command-line flags and positional arguments.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Oracle SQL export file.
    input: PathBuf,

    /// Output base file (default: <input>_sqlserver.sql).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target schema for every converted table.
    #[arg(long, default_value = "ADMIN")]
    schema: String,

    /// Lines per INSERT chunk file.
    #[arg(long, default_value_t = 100_000)]
    chunk_lines: usize,

    /// Keep the INSERT statements in a single file.
    #[arg(long, default_value_t = false)]
    no_split: bool,

    /// Also write up to N sample INSERTs per table.
    #[arg(long, value_name = "N")]
    samples: Option<usize>,

    /// Write run counters as JSON to file.
    #[arg(long)]
    stats_json: Option<PathBuf>,

    /// Enable debug logging (disables the progress bar).
    #[arg(long)]
    debug: bool,

    /// Only log warnings and errors.
    #[arg(long)]
    quiet: bool,
}

impl Args {
    fn options(&self) -> ConverterOptions {
        ConverterOptions {
            schema_name: self.schema.clone(),
            chunk_lines: self.chunk_lines,
            split: !self.no_split,
            samples: self.samples,
        }
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
    if std::env::args().len() == 1 {
        Args::command().print_help()?;
        eprintln!();
        std::process::exit(1);
    }
    let args = Args::parse();
    logger::configure(args.debug, args.quiet);

    if let Err(e) = run(&args) {
        logger::error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let wall_start = Instant::now();
    let paths = OutputPaths::derive(&args.input, args.output.as_deref());
    logger::debug(&format!("main: Input file: {}", args.input.display()));
    logger::debug(&format!("main: Output base: {}", paths.base.display()));
    logger::debug(&format!("main: Target schema: {}", args.schema));

    // Progress bar is disabled in debug mode to avoid mangled output.
    let progress = progress::ProgressManager::new(!args.debug && !args.quiet);
    let converter = Converter::new(args.options());
    let report = converter.run(&args.input, &paths, &progress)?;

    if let Some(path) = args.stats_json.as_ref() {
        write_stats_json(path, &report, wall_start.elapsed().as_millis())?;
    }
    if !logger::is_quiet() {
        print_summary(&report).context(|| "writing summary".to_string())?;
    }
    logger::debug(&format!(
        "Timing: total wall time {:?}",
        wall_start.elapsed()
    ));
    Ok(())
}

fn write_stats_json(path: &Path, report: &RunReport, wall_ms: u128) -> Result<()> {
    let json = serde_json::json!({
        "stats": report.stats,
        "definitions": report.paths.definitions,
        "inserts": report.paths.inserts,
        "chunks": report.chunks,
        "sample": report.sample.as_ref().map(|_| &report.paths.sample),
        "sample_summary": report.sample,
        "convert_ms": report.convert_ms,
        "split_ms": report.split_ms,
        "wall_ms": wall_ms,
    });
    let text = serde_json::to_string_pretty(&json)?;
    std::fs::write(path, text).context(|| format!("writing {}", path.display()))
}

fn print_summary(report: &RunReport) -> io::Result<()> {
    let sep = "=".repeat(60);
    let stats = &report.stats;
    let mut stderr = io::stderr();
    writeln!(stderr, "\n{}\nSUMMARY\n{}", sep, sep)?;
    writeln!(stderr, "Tables processed:            {}", stats.tables_processed)?;
    writeln!(stderr, "INSERT statements processed: {}", stats.inserts_processed)?;
    writeln!(stderr, "Malformed lines skipped:     {}", stats.malformed_skipped)?;
    writeln!(stderr, "Directives commented out:    {}", stats.directives_commented)?;
    writeln!(stderr, "Total lines processed:       {}", stats.lines_processed)?;
    writeln!(stderr, "Output files:")?;
    writeln!(stderr, "  - Table definitions:     {}", report.paths.definitions.display())?;
    writeln!(stderr, "  - All INSERT statements: {}", report.paths.inserts.display())?;
    if stats.chunks_written > 0 {
        writeln!(
            stderr,
            "  - INSERT chunks ({}):     {}",
            stats.chunks_written,
            report.paths.chunk_glob().display()
        )?;
    }
    if let Some(sample) = &report.sample {
        writeln!(
            stderr,
            "  - Samples ({} tables):    {}",
            sample.tables,
            report.paths.sample.display()
        )?;
    }
    writeln!(stderr, "{}", sep)?;
    Ok(())
}
