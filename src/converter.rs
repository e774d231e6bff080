// Conversion pipeline: stream the dump line by line through the statement
// assembler and route each finished unit to the definitions or inserts
// stream. Counters live in a caller-owned ConversionStats.

use crate::error::{ConvertError, IoContext, Result};
use crate::logger;
use crate::output::{self, OutputPaths};
use crate::parser::assembler::{preview, Statement, StatementAssembler};
use crate::parser::schema::SchemaParser;
use crate::progress::ProgressManager;
use crate::rewrite::comment_out_directive;
use crate::rewrite::ddl::{render_table, skipped_table};
use crate::rewrite::dml::{InsertOutcome, InsertRewriter};
use crate::sampler::{SampleExtractor, SampleSummary};
use indicatif::ProgressBar;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

const PROGRESS_EVERY_LINES: usize = 10_000;

#[derive(Debug, Clone)]
pub struct ConverterOptions {
    /// Schema written into every bracketed target name.
    pub schema_name: String,
    /// Lines per inserts chunk file.
    pub chunk_lines: usize,
    pub split: bool,
    /// Per-table sample count; None skips sample extraction.
    pub samples: Option<usize>,
}

impl Default for ConverterOptions {
    fn default() -> Self {
        Self {
            schema_name: "ADMIN".to_string(),
            chunk_lines: 100_000,
            split: true,
            samples: None,
        }
    }
}

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct ConversionStats {
    pub tables_processed: usize,
    pub inserts_processed: usize,
    pub lines_processed: usize,
    pub directives_commented: usize,
    pub malformed_skipped: usize,
    pub chunks_written: usize,
}

// What a file-level run produced.
#[derive(Debug)]
pub struct RunReport {
    pub stats: ConversionStats,
    pub paths: OutputPaths,
    pub chunks: Vec<PathBuf>,
    pub sample: Option<SampleSummary>,
    pub convert_ms: u128,
    pub split_ms: u128,
}

pub struct Converter {
    options: ConverterOptions,
    schema_parser: SchemaParser,
    rewriter: InsertRewriter,
}

impl Converter {
    pub fn new(options: ConverterOptions) -> Self {
        let rewriter = InsertRewriter::new(&options.schema_name);
        Self {
            options,
            schema_parser: SchemaParser::new(),
            rewriter,
        }
    }

    // Convert `input` into the files named by `paths`, then chunk and
    // sample the inserts stream as configured.
    pub fn run(
        &self,
        input: &Path,
        paths: &OutputPaths,
        progress: &ProgressManager,
    ) -> Result<RunReport> {
        if !input.exists() {
            return Err(ConvertError::InputNotFound(input.to_path_buf()));
        }
        let size = std::fs::metadata(input)
            .context(|| format!("reading metadata of {}", input.display()))?
            .len();
        logger::info(&format!("Converting {} to SQL Server format", input.display()));
        logger::info(&format!("File size: {:.1} MB", size as f64 / (1024.0 * 1024.0)));

        let file = File::open(input).context(|| format!("opening {}", input.display()))?;
        let reader = BufReader::with_capacity(1024 * 1024, file);
        let mut definitions = output::create_writer(&paths.definitions)?;
        let mut inserts = output::create_writer(&paths.inserts)?;

        let header = output::header(input);
        definitions
            .write_all(header.as_bytes())
            .context(|| format!("writing {}", paths.definitions.display()))?;
        inserts
            .write_all(header.as_bytes())
            .context(|| format!("writing {}", paths.inserts.display()))?;

        let mut stats = ConversionStats::default();
        let bar = progress.new_file_bar(input, "Converting");
        let convert_start = Instant::now();
        self.convert(reader, &mut definitions, &mut inserts, &mut stats, bar.as_ref())?;
        definitions
            .flush()
            .context(|| format!("flushing {}", paths.definitions.display()))?;
        inserts
            .flush()
            .context(|| format!("flushing {}", paths.inserts.display()))?;
        drop(inserts);
        let convert_ms = convert_start.elapsed().as_millis();
        logger::debug(&format!(
            "Timing: conversion took {:?}",
            convert_start.elapsed()
        ));

        let split_start = Instant::now();
        let chunks = if self.options.split {
            output::split_into_chunks(&paths.inserts, paths, self.options.chunk_lines)?
        } else {
            Vec::new()
        };
        if stats.malformed_skipped > 0 {
            logger::warn(&format!(
                "{} INSERT statement(s) could not be converted and were commented out",
                stats.malformed_skipped
            ));
        }
        stats.chunks_written = chunks.len();
        if !chunks.is_empty() {
            logger::info(&format!("Created {} INSERT chunk files", chunks.len()));
        }
        let split_ms = split_start.elapsed().as_millis();

        let sample = match self.options.samples {
            Some(n) => {
                let extractor = SampleExtractor::new(&self.options.schema_name, n);
                Some(extractor.extract(&paths.inserts, &paths.sample)?)
            }
            None => None,
        };

        Ok(RunReport {
            stats,
            paths: paths.clone(),
            chunks,
            sample,
            convert_ms,
            split_ms,
        })
    }

    // Stream conversion over any reader/writers. Undecodable bytes are
    // replaced rather than failing the run.
    pub fn convert<R: BufRead, D: Write, I: Write>(
        &self,
        mut reader: R,
        definitions: &mut D,
        inserts: &mut I,
        stats: &mut ConversionStats,
        bar: Option<&ProgressBar>,
    ) -> Result<()> {
        let mut assembler = StatementAssembler::new();
        let mut raw = Vec::new();

        while reader
            .read_until(b'\n', &mut raw)
            .context(|| "reading input".to_string())?
            > 0
        {
            stats.lines_processed += 1;
            if let Some(b) = bar {
                b.inc(raw.len() as u64);
            } else if logger::is_debug() && stats.lines_processed % PROGRESS_EVERY_LINES == 0 {
                logger::debug(&format!("Convert: processed {} lines", stats.lines_processed));
            }

            let line = String::from_utf8_lossy(&raw);
            if let Some(stmt) = assembler.process_line(&line) {
                self.emit(stmt, definitions, inserts, stats)?;
            }
            raw.clear();
        }

        if let Some(stmt) = assembler.finalize() {
            self.emit(stmt, definitions, inserts, stats)?;
        }
        if let Some(b) = bar {
            b.finish();
        }

        logger::debug(&format!(
            "Convert: {} tables, {} inserts, {} skipped",
            stats.tables_processed, stats.inserts_processed, stats.malformed_skipped
        ));
        Ok(())
    }

    fn emit<D: Write, I: Write>(
        &self,
        stmt: Statement,
        definitions: &mut D,
        inserts: &mut I,
        stats: &mut ConversionStats,
    ) -> Result<()> {
        match stmt {
            Statement::Definition(lines) => {
                let Some(def) = self.schema_parser.parse_definition(&lines) else {
                    logger::debug("Convert: definition block without a table header");
                    return Ok(());
                };
                let rendered = if def.columns.is_empty() {
                    logger::debug(&format!("Convert: table {} has no usable columns", def.name));
                    vec![skipped_table(&def.name)]
                } else {
                    stats.tables_processed += 1;
                    render_table(&def, &self.options.schema_name, self.rewriter.functions())
                };
                for line in rendered {
                    writeln!(definitions, "{}", line)
                        .context(|| "writing definitions".to_string())?;
                }
            }
            Statement::Insert(text) => match self.rewriter.rewrite(&text) {
                InsertOutcome::Rewritten(sql) => {
                    stats.inserts_processed += 1;
                    writeln!(inserts, "{}", sql).context(|| "writing inserts".to_string())?;
                }
                InsertOutcome::Malformed(comment) => {
                    stats.malformed_skipped += 1;
                    logger::debug(&format!("Convert: skipped insert '{}'", preview(&text)));
                    writeln!(inserts, "{}", comment).context(|| "writing inserts".to_string())?;
                }
            },
            Statement::Directive(line) => {
                stats.directives_commented += 1;
                writeln!(definitions, "{}", comment_out_directive(&line))
                    .context(|| "writing definitions".to_string())?;
            }
        }
        Ok(())
    }
}
