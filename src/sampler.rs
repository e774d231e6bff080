// Sample extraction: the first N converted INSERTs of every table, in the
// order tables are first seen, written to a small reference script.

use crate::error::{IoContext, Result};
use crate::logger;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

#[derive(Debug, Default, Clone, Serialize, PartialEq, Eq)]
pub struct SampleSummary {
    pub tables: usize,
    pub statements: usize,
}

pub struct SampleExtractor {
    samples_per_table: usize,
    target_re: Regex,
}

impl SampleExtractor {
    pub fn new(schema: &str, samples_per_table: usize) -> Self {
        let target_re = Regex::new(&format!(
            r"(?i)^INSERT\s+INTO\s+\[{}\]\.\[((?:[^\]]|\]\])+)\]",
            regex::escape(&schema.replace(']', "]]"))
        ))
        .expect("valid sample target regex");
        Self {
            samples_per_table,
            target_re,
        }
    }

    pub fn extract(&self, input: &Path, output: &Path) -> Result<SampleSummary> {
        logger::debug(&format!("SampleExtractor: reading {}", input.display()));
        let file = File::open(input).context(|| format!("opening {}", input.display()))?;
        let reader = BufReader::new(file);

        let mut order: Vec<String> = Vec::new();
        let mut samples: HashMap<String, Vec<String>> = HashMap::new();
        for line in reader.lines() {
            let line = line.context(|| format!("reading {}", input.display()))?;
            let line = line.trim();
            let Some(caps) = self.target_re.captures(line) else {
                continue;
            };
            let table = caps[1].to_string();
            let kept = samples.entry(table.clone()).or_insert_with(|| {
                order.push(table);
                Vec::new()
            });
            if kept.len() < self.samples_per_table {
                kept.push(line.to_string());
            }
        }

        let mut out = crate::output::create_writer(output)?;
        let summary = self
            .write_samples(&mut out, input, &order, &samples)
            .context(|| format!("writing {}", output.display()))?;
        out.flush().context(|| format!("flushing {}", output.display()))?;
        Ok(summary)
    }

    fn write_samples<W: Write>(
        &self,
        out: &mut W,
        input: &Path,
        order: &[String],
        samples: &HashMap<String, Vec<String>>,
    ) -> std::io::Result<SampleSummary> {
        writeln!(out, "-- Sample INSERT statements extracted from {}", input.display())?;
        writeln!(
            out,
            "-- This file contains sample data for each table (max {} samples per table)",
            self.samples_per_table
        )?;
        writeln!(out, "-- Table definitions (CREATE TABLE statements) are excluded")?;
        writeln!(out, "-- Generated automatically for testing and reference purposes")?;
        writeln!(out)?;

        let mut summary = SampleSummary::default();
        for table in order {
            let Some(rows) = samples.get(table).filter(|r| !r.is_empty()) else {
                continue;
            };
            writeln!(out, "-- Table: {} ({} sample(s))", table, rows.len())?;
            for row in rows {
                writeln!(out, "{}", row)?;
            }
            writeln!(out)?;
            summary.tables += 1;
            summary.statements += rows.len();
        }

        writeln!(out, "-- Summary")?;
        writeln!(out, "-- Total tables with data: {}", summary.tables)?;
        writeln!(out, "-- Total sample INSERT statements: {}", summary.statements)?;
        writeln!(out, "-- Samples per table: {}", self.samples_per_table)?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn keeps_first_n_per_table_in_first_seen_order() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("inserts.sql");
        let output = dir.path().join("sample.sql");
        fs::write(
            &input,
            "-- header\n\
             INSERT INTO [ADMIN].[B] VALUES (1);\n\
             INSERT INTO [ADMIN].[A] VALUES (1);\n\
             INSERT INTO [ADMIN].[B] VALUES (2);\n\
             INSERT INTO [ADMIN].[B] VALUES (3);\n\
             INSERT INTO [OTHER].[C] VALUES (1);\n\
             -- SKIPPED MALFORMED LINE: Insert into X\n",
        )
        .unwrap();

        let summary = SampleExtractor::new("ADMIN", 2).extract(&input, &output).unwrap();
        assert_eq!(summary, SampleSummary { tables: 2, statements: 3 });

        let text = fs::read_to_string(&output).unwrap();
        let body: Vec<&str> = text
            .lines()
            .skip_while(|l| !l.starts_with("-- Table:"))
            .collect();
        assert_eq!(
            body,
            vec![
                "-- Table: B (2 sample(s))",
                "INSERT INTO [ADMIN].[B] VALUES (1);",
                "INSERT INTO [ADMIN].[B] VALUES (2);",
                "",
                "-- Table: A (1 sample(s))",
                "INSERT INTO [ADMIN].[A] VALUES (1);",
                "",
                "-- Summary",
                "-- Total tables with data: 2",
                "-- Total sample INSERT statements: 3",
                "-- Samples per table: 2",
            ]
        );
    }

    #[test]
    fn zero_samples_writes_only_the_frame() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("inserts.sql");
        let output = dir.path().join("sample.sql");
        fs::write(&input, "INSERT INTO [ADMIN].[A] VALUES (1);\n").unwrap();

        let summary = SampleExtractor::new("ADMIN", 0).extract(&input, &output).unwrap();
        assert_eq!(summary, SampleSummary::default());
        assert!(!fs::read_to_string(&output).unwrap().contains("-- Table:"));
    }
}
