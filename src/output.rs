// Output files: path derivation, the shared header block and native
// line-count chunking of the inserts stream.

use crate::error::{IoContext, Result};
use crate::logger;
use chrono::Local;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Every file a run can produce, derived from one base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub base: PathBuf,
    pub definitions: PathBuf,
    pub inserts: PathBuf,
    pub sample: PathBuf,
}

impl OutputPaths {
    // `output` wins; otherwise `<input stem>_sqlserver.sql` beside the input.
    pub fn derive(input: &Path, output: Option<&Path>) -> Self {
        let base = match output {
            Some(path) => path.to_path_buf(),
            None => sibling(input, "_sqlserver.sql"),
        };
        Self {
            definitions: sibling(&base, "_definitions.sql"),
            inserts: sibling(&base, "_inserts_all.sql"),
            sample: sibling(&base, "_sample.sql"),
            base,
        }
    }

    // 1-based, zero-padded to two digits.
    pub fn chunk(&self, index: usize) -> PathBuf {
        sibling(&self.base, &format!("_inserts_chunk_{:02}.sql", index))
    }

    pub fn chunk_glob(&self) -> PathBuf {
        sibling(&self.base, "_inserts_chunk_*.sql")
    }
}

// `dir/stem.ext` -> `dir/stem<suffix>`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!("{}{}", stem, suffix))
}

pub fn header(input: &Path) -> String {
    format!(
        "-- Converted from Oracle to SQL Server\n\
         -- Conversion date: {}\n\
         -- Original file: {}\n\
         --\n\
         -- Note: This file has been automatically converted from Oracle format.\n\
         -- Please review and test before using in production.\n\n",
        Local::now().format("%Y-%m-%d %H:%M:%S"),
        input.display()
    )
}

pub fn create_writer(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::with_capacity(1024 * 1024, file))
}

// Split `source` into files of at most `lines_per_chunk` lines each,
// numbered from 01. Returns the chunk paths in order.
pub fn split_into_chunks(
    source: &Path,
    paths: &OutputPaths,
    lines_per_chunk: usize,
) -> Result<Vec<PathBuf>> {
    let lines_per_chunk = lines_per_chunk.max(1);
    let file = File::open(source).context(|| format!("opening {}", source.display()))?;
    let mut reader = BufReader::new(file);

    let mut chunks = Vec::new();
    let mut writer: Option<BufWriter<File>> = None;
    let mut in_chunk = 0usize;
    let mut line = Vec::new();

    while reader
        .read_until(b'\n', &mut line)
        .context(|| format!("reading {}", source.display()))?
        > 0
    {
        if writer.is_none() || in_chunk == lines_per_chunk {
            if let Some(mut done) = writer.take() {
                done.flush().context(|| "flushing chunk".to_string())?;
            }
            let path = paths.chunk(chunks.len() + 1);
            writer = Some(create_writer(&path)?);
            chunks.push(path);
            in_chunk = 0;
        }
        if let Some(w) = writer.as_mut() {
            w.write_all(&line)
                .context(|| format!("writing chunk {}", chunks.len()))?;
        }
        in_chunk += 1;
        line.clear();
    }

    if let Some(mut done) = writer {
        done.flush().context(|| "flushing chunk".to_string())?;
    }
    logger::debug(&format!(
        "split_into_chunks: {} chunk(s) of up to {} lines from {}",
        chunks.len(),
        lines_per_chunk,
        source.display()
    ));
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn paths_follow_input_stem() {
        let paths = OutputPaths::derive(Path::new("/data/export.sql"), None);
        assert_eq!(paths.base, PathBuf::from("/data/export_sqlserver.sql"));
        assert_eq!(
            paths.definitions,
            PathBuf::from("/data/export_sqlserver_definitions.sql")
        );
        assert_eq!(
            paths.inserts,
            PathBuf::from("/data/export_sqlserver_inserts_all.sql")
        );
        assert_eq!(
            paths.chunk(3),
            PathBuf::from("/data/export_sqlserver_inserts_chunk_03.sql")
        );
        assert_eq!(paths.sample, PathBuf::from("/data/export_sqlserver_sample.sql"));
    }

    #[test]
    fn explicit_output_is_the_base() {
        let paths = OutputPaths::derive(Path::new("in.sql"), Some(Path::new("out/target.sql")));
        assert_eq!(paths.definitions, PathBuf::from("out/target_definitions.sql"));
        assert_eq!(paths.inserts, PathBuf::from("out/target_inserts_all.sql"));
    }

    #[test]
    fn header_names_the_source() {
        let text = header(Path::new("dump.sql"));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "-- Converted from Oracle to SQL Server");
        assert!(lines[1].starts_with("-- Conversion date: "));
        assert_eq!(lines[2], "-- Original file: dump.sql");
        assert_eq!(lines[3], "--");
        assert!(text.ends_with("production.\n\n"));
    }

    #[test]
    fn chunks_hold_at_most_n_lines() {
        let dir = tempdir().unwrap();
        let paths = OutputPaths::derive(&dir.path().join("dump.sql"), None);
        let body: String = (1..=7).map(|i| format!("line {}\n", i)).collect();
        fs::write(&paths.inserts, &body).unwrap();

        let chunks = split_into_chunks(&paths.inserts, &paths, 3).unwrap();
        assert_eq!(chunks, vec![paths.chunk(1), paths.chunk(2), paths.chunk(3)]);
        assert_eq!(fs::read_to_string(&chunks[0]).unwrap(), "line 1\nline 2\nline 3\n");
        assert_eq!(fs::read_to_string(&chunks[2]).unwrap(), "line 7\n");
    }

    #[test]
    fn empty_source_produces_no_chunks() {
        let dir = tempdir().unwrap();
        let paths = OutputPaths::derive(&dir.path().join("dump.sql"), None);
        fs::write(&paths.inserts, "").unwrap();
        assert!(split_into_chunks(&paths.inserts, &paths, 10).unwrap().is_empty());
    }
}
