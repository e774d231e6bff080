// Statement assembler: regroups physical dump lines into logical units.
//
// Three states. While scanning, comments and blank lines are dropped and
// each line is classified; inside a definition or a wrapped INSERT every
// line is kept verbatim until the textual terminator shows up.

use super::{in_quotes_at, paren_depth};
use crate::logger;
use regex::Regex;

/// A complete logical unit ready for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Lines of one CREATE TABLE block, storage clauses already removed.
    Definition(Vec<String>),
    /// One INSERT, physical lines joined by a single space.
    Insert(String),
    /// A session-control line with no SQL Server equivalent.
    Directive(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    Scanning,
    InDefinition,
    InInsertContinuation,
}

pub struct StatementAssembler {
    state: AssemblerState,
    buffer: Vec<String>,
    definition_start_re: Regex,
    insert_start_re: Regex,
    directive_re: Regex,
    storage_re: Regex,
}

impl StatementAssembler {
    pub fn new() -> Self {
        let definition_start_re =
            Regex::new(r"(?i)^CREATE\s+(?:GLOBAL\s+TEMPORARY\s+)?TABLE\b")
                .expect("valid definition start regex");
        let insert_start_re =
            Regex::new(r"(?i)^INSERT\s+INTO\b").expect("valid insert start regex");
        let directive_re = Regex::new(r"(?i)^(?:SET\s+\w+|ALTER\s+SESSION\b|USE\s+\S+)")
            .expect("valid directive regex");
        let storage_re = Regex::new(
            r"(?i)\b(?:SEGMENT\s+CREATION|PCTFREE|PCTUSED|INITRANS|MAXTRANS|NOCOMPRESS|COMPRESS|NOLOGGING|LOGGING|STORAGE|TABLESPACE|BUFFER_POOL|CELL_FLASH_CACHE|FLASH_CACHE|PCTINCREASE|FREELIST\s+GROUPS|FREELISTS)\b|\bLOB\s*\(",
        )
        .expect("valid storage clause regex");
        Self {
            state: AssemblerState::Scanning,
            buffer: Vec::new(),
            definition_start_re,
            insert_start_re,
            directive_re,
            storage_re,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> AssemblerState {
        self.state
    }

    // Feed one physical line; returns a unit when this line completes one.
    pub fn process_line(&mut self, line: &str) -> Option<Statement> {
        let trimmed = line.trim();
        match self.state {
            AssemblerState::Scanning => self.scan(trimmed),
            AssemblerState::InDefinition => {
                // `)` alone or anything ending in ';' closes the block.
                let terminator = trimmed.ends_with(';') || trimmed == ")";
                let kept = self.strip_storage_clause(trimmed);
                if !kept.is_empty() {
                    self.buffer.push(kept.to_string());
                }
                terminator.then(|| self.flush_definition())
            }
            AssemblerState::InInsertContinuation => {
                self.buffer.push(trimmed.to_string());
                trimmed.ends_with(");").then(|| self.flush_insert())
            }
        }
    }

    fn scan(&mut self, trimmed: &str) -> Option<Statement> {
        if is_comment_or_blank(trimmed) {
            return None;
        }

        if self.definition_start_re.is_match(trimmed) {
            let head = self.strip_storage_clause(trimmed).to_string();
            self.buffer.clear();
            self.buffer.push(head);
            if definition_complete(trimmed) {
                return Some(self.flush_definition());
            }
            self.state = AssemblerState::InDefinition;
            return None;
        }

        if self.insert_start_re.is_match(trimmed) {
            if trimmed.ends_with(';') {
                return Some(Statement::Insert(trimmed.to_string()));
            }
            self.buffer.clear();
            self.buffer.push(trimmed.to_string());
            self.state = AssemblerState::InInsertContinuation;
            return None;
        }

        if self.directive_re.is_match(trimmed) {
            return Some(Statement::Directive(trimmed.to_string()));
        }

        logger::debug(&format!("Assembler: ignoring line '{}'", preview(trimmed)));
        None
    }

    // Cut the line at the first storage/placement keyword. Keywords inside
    // quotes (column names, DEFAULT literals) are left alone.
    fn strip_storage_clause<'a>(&self, line: &'a str) -> &'a str {
        let cut = self
            .storage_re
            .find_iter(line)
            .find(|m| !in_quotes_at(line, m.start()))
            .map(|m| m.start());
        match cut {
            Some(idx) => line[..idx].trim_end(),
            None => line,
        }
    }

    fn flush_definition(&mut self) -> Statement {
        self.state = AssemblerState::Scanning;
        Statement::Definition(std::mem::take(&mut self.buffer))
    }

    fn flush_insert(&mut self) -> Statement {
        self.state = AssemblerState::Scanning;
        Statement::Insert(std::mem::take(&mut self.buffer).join(" "))
    }

    // Flush whatever is pending at end of input (best effort).
    pub fn finalize(&mut self) -> Option<Statement> {
        let pending = match self.state {
            AssemblerState::Scanning => None,
            AssemblerState::InDefinition => Some(self.flush_definition()),
            AssemblerState::InInsertContinuation => Some(self.flush_insert()),
        };
        if pending.is_some() {
            logger::debug("Assembler: flushing unterminated block at end of input");
        }
        pending
    }
}

impl Default for StatementAssembler {
    fn default() -> Self {
        Self::new()
    }
}

fn is_comment_or_blank(trimmed: &str) -> bool {
    if trimmed.is_empty() || trimmed.starts_with("--") {
        return true;
    }
    let head = trimmed.split_whitespace().next().unwrap_or_default();
    head.eq_ignore_ascii_case("REM") || head.eq_ignore_ascii_case("REMARK")
}

// A CREATE TABLE written on a single line.
fn definition_complete(first_line: &str) -> bool {
    first_line.ends_with(';')
        || (first_line.contains('(') && first_line.ends_with(')') && paren_depth(first_line) == 0)
}

pub(crate) fn preview(text: &str) -> String {
    const LIMIT: usize = 80;
    if text.chars().count() <= LIMIT {
        return text.to_string();
    }
    let mut out: String = text.chars().take(LIMIT).collect();
    out.push_str("...");
    out
}
