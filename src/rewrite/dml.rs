// INSERT rewriting: bracket the target, translate functions in the value
// list, then sanitize every literal token and re-join the list.

use super::functions::FunctionTranslator;
use super::sanitize::{is_scientific_overflow, StringSanitizer};
use super::{bracket, qualified_name};
use crate::logger;
use crate::parser::insert::InsertParser;
use crate::parser::tokenizer::tokenize_values;
use crate::parser::ValueToken;
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Rewritten(String),
    /// Commented-out original; the statement could not be rewritten safely.
    Malformed(String),
}

pub struct InsertRewriter {
    schema: String,
    parser: InsertParser,
    sanitizer: StringSanitizer,
    functions: FunctionTranslator,
    null_re: Regex,
}

impl InsertRewriter {
    pub fn new(schema: &str) -> Self {
        Self {
            schema: schema.to_string(),
            parser: InsertParser::new(),
            sanitizer: StringSanitizer::new(),
            functions: FunctionTranslator::new(),
            null_re: Regex::new(r"(?i)\bnull\b").expect("valid null regex"),
        }
    }

    pub fn functions(&self) -> &FunctionTranslator {
        &self.functions
    }

    pub fn rewrite(&self, statement: &str) -> InsertOutcome {
        let repaired = repair_trailing_parens(statement);
        let Some(unit) = self.parser.parse(&repaired) else {
            logger::debug("InsertRewriter: statement has no recognisable target or VALUES list");
            return malformed(statement);
        };

        if let Some(source) = unit.schema.as_deref() {
            if !source.eq_ignore_ascii_case(&self.schema) {
                logger::debug(&format!(
                    "InsertRewriter: retargeting {}.{} to schema {}",
                    source, unit.table, self.schema
                ));
            }
        }

        let values = self.functions.translate(&unit.values);
        let (tokens, unterminated) = tokenize_values(&values);
        if unterminated {
            logger::debug(&format!(
                "InsertRewriter: unterminated literal in insert into {}",
                unit.table
            ));
            return malformed(statement);
        }
        if !unit.columns.is_empty() && tokens.len() != unit.columns.len() {
            logger::debug(&format!(
                "InsertRewriter: {} expects {} values, got {}",
                unit.table,
                unit.columns.len(),
                tokens.len()
            ));
        }

        let rewritten: Vec<String> = tokens.iter().map(|t| self.rewrite_token(t)).collect();

        let mut sql = format!(
            "INSERT INTO {}",
            qualified_name(&self.schema, &unit.table)
        );
        if !unit.columns.is_empty() {
            let cols: Vec<String> = unit.columns.iter().map(|c| bracket(c)).collect();
            sql.push_str(&format!(" ({})", cols.join(", ")));
        }
        sql.push_str(&format!(" VALUES ({});", rewritten.join(", ")));
        InsertOutcome::Rewritten(sql)
    }

    pub fn rewrite_token(&self, token: &ValueToken) -> String {
        match token {
            ValueToken::Literal(lit) if is_scientific_overflow(lit) => "NULL".to_string(),
            ValueToken::Literal(lit) => self.sanitizer.sanitize(lit),
            ValueToken::Expression(expr) => self.null_re.replace_all(expr, "NULL").into_owned(),
        }
    }
}

// Corrupted exports sometimes close a statement twice: ');); and ););
fn repair_trailing_parens(statement: &str) -> String {
    statement.replace("'););", "');").replace("););", ");")
}

fn malformed(statement: &str) -> InsertOutcome {
    InsertOutcome::Malformed(format!("-- SKIPPED MALFORMED LINE: {}", statement.trim()))
}
