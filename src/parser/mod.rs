// Parser module: line assembly, CREATE TABLE parsing, INSERT parsing and
// the value-list tokenizer. Nothing here rewrites text; see crate::rewrite.

pub mod assembler;
pub mod insert;
pub mod schema;
pub mod tokenizer;

/// One element of a VALUES list after trimming.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueToken {
    /// Quote-delimited, outer quotes included.
    Literal(String),
    /// Numbers, NULL, function calls, anything unquoted.
    Expression(String),
}

impl ValueToken {
    pub fn classify(raw: &str) -> Self {
        let trimmed = raw.trim();
        let mut chars = trimmed.chars();
        let quoted = match (chars.next(), chars.next_back()) {
            (Some(first), Some(last)) => (first == '\'' || first == '"') && first == last,
            _ => false,
        };
        if quoted {
            ValueToken::Literal(trimmed.to_string())
        } else {
            ValueToken::Expression(trimmed.to_string())
        }
    }

    #[cfg(test)]
    pub fn is_literal(&self) -> bool {
        matches!(self, ValueToken::Literal(_))
    }
}

// Strip one layer of identifier quoting: "NAME" or `NAME`.
pub fn unquote_identifier(raw: &str) -> String {
    raw.trim()
        .trim_matches(['"', '`', '[', ']'].as_ref())
        .trim()
        .to_string()
}

// Walks text tracking quotes and parenthesis depth; `on_char` sees every
// character with the depth in effect and whether it sits inside quotes.
fn scan_structure(text: &str, mut on_char: impl FnMut(usize, char, i32, bool) -> bool) {
    let mut in_single = false;
    let mut in_double = false;
    let mut depth = 0i32;
    for (i, c) in text.char_indices() {
        let quoted = in_single || in_double;
        if c == '\'' && !in_double {
            in_single = !in_single;
        } else if c == '"' && !in_single {
            in_double = !in_double;
        } else if !quoted {
            if c == '(' {
                depth += 1;
            } else if c == ')' {
                depth -= 1;
            }
        }
        if !on_char(i, c, depth, quoted) {
            break;
        }
    }
}

// Net parenthesis depth outside quotes at the end of `text`.
pub fn paren_depth(text: &str) -> i32 {
    let mut last = 0;
    scan_structure(text, |_, _, depth, _| {
        last = depth;
        true
    });
    last
}

// Byte index of the ')' closing the '(' at `open`.
pub fn matching_close(text: &str, open: usize) -> Option<usize> {
    let mut found = None;
    scan_structure(&text[open..], |i, c, depth, quoted| {
        if c == ')' && !quoted && depth == 0 {
            found = Some(open + i);
            return false;
        }
        true
    });
    found
}

// True when byte `idx` of `text` falls inside a quoted span.
pub fn in_quotes_at(text: &str, idx: usize) -> bool {
    let mut inside = false;
    scan_structure(text, |i, _, _, quoted| {
        if i == idx {
            inside = quoted;
            return false;
        }
        true
    });
    inside
}

// Drop a trailing `--` comment; dashes inside quotes are data.
pub fn strip_line_comment(line: &str) -> &str {
    let mut cut = None;
    scan_structure(line, |i, c, _, quoted| {
        if c == '-' && !quoted && line[i..].starts_with("--") {
            cut = Some(i);
            return false;
        }
        true
    });
    match cut {
        Some(i) => &line[..i],
        None => line,
    }
}

// Split on commas outside quotes and parentheses.
pub fn split_top_level(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut buf = String::new();
    scan_structure(text, |_, c, depth, quoted| {
        if c == ',' && depth == 0 && !quoted {
            parts.push(std::mem::take(&mut buf).trim().to_string());
        } else {
            buf.push(c);
        }
        true
    });
    parts.push(buf.trim().to_string());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_respects_parens_and_quotes() {
        assert_eq!(
            split_top_level(r#""A" NUMBER(10,2), "B" VARCHAR2(5) DEFAULT 'x,y'"#),
            vec![r#""A" NUMBER(10,2)"#, r#""B" VARCHAR2(5) DEFAULT 'x,y'"#]
        );
    }

    #[test]
    fn matching_close_skips_nested_and_quoted() {
        let text = "( a(1), ')' ) tail";
        assert_eq!(matching_close(text, 0), Some(12));
        assert_eq!(matching_close("(open", 0), None);
    }

    #[test]
    fn quote_position_and_line_comments() {
        let line = r#""MODE" VARCHAR2(20) DEFAULT 'STORAGE'"#;
        assert!(in_quotes_at(line, line.find("STORAGE").unwrap()));
        assert!(in_quotes_at(line, 1));
        assert!(!in_quotes_at(line, line.find("VARCHAR2").unwrap()));

        assert_eq!(strip_line_comment(r#""A" NUMBER, -- id"#), r#""A" NUMBER, "#);
        assert_eq!(strip_line_comment("-- note"), "");
        assert_eq!(strip_line_comment("DEFAULT '--x'"), "DEFAULT '--x'");
    }

    #[test]
    fn paren_depth_ignores_quoted_parens() {
        assert_eq!(paren_depth("CREATE TABLE T ( A NUMBER(3)"), 1);
        assert_eq!(paren_depth("( 'x)' )"), 0);
    }

    #[test]
    fn classify_requires_matching_quotes() {
        assert!(ValueToken::classify(" 'abc' ").is_literal());
        assert!(ValueToken::classify("''").is_literal());
        assert!(ValueToken::classify("\"x\"").is_literal());
        assert!(!ValueToken::classify("'").is_literal());
        assert!(!ValueToken::classify("'abc\"").is_literal());
        assert!(!ValueToken::classify("to_date('a','b')").is_literal());
        assert_eq!(
            ValueToken::classify("  42 "),
            ValueToken::Expression("42".into())
        );
    }

    #[test]
    fn unquote_strips_identifier_quotes() {
        assert_eq!(unquote_identifier(" \"ID\" "), "ID");
        assert_eq!(unquote_identifier("`name`"), "name");
        assert_eq!(unquote_identifier("PLAIN"), "PLAIN");
    }
}
