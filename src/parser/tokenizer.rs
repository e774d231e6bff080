// Value-list tokenizer: splits the text between VALUES ( ... ) into
// top-level comma-separated tokens.
//
// A single pass with one character of lookahead. Inside a literal a doubled
// quote is an escaped quote and stays in the token; a lone quote closes the
// literal. Parentheses are not tracked, so callers re-join tokens with ", ".

use super::ValueToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexState {
    Outside,
    InLiteral(char),
}

/// Raw tokens plus whether the scan ended inside an open literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    pub tokens: Vec<String>,
    pub unterminated: bool,
}

pub fn tokenize(values: &str) -> Tokenized {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut state = LexState::Outside;
    let mut chars = values.chars().peekable();

    while let Some(c) = chars.next() {
        match state {
            LexState::Outside => match c {
                ',' => tokens.push(std::mem::take(&mut buf)),
                '\'' | '"' => {
                    state = LexState::InLiteral(c);
                    buf.push(c);
                }
                _ => buf.push(c),
            },
            LexState::InLiteral(quote) if c == quote => {
                buf.push(c);
                if chars.peek() == Some(&quote) {
                    // Escaped quote: keep both, stay inside.
                    chars.next();
                    buf.push(quote);
                } else {
                    state = LexState::Outside;
                }
            }
            LexState::InLiteral(_) => buf.push(c),
        }
    }
    tokens.push(buf);

    Tokenized {
        tokens,
        unterminated: state != LexState::Outside,
    }
}

// Tokenize and classify in one go; each token is trimmed first.
pub fn tokenize_values(values: &str) -> (Vec<ValueToken>, bool) {
    let Tokenized {
        tokens,
        unterminated,
    } = tokenize(values);
    let classified = tokens.iter().map(|t| ValueToken::classify(t)).collect();
    (classified, unterminated)
}

// Count of commas outside literals, using the same quote rules.
#[cfg(test)]
fn top_level_commas(values: &str) -> usize {
    let mut count = 0;
    let mut state = LexState::Outside;
    let mut chars = values.chars().peekable();
    while let Some(c) = chars.next() {
        match state {
            LexState::Outside if c == ',' => count += 1,
            LexState::Outside if c == '\'' || c == '"' => state = LexState::InLiteral(c),
            LexState::InLiteral(q) if c == q => {
                if chars.peek() == Some(&q) {
                    chars.next();
                } else {
                    state = LexState::Outside;
                }
            }
            _ => {}
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_on_top_level_commas() {
        let out = tokenize("1, 'a,b', NULL");
        assert_eq!(out.tokens, vec!["1", " 'a,b'", " NULL"]);
        assert!(!out.unterminated);
    }

    #[test]
    fn doubled_quote_stays_inside_literal() {
        let (tokens, unterminated) = tokenize_values("1, 'O''Brien', NULL");
        assert!(!unterminated);
        assert_eq!(
            tokens,
            vec![
                ValueToken::Expression("1".to_string()),
                ValueToken::Literal("'O''Brien'".to_string()),
                ValueToken::Expression("NULL".to_string()),
            ]
        );
    }

    #[test]
    fn double_quotes_are_literals_too() {
        let out = tokenize(r#""a,""b",2"#);
        assert_eq!(out.tokens, vec![r#""a,""b""#, "2"]);
    }

    #[test]
    fn empty_literals_and_trailing_escape() {
        let out = tokenize("'','x''',3");
        assert_eq!(out.tokens, vec!["''", "'x'''", "3"]);
        assert!(!out.unterminated);
    }

    #[test]
    fn unterminated_literal_does_not_fail() {
        let out = tokenize("1, 'broken, 2");
        assert!(out.unterminated);
        assert_eq!(out.tokens, vec!["1", " 'broken, 2"]);
    }

    #[test]
    fn every_position_yields_a_token() {
        assert_eq!(tokenize("1,,3,").tokens, vec!["1", "", "3", ""]);
        assert_eq!(tokenize("").tokens, vec![""]);
    }

    #[test]
    fn token_count_matches_top_level_commas() {
        let inputs = [
            "1,2,3",
            "'a','b''c',NULL",
            "to_date('x','y'),'z'",
            "'''',''''''",
            "\"q,\",'r'",
            "'a;b[c]',4.5,'',-1",
        ];
        for input in inputs {
            let out = tokenize(input);
            assert!(!out.unterminated, "{}", input);
            assert_eq!(out.tokens.len(), top_level_commas(input) + 1, "{}", input);
        }
    }

    #[test]
    fn pathological_quote_runs_stay_linear() {
        let input = "'".repeat(100_001);
        let out = tokenize(&input);
        assert_eq!(out.tokens.len(), 1);
        assert!(out.unterminated);
    }
}
