// String literal sanitizer for SQL Server.
//
// Each literal goes through the same fixed battery: re-escape quotes,
// substitute known trouble patterns, cap the length, collapse long runs,
// swap structural characters and finally catch grossly malformed content.
// Every step is total.

use regex::Regex;

pub const MAX_LITERAL_CHARS: usize = 100;
pub const TRUNCATION_MARKER: &str = "... [TRUNCATED]";
pub const REPEAT_MARKER: &str = "... [REPEATED]";
pub const MALFORMED_SENTINEL: &str = "MALFORMED_STRING";
// Marker spellings once the structural swap has run.
const SWAPPED_TRUNCATION_MARKER: &str = "... (TRUNCATED)";
const SWAPPED_REPEAT_MARKER: &str = "... (REPEATED)";
// Hard ceiling on sanitized content, markers included.
const MAX_SANITIZED_CHARS: usize = MAX_LITERAL_CHARS + TRUNCATION_MARKER.len();
const REPEAT_THRESHOLD: usize = 11;
const REPEAT_KEEP: usize = 3;

// Applied in this order, each as a plain substring replace. A replacement
// can produce text a later entry matches; that output shape is kept.
const KEYWORD_SHORTENINGS: &[(&str, &str)] = &[
    ("with", "w/"),
    ("about", "abt"),
    ("select", "sel"),
    ("insert", "ins"),
    ("update", "upd"),
    ("delete", "del"),
    ("create", "cr"),
    ("drop", "dr"),
    ("alter", "alt"),
];

const STRUCTURAL: &[(char, char)] = &[('[', '('), (']', ')'), (';', ','), ('\\', '/')];

/// Sanitizer steps in application order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SanitizeStep {
    Reescape,
    PatternSubstitution,
    LengthCap,
    RunCollapse,
    StructuralSwap,
}

impl SanitizeStep {
    pub const ORDER: [SanitizeStep; 5] = [
        SanitizeStep::Reescape,
        SanitizeStep::PatternSubstitution,
        SanitizeStep::LengthCap,
        SanitizeStep::RunCollapse,
        SanitizeStep::StructuralSwap,
    ];
}

pub struct StringSanitizer {
    version_res: [Regex; 2],
}

impl StringSanitizer {
    pub fn new() -> Self {
        // Browser user agents: "rv:115.0" -> "version115.0".
        let rv = Regex::new(r"\brv:(\d+\.\d+)").expect("valid rv regex");
        let version = Regex::new(r"\bversion:(\d+\.\d+)").expect("valid version regex");
        Self {
            version_res: [rv, version],
        }
    }

    // Rewrite one single-quoted literal token. Anything that is not a
    // single-quoted literal comes back untouched.
    pub fn sanitize(&self, token: &str) -> String {
        let Some(inner) = token
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
        else {
            return token.to_string();
        };

        let mut content = inner.to_string();
        let mut before_swap = String::new();
        for step in SanitizeStep::ORDER {
            if step == SanitizeStep::StructuralSwap {
                before_swap = content.clone();
            }
            content = self.apply(step, &content);
        }

        if before_swap.starts_with('[') && before_swap.ends_with(';') {
            content = MALFORMED_SENTINEL.to_string();
        }
        format!("'{}'", content)
    }

    pub fn apply(&self, step: SanitizeStep, content: &str) -> String {
        match step {
            SanitizeStep::Reescape => reescape(content),
            SanitizeStep::PatternSubstitution => self.substitute_patterns(content),
            SanitizeStep::LengthCap => cap_length(content),
            SanitizeStep::RunCollapse => collapse_within_cap(content),
            SanitizeStep::StructuralSwap => swap_structural(content),
        }
    }

    fn substitute_patterns(&self, content: &str) -> String {
        let mut out = content.to_string();
        for re in &self.version_res {
            out = re.replace_all(&out, "version${1}").into_owned();
        }
        for (from, to) in KEYWORD_SHORTENINGS {
            out = out.replace(from, to);
        }
        out
    }
}

impl Default for StringSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

// Normalize to single quotes first so already-escaped input is not escaped twice.
pub fn reescape(content: &str) -> String {
    content.replace("''", "'").replace('\'', "''")
}

// A literal like '12E400' is out of range for SQL Server numerics.
pub fn is_scientific_overflow(literal: &str) -> bool {
    let Some(inner) = literal
        .strip_prefix('\'')
        .and_then(|rest| rest.strip_suffix('\''))
    else {
        return false;
    };
    match inner.split_once('E') {
        Some((mantissa, exponent)) => {
            !mantissa.is_empty()
                && !exponent.is_empty()
                && mantissa.chars().all(|c| c.is_ascii_digit())
                && exponent.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

fn cap_length(content: &str) -> String {
    if ends_with_truncation(content) || effective_len(content) <= MAX_LITERAL_CHARS {
        return content.to_string();
    }
    truncate(content)
}

fn ends_with_truncation(content: &str) -> bool {
    content.ends_with(TRUNCATION_MARKER) || content.ends_with(SWAPPED_TRUNCATION_MARKER)
}

// Repeat markers left by an earlier pass do not count toward the cap.
fn effective_len(content: &str) -> usize {
    let markers =
        content.matches(REPEAT_MARKER).count() + content.matches(SWAPPED_REPEAT_MARKER).count();
    content
        .chars()
        .count()
        .saturating_sub(markers * REPEAT_MARKER.len())
}

fn truncate(content: &str) -> String {
    let chars: Vec<char> = content.chars().collect();
    if chars.len() <= MAX_LITERAL_CHARS {
        return content.to_string();
    }
    let mut cut = MAX_LITERAL_CHARS;
    if splits_escape_pair(&chars, cut) {
        cut -= 1;
    }
    let mut out: String = chars[..cut].iter().collect();
    out.push_str(TRUNCATION_MARKER);
    out
}

// True when `cut` falls between the two quotes of an escaped pair.
fn splits_escape_pair(chars: &[char], cut: usize) -> bool {
    let mut i = 0;
    while i < cut {
        if chars[i] == '\'' && chars.get(i + 1) == Some(&'\'') {
            if i + 1 == cut {
                return true;
            }
            i += 2;
        } else {
            i += 1;
        }
    }
    false
}

// Collapse runs ahead of any truncation marker, then re-cap: a collapsed
// run of 11..=16 chars is longer than the run it replaces.
fn collapse_within_cap(content: &str) -> String {
    let body_len = [TRUNCATION_MARKER, SWAPPED_TRUNCATION_MARKER]
        .iter()
        .find_map(|m| content.strip_suffix(m))
        .map_or(content.len(), str::len);
    let mut out = collapse_runs(&content[..body_len]);
    out.push_str(&content[body_len..]);
    if out.chars().count() > MAX_SANITIZED_CHARS {
        out = truncate(&out);
    }
    out
}

fn collapse_runs(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();
    while let Some(c) = chars.next() {
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        if run >= REPEAT_THRESHOLD {
            // Quotes travel in escaped pairs; keep an even count.
            let keep = if c == '\'' { REPEAT_KEEP + 1 } else { REPEAT_KEEP };
            out.extend(std::iter::repeat(c).take(keep));
            out.push_str(REPEAT_MARKER);
        } else {
            out.extend(std::iter::repeat(c).take(run));
        }
    }
    out
}

fn swap_structural(content: &str) -> String {
    content
        .chars()
        .map(|c| {
            STRUCTURAL
                .iter()
                .find(|(from, _)| *from == c)
                .map_or(c, |(_, to)| *to)
        })
        .collect()
}
