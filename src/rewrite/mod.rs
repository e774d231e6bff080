// Rewrite rules: everything that turns parsed Oracle units into T-SQL text.

pub mod ddl;
pub mod dml;
pub mod functions;
pub mod sanitize;
pub mod types;

/// The T-SQL batch separator.
pub const BATCH_SEPARATOR: &str = "GO";

// [name] with any closing bracket doubled.
pub fn bracket(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

pub fn qualified_name(schema: &str, table: &str) -> String {
    format!("{}.{}", bracket(schema), bracket(table))
}

// Session-control lines have no T-SQL equivalent; keep them as comments.
pub fn comment_out_directive(line: &str) -> String {
    format!("-- {} (Oracle specific, commented out)", line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_escape_closing_bracket() {
        assert_eq!(bracket("A]B"), "[A]]B]");
        assert_eq!(qualified_name("ADMIN", "T1"), "[ADMIN].[T1]");
    }

    #[test]
    fn directive_comment() {
        assert_eq!(
            comment_out_directive("SET DEFINE OFF; "),
            "-- SET DEFINE OFF; (Oracle specific, commented out)"
        );
    }
}
