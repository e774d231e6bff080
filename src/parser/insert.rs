// INSERT parser: splits one logical INSERT statement into its target
// table, optional column list and the raw text inside VALUES ( ... ).
// No SQL grammar; the value text is handed to the tokenizer untouched.

use super::{matching_close, split_top_level, unquote_identifier};
use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertUnit {
    pub schema: Option<String>,
    pub table: String,
    pub columns: Vec<String>,
    pub values: String,
}

pub struct InsertParser {
    head_re: Regex,
    values_re: Regex,
}

impl InsertParser {
    pub fn new() -> Self {
        let head_re = Regex::new(
            r#"(?i)^\s*INSERT\s+INTO\s+(?:("[^"]+"|[\w$#]+)\s*\.\s*)?("[^"]+"|[\w$#]+)\s*"#,
        )
        .expect("valid insert head regex");
        // SQL Developer sometimes drops the VALUES keyword on wrapped lines.
        let values_re = Regex::new(r"(?i)^\s*(?:VALUES)?\s*\(").expect("valid values regex");
        Self { head_re, values_re }
    }

    pub fn parse(&self, statement: &str) -> Option<InsertUnit> {
        let head = self.head_re.captures(statement)?;
        let schema = head.get(1).map(|m| unquote_identifier(m.as_str()));
        let table = unquote_identifier(head.get(2)?.as_str());

        let mut rest = &statement[head.get(0)?.end()..];

        // A column list is a '(' not preceded by VALUES.
        let mut columns = Vec::new();
        if rest.starts_with('(') {
            let close = matching_close(rest, 0)?;
            columns = split_top_level(&rest[1..close])
                .iter()
                .map(|c| unquote_identifier(c))
                .filter(|c| !c.is_empty())
                .collect();
            rest = &rest[close + 1..];
        }

        let open = self.values_re.find(rest)?;
        let mut values = rest[open.end()..].trim_end();
        values = values.strip_suffix(';').unwrap_or(values).trim_end();
        values = values.strip_suffix(')').unwrap_or(values);

        Some(InsertUnit {
            schema,
            table,
            columns,
            values: values.to_string(),
        })
    }
}

impl Default for InsertParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_sql_developer_insert() {
        let unit = InsertParser::new()
            .parse("Insert into ADMIN.PEOPLE (ID,NAME,BORN) values ('1','O''Brien',to_date('01-JAN-80','DD-MON-RR'));")
            .unwrap();
        assert_eq!(unit.schema.as_deref(), Some("ADMIN"));
        assert_eq!(unit.table, "PEOPLE");
        assert_eq!(unit.columns, vec!["ID", "NAME", "BORN"]);
        assert_eq!(
            unit.values,
            "'1','O''Brien',to_date('01-JAN-80','DD-MON-RR')"
        );
    }

    #[test]
    fn quoted_names_and_no_column_list() {
        let unit = InsertParser::new()
            .parse(r#"INSERT INTO "T2" VALUES (1, NULL)"#)
            .unwrap();
        assert_eq!(unit.schema, None);
        assert_eq!(unit.table, "T2");
        assert!(unit.columns.is_empty());
        assert_eq!(unit.values, "1, NULL");
    }

    #[test]
    fn dot_inside_quoted_table_name() {
        let unit = InsertParser::new()
            .parse(r#"INSERT INTO "ADMIN"."A.B" ("X") VALUES (1);"#)
            .unwrap();
        assert_eq!(unit.schema.as_deref(), Some("ADMIN"));
        assert_eq!(unit.table, "A.B");
        assert_eq!(unit.columns, vec!["X"]);
        assert_eq!(unit.values, "1");
    }

    #[test]
    fn missing_values_keyword_is_tolerated() {
        let unit = InsertParser::new()
            .parse("Insert into ADMIN.T (A) (42);")
            .unwrap();
        assert_eq!(unit.values, "42");
    }

    #[test]
    fn garbage_is_rejected() {
        let parser = InsertParser::new();
        assert!(parser.parse("UPDATE T SET A = 1;").is_none());
        assert!(parser.parse("Insert into ADMIN.T (A, B").is_none());
        assert!(parser.parse("Insert into ADMIN.T (A) SELECT 1").is_none());
    }
}
