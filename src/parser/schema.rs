// Schema parser: turns one assembled CREATE TABLE block into a table
// definition (name + ordered columns). Favors tolerance over full SQL
// parsing; constraint entries are skipped rather than translated.

use super::{matching_close, split_top_level, strip_line_comment, unquote_identifier};
use crate::logger;
use crate::rewrite::types::TypeSignature;
use regex::Regex;

const CONSTRAINT_PREFIXES: &[&str] = &[
    "CONSTRAINT",
    "PRIMARY KEY",
    "UNIQUE",
    "FOREIGN KEY",
    "CHECK",
    "SUPPLEMENTAL LOG",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: TypeSignature,
    /// Raw DEFAULT expression, untranslated.
    pub default: Option<String>,
    pub not_null: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
}

pub struct SchemaParser {
    create_table_re: Regex,
    column_name_re: Regex,
    column_type_re: Regex,
    default_re: Regex,
    not_null_re: Regex,
    state_re: Regex,
}

impl SchemaParser {
    // Build regexes once for reuse.
    pub fn new() -> Self {
        let create_table_re = Regex::new(
            r#"(?i)CREATE\s+(?:GLOBAL\s+TEMPORARY\s+)?TABLE\s+(?:("[^"]+"|[\w$#]+)\s*\.\s*)?("[^"]+"|[\w$#]+)"#,
        )
        .expect("valid create table regex");
        let column_name_re =
            Regex::new(r#"^(?:"([^"]+)"|([A-Za-z_][\w$#]*))\s*"#).expect("valid column name regex");
        let column_type_re = Regex::new(
            r"(?i)^[A-Z_][A-Z0-9_]*(?:\s+RAW|\s+PRECISION)?\s*(?:\([^)]*\))?(?:\s+WITH\s+(?:LOCAL\s+)?TIME\s+ZONE)?",
        )
        .expect("valid column type regex");
        let default_re = Regex::new(r"(?i)\bDEFAULT\b").expect("valid default regex");
        let not_null_re = Regex::new(r"(?i)\bNOT\s+NULL\b").expect("valid not null regex");
        let state_re = Regex::new(r"(?i)\s*\b(?:NOT\s+NULL|ENABLE|DISABLE|NOVALIDATE|VALIDATE)\b")
            .expect("valid constraint state regex");
        Self {
            create_table_re,
            column_name_re,
            column_type_re,
            default_re,
            not_null_re,
            state_re,
        }
    }

    // Parse the lines of one definition block. Returns None when the block
    // has no CREATE TABLE header at all.
    pub fn parse_definition(&self, lines: &[String]) -> Option<TableDefinition> {
        let block = lines
            .iter()
            .map(|l| strip_line_comment(l).trim())
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        let cap = self.create_table_re.captures(&block)?;
        let table = cap.get(2)?;
        let name = unquote_identifier(table.as_str());

        let rest_start = table.end();
        let columns = match block[rest_start..].find('(') {
            Some(rel) => {
                let open = rest_start + rel;
                let body = match matching_close(&block, open) {
                    Some(close) => &block[open + 1..close],
                    // Closing paren was on a dropped storage line.
                    None => block[open + 1..].trim_end().trim_end_matches([';', ')']),
                };
                self.parse_columns(body)
            }
            None => Vec::new(),
        };

        logger::debug(&format!(
            "SchemaParser: table {} has {} columns",
            name,
            columns.len()
        ));
        Some(TableDefinition { name, columns })
    }

    fn parse_columns(&self, body: &str) -> Vec<ColumnDefinition> {
        split_top_level(body)
            .iter()
            .filter(|entry| !entry.is_empty() && !is_constraint(entry))
            .filter_map(|entry| self.parse_column(entry))
            .collect()
    }

    pub fn parse_column(&self, entry: &str) -> Option<ColumnDefinition> {
        let entry = entry.trim();
        let name_cap = self.column_name_re.captures(entry)?;
        let name = name_cap.get(1).or_else(|| name_cap.get(2))?.as_str().to_string();
        let rest = &entry[name_cap.get(0)?.end()..];

        let type_match = self.column_type_re.find(rest)?;
        let data_type = TypeSignature::parse(type_match.as_str());
        let tail = &rest[type_match.end()..];

        let (attributes, default) = match self.default_re.find(tail) {
            Some(m) => {
                let expr = self.state_re.replace_all(&tail[m.end()..], "");
                let expr = expr.trim().trim_end_matches(',').trim();
                let default = (!expr.is_empty()).then(|| expr.to_string());
                (format!("{} {}", &tail[..m.start()], &tail[m.end()..]), default)
            }
            None => (tail.to_string(), None),
        };
        let not_null = self.not_null_re.is_match(&attributes);

        Some(ColumnDefinition {
            name,
            data_type,
            default,
            not_null,
        })
    }
}

impl Default for SchemaParser {
    fn default() -> Self {
        Self::new()
    }
}

fn is_constraint(entry: &str) -> bool {
    let upper = entry.trim_start().to_uppercase();
    CONSTRAINT_PREFIXES.iter().any(|p| upper.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rewrite::types::Modifiers;
    use pretty_assertions::assert_eq;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn single_line_definition() {
        let def = SchemaParser::new()
            .parse_definition(&lines(
                r#"CREATE TABLE "ADMIN"."T1" ( "ID" NUMBER(10), "NAME" VARCHAR2(50) DEFAULT 'x' )"#,
            ))
            .unwrap();
        assert_eq!(def.name, "T1");
        assert_eq!(def.columns.len(), 2);
        assert_eq!(def.columns[0].name, "ID");
        assert_eq!(
            def.columns[0].data_type,
            TypeSignature::new(
                "NUMBER",
                Modifiers::Precision {
                    precision: 10,
                    scale: 0
                }
            )
        );
        assert_eq!(def.columns[1].default.as_deref(), Some("'x'"));
        assert!(!def.columns[1].not_null);
    }

    #[test]
    fn multi_line_export_with_constraints() {
        let def = SchemaParser::new()
            .parse_definition(&lines(
                r#"  CREATE TABLE "ADMIN"."ORDERS"
   (	"ORDER_ID" NUMBER(19,0) NOT NULL ENABLE,
	"CREATED" DATE DEFAULT sysdate NOT NULL ENABLE,
	"NOTE" VARCHAR2(4000 BYTE),
	"GUID" RAW(16) DEFAULT hextoraw(substr(sys_guid(),1,16)),
	 CONSTRAINT "ORDERS_PK" PRIMARY KEY ("ORDER_ID")
   )"#,
            ))
            .unwrap();
        assert_eq!(def.name, "ORDERS");
        let names: Vec<&str> = def.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ORDER_ID", "CREATED", "NOTE", "GUID"]);
        assert!(def.columns[0].not_null);
        assert_eq!(def.columns[1].default.as_deref(), Some("sysdate"));
        assert!(def.columns[1].not_null);
        assert_eq!(
            def.columns[3].default.as_deref(),
            Some("hextoraw(substr(sys_guid(),1,16))")
        );
    }

    #[test]
    fn unquoted_names_and_missing_close_paren() {
        let def = SchemaParser::new()
            .parse_definition(&lines("CREATE TABLE ADMIN.PEOPLE (\nAGE NUMBER(3),\nBIO CLOB"))
            .unwrap();
        assert_eq!(def.name, "PEOPLE");
        assert_eq!(def.columns.len(), 2);
        assert_eq!(def.columns[1].data_type.name, "CLOB");
    }

    #[test]
    fn type_with_time_zone_and_long_raw() {
        let parser = SchemaParser::new();
        let col = parser
            .parse_column(r#""TS" TIMESTAMP (6) WITH LOCAL TIME ZONE"#)
            .unwrap();
        assert_eq!(col.data_type.name, "TIMESTAMP");
        let col = parser.parse_column(r#""PAYLOAD" LONG RAW"#).unwrap();
        assert_eq!(col.data_type.name, "LONG RAW");
    }

    #[test]
    fn comment_lines_inside_block_keep_columns() {
        let def = SchemaParser::new()
            .parse_definition(&lines(
                "CREATE TABLE \"ADMIN\".\"T\"\n( \"A\" NUMBER(10,0),\n-- note\n\"B\" VARCHAR2(5 BYTE), -- trailing\n\"C\" CHAR(1) DEFAULT '--'\n) ;",
            ))
            .unwrap();
        let names: Vec<&str> = def.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(def.columns[2].default.as_deref(), Some("'--'"));
    }

    #[test]
    fn dotted_quoted_table_name_is_kept_whole() {
        let def = SchemaParser::new()
            .parse_definition(&lines(r#"CREATE TABLE "ADMIN"."A.B" ("ID" NUMBER(10))"#))
            .unwrap();
        assert_eq!(def.name, "A.B");
        assert_eq!(def.columns.len(), 1);

        let def = SchemaParser::new()
            .parse_definition(&lines("CREATE TABLE T1 (ID NUMBER(10))"))
            .unwrap();
        assert_eq!(def.name, "T1");
    }

    #[test]
    fn header_without_columns() {
        let def = SchemaParser::new()
            .parse_definition(&lines(r#"CREATE TABLE "ADMIN"."EMPTY";"#))
            .unwrap();
        assert!(def.columns.is_empty());
        assert!(SchemaParser::new()
            .parse_definition(&lines("not a table"))
            .is_none());
    }
}
