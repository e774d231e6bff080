// CREATE TABLE output: a drop guard, the bracketed column list and batch
// separators, in the layout SQL Server Management Studio scripts use.

use super::functions::FunctionTranslator;
use super::types::translate;
use super::{bracket, qualified_name, BATCH_SEPARATOR};
use crate::parser::schema::{ColumnDefinition, TableDefinition};

pub fn render_table(
    def: &TableDefinition,
    schema: &str,
    functions: &FunctionTranslator,
) -> Vec<String> {
    let target = qualified_name(schema, &def.name);
    let mut out = vec![
        format!("-- Table: {}", def.name),
        format!(
            "IF EXISTS(SELECT name FROM sys.sysobjects WHERE Name = N'{}' AND xtype = N'U')",
            def.name.replace('\'', "''")
        ),
        "BEGIN".to_string(),
        format!("    DROP TABLE {}", target),
        "END".to_string(),
        BATCH_SEPARATOR.to_string(),
        String::new(),
        format!("CREATE TABLE {} (", target),
    ];

    let last = def.columns.len().saturating_sub(1);
    for (i, column) in def.columns.iter().enumerate() {
        let mut line = format!("    {}", render_column(column, functions));
        if i < last {
            line.push(',');
        }
        out.push(line);
    }

    out.push(");".to_string());
    out.push(BATCH_SEPARATOR.to_string());
    out.push(String::new());
    out
}

pub fn render_column(column: &ColumnDefinition, functions: &FunctionTranslator) -> String {
    let mut line = format!("{} {}", bracket(&column.name), translate(&column.data_type));
    if column.not_null {
        line.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default {
        line.push_str(" DEFAULT ");
        line.push_str(&translate_default(default, functions));
    }
    line
}

// GUID generators collapse to NEWID(); the rest goes through the
// function translator (sysdate -> GETDATE()).
pub fn translate_default(expr: &str, functions: &FunctionTranslator) -> String {
    if expr.to_lowercase().contains("sys_guid()") {
        return "NEWID()".to_string();
    }
    functions.translate(expr.trim())
}

pub fn skipped_table(name: &str) -> String {
    format!("-- SKIPPED TABLE {}: no column definitions recognised", name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::schema::SchemaParser;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_guard_and_columns() {
        let def = SchemaParser::new()
            .parse_definition(&[
                r#"CREATE TABLE "ADMIN"."T1" ( "ID" NUMBER(10), "NAME" VARCHAR2(50) DEFAULT 'x' )"#
                    .to_string(),
            ])
            .unwrap();
        let out = render_table(&def, "ADMIN", &FunctionTranslator::new());
        assert_eq!(
            out,
            vec![
                "-- Table: T1",
                "IF EXISTS(SELECT name FROM sys.sysobjects WHERE Name = N'T1' AND xtype = N'U')",
                "BEGIN",
                "    DROP TABLE [ADMIN].[T1]",
                "END",
                "GO",
                "",
                "CREATE TABLE [ADMIN].[T1] (",
                "    [ID] INT,",
                "    [NAME] NVARCHAR(50) DEFAULT 'x'",
                ");",
                "GO",
                "",
            ]
        );
    }

    #[test]
    fn defaults_are_translated() {
        let functions = FunctionTranslator::new();
        assert_eq!(translate_default("sysdate", &functions), "GETDATE()");
        assert_eq!(
            translate_default("hextoraw(substr(sys_guid(),1,16))", &functions),
            "NEWID()"
        );
        assert_eq!(translate_default("SYS_GUID()", &functions), "NEWID()");
        assert_eq!(translate_default("0", &functions), "0");
    }

    #[test]
    fn not_null_precedes_default() {
        let parser = SchemaParser::new();
        let col = parser
            .parse_column(r#""CREATED" DATE DEFAULT sysdate NOT NULL ENABLE"#)
            .unwrap();
        assert_eq!(
            render_column(&col, &FunctionTranslator::new()),
            "[CREATED] DATETIME2 NOT NULL DEFAULT GETDATE()"
        );
    }
}
