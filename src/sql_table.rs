//! Ephemeral SQL Table
//!
//! Loads a normalized [`Dataset`] into an in-memory SQLite table named `data`
//! so the model can be shown a schema and sample rows, and so a model-written
//! `SELECT` can be executed. The connection lives only for one request.

use crate::error::{AgentError, Result};
use crate::response::TableData;
use crate::tabular::{format_number, Cell, Column, ColumnKind, Dataset};
use itertools::Itertools;
use rusqlite::types::{Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection};
use serde_json::Value;
use sqlparser::ast::Statement;
use sqlparser::dialect::SQLiteDialect;
use sqlparser::parser::Parser;
use tracing::{debug, info};

pub const TABLE_NAME: &str = "data";

/// Upper bound on rows returned from a model-written query
pub const MAX_RESULT_ROWS: usize = 500;

/// In-memory SQLite copy of a dataset
pub struct SqlTable {
    conn: Connection,
    create_statement: String,
}

impl SqlTable {
    /// Create the `data` table and insert every row of the dataset.
    pub fn load(dataset: &Dataset) -> Result<Self> {
        if dataset.columns().is_empty() {
            return Err(AgentError::Sql("Dataset has no columns".to_string()));
        }

        let mut conn = Connection::open_in_memory()?;
        let create_statement = create_table_sql(dataset.columns());
        conn.execute(&create_statement, [])?;

        let insert = format!(
            "INSERT INTO {} VALUES ({})",
            TABLE_NAME,
            std::iter::repeat("?").take(dataset.columns().len()).join(", ")
        );

        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(&insert)?;
            for row in 0..dataset.row_count() {
                let params = dataset.row(row).into_iter().map(cell_to_sql);
                stmt.execute(params_from_iter(params))?;
            }
        }
        tx.commit()?;

        info!("Loaded {} rows into ephemeral table '{}'", dataset.row_count(), TABLE_NAME);
        Ok(Self { conn, create_statement })
    }

    /// `CREATE TABLE` statement followed by a comment block with the first
    /// rows, the way SQL toolkits usually describe a table to a model.
    pub fn schema_description(&self, sample_rows: usize) -> Result<String> {
        let sample = self.query_rows(&format!("SELECT * FROM {} LIMIT {}", TABLE_NAME, sample_rows))?;
        let mut out = format!("\n{}\n\n/*\n{} rows from {} table:\n", self.create_statement, sample_rows, TABLE_NAME);
        out.push_str(&sample.headers.join("\t"));
        out.push('\n');
        for row in &sample.rows {
            out.push_str(&row.iter().map(render_json_cell).join("\t"));
            out.push('\n');
        }
        out.push_str("*/");
        Ok(out)
    }

    /// First `limit` rows as a markdown table with a leading index column.
    pub fn sample_rows_markdown(&self, limit: usize) -> Result<String> {
        let sample = self.query_rows(&format!("SELECT * FROM {} LIMIT {}", TABLE_NAME, limit))?;
        Ok(to_markdown(&sample))
    }

    /// Execute a model-written query. Only a single read-only query statement
    /// is accepted.
    pub fn run_select(&self, sql: &str) -> Result<TableData> {
        ensure_single_select(sql)?;
        debug!("Running model SQL: {}", sql);
        self.query_rows(sql)
    }

    fn query_rows(&self, sql: &str) -> Result<TableData> {
        let mut stmt = self.conn.prepare(sql)?;
        let headers: Vec<String> = stmt.column_names().into_iter().map(str::to_string).collect();
        let width = headers.len();

        let mut rows = Vec::new();
        let mut result = stmt.query([])?;
        while let Some(row) = result.next()? {
            if rows.len() >= MAX_RESULT_ROWS {
                break;
            }
            let mut cells = Vec::with_capacity(width);
            for index in 0..width {
                cells.push(sql_to_json(row.get_ref(index)?));
            }
            rows.push(cells);
        }

        Ok(TableData { headers, rows })
    }
}

/// Reject anything but exactly one query statement.
pub fn ensure_single_select(sql: &str) -> Result<()> {
    let statements = Parser::parse_sql(&SQLiteDialect {}, sql)
        .map_err(|e| AgentError::Sql(format!("Failed to parse SQL: {}", e)))?;

    match statements.as_slice() {
        [Statement::Query(_)] => Ok(()),
        [] => Err(AgentError::Sql("Empty SQL".to_string())),
        [_] => Err(AgentError::Sql("Only SELECT queries are allowed".to_string())),
        _ => Err(AgentError::Sql("Only a single statement is allowed".to_string())),
    }
}

fn create_table_sql(columns: &[Column]) -> String {
    let defs = columns
        .iter()
        .map(|c| format!("\t\"{}\" {}", c.name, sql_type(c)))
        .join(", \n");
    format!("CREATE TABLE {} (\n{}\n)", TABLE_NAME, defs)
}

fn sql_type(column: &Column) -> &'static str {
    match column.kind {
        ColumnKind::Numeric => {
            let whole = column.values.iter().all(|v| match v {
                Cell::Number(n) => n.fract() == 0.0 && n.abs() < i64::MAX as f64,
                _ => true,
            });
            if whole {
                "INTEGER"
            } else {
                "REAL"
            }
        }
        ColumnKind::Text | ColumnKind::Date => "TEXT",
    }
}

fn cell_to_sql(cell: &Cell) -> SqlValue {
    match cell {
        Cell::Missing => SqlValue::Null,
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => SqlValue::Integer(*n as i64),
        Cell::Number(n) => SqlValue::Real(*n),
        Cell::Text(s) => SqlValue::Text(s.clone()),
    }
}

fn sql_to_json(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(format!("<blob {} bytes>", bytes.len())),
    }
}

fn render_json_cell(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

fn to_markdown(table: &TableData) -> String {
    let mut out = String::new();
    out.push_str(&format!("|    | {} |\n", table.headers.join(" | ")));
    out.push_str(&format!("|---:|{}|\n", table.headers.iter().map(|_| ":---").join("|")));
    for (index, row) in table.rows.iter().enumerate() {
        out.push_str(&format!("| {} | {} |\n", index, row.iter().map(render_json_cell).join(" | ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sales() -> Dataset {
        Dataset::new(vec![
            Column {
                name: "region".to_string(),
                kind: ColumnKind::Text,
                values: vec![
                    Cell::Text("North".to_string()),
                    Cell::Text("South".to_string()),
                    Cell::Text("North".to_string()),
                    Cell::Missing,
                ],
            },
            Column {
                name: "sales".to_string(),
                kind: ColumnKind::Numeric,
                values: vec![Cell::Number(10.0), Cell::Number(5.5), Cell::Number(20.0), Cell::Number(1.0)],
            },
        ])
    }

    #[test]
    fn test_load_and_aggregate() {
        let table = SqlTable::load(&sales()).unwrap();
        let result = table
            .run_select("SELECT region, SUM(sales) AS total FROM data WHERE region IS NOT NULL GROUP BY region ORDER BY region")
            .unwrap();
        assert_eq!(result.headers, vec!["region", "total"]);
        assert_eq!(result.rows, vec![vec![json!("North"), json!(30.0)], vec![json!("South"), json!(5.5)]]);
    }

    #[test]
    fn test_rejects_writes_and_multiple_statements() {
        let table = SqlTable::load(&sales()).unwrap();
        assert!(table.run_select("DELETE FROM data").is_err());
        assert!(table.run_select("SELECT 1; SELECT 2").is_err());
        assert!(table.run_select("DROP TABLE data").is_err());
    }

    #[test]
    fn test_schema_description_lists_columns_and_rows() {
        let table = SqlTable::load(&sales()).unwrap();
        let schema = table.schema_description(3).unwrap();
        assert!(schema.contains("CREATE TABLE data"));
        assert!(schema.contains("\"region\" TEXT"));
        assert!(schema.contains("\"sales\" REAL"));
        assert!(schema.contains("3 rows from data table"));
        assert!(schema.contains("North\t10"));
    }

    #[test]
    fn test_sample_rows_markdown() {
        let table = SqlTable::load(&sales()).unwrap();
        let markdown = table.sample_rows_markdown(2).unwrap();
        let lines: Vec<&str> = markdown.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "|    | region | sales |");
        assert_eq!(lines[2], "| 0 | North | 10 |");
    }

    #[test]
    fn test_empty_dataset_is_rejected() {
        assert!(SqlTable::load(&Dataset::empty()).is_err());
    }
}
