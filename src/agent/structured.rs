//! Spreadsheet questions: normalize, load into the ephemeral `data` table,
//! ask the model for a JSON analysis and run the query it wrote.

use super::Agent;
use crate::error::Result;
use crate::llm::{CompletionOptions, LanguageModel};
use crate::prompts::structured_prompt;
use crate::response::{parse_model_json, AnswerResponse};
use crate::sql_table::SqlTable;
use crate::tabular::{normalize_file, TabularFormat};
use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

const TEMPERATURE: f32 = 0.1;
const SAMPLE_ROWS: usize = 3;

pub const UNREADABLE_SPREADSHEET: &str = "Could not read or process the provided spreadsheet.";

impl Agent {
    pub(crate) async fn answer_structured(
        &self,
        question: &str,
        path: &Path,
        format: TabularFormat,
    ) -> Result<AnswerResponse> {
        info!("--- Handling Structured Data Question ({:?}) ---", format);

        let path = path.to_path_buf();
        let prepared = tokio::task::spawn_blocking(move || prepare_table(&path)).await??;
        let Some(PreparedTable { table, schema, sample }) = prepared else {
            return Ok(AnswerResponse::text(UNREADABLE_SPREADSHEET));
        };

        let prompt = structured_prompt(&schema, &sample, question);
        let raw = self
            .llm
            .complete(&prompt, CompletionOptions::json(TEMPERATURE))
            .await?;

        let value = parse_model_json(&raw)?;
        let mut answer = AnswerResponse::from_model_value(&value)?;

        if let Some(sql) = value.get("sql").and_then(Value::as_str) {
            let sql = sql.trim();
            if !sql.is_empty() {
                match table.run_select(sql) {
                    Ok(rows) => {
                        info!("Model query returned {} rows", rows.rows.len());
                        answer.table_data = Some(rows);
                    }
                    Err(e) => warn!("Ignoring model SQL, keeping model table: {}", e),
                }
            }
        }

        Ok(answer)
    }
}

/// Ephemeral table plus the schema and sample text shown to the model
struct PreparedTable {
    table: SqlTable,
    schema: String,
    sample: String,
}

/// Normalize the file and load it into SQLite. `None` when the spreadsheet
/// could not be read or has no rows. Runs on the blocking pool.
fn prepare_table(path: &Path) -> Result<Option<PreparedTable>> {
    let dataset = normalize_file(path);
    if dataset.is_empty() {
        return Ok(None);
    }
    info!(
        "Normalized {} rows x {} columns",
        dataset.row_count(),
        dataset.columns().len()
    );

    let table = SqlTable::load(&dataset)?;
    let schema = table.schema_description(SAMPLE_ROWS)?;
    let sample = table.sample_rows_markdown(SAMPLE_ROWS)?;
    Ok(Some(PreparedTable { table, schema, sample }))
}
