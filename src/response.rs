//! Answer Response - the four-field shape every query returns
//!
//! `summary`, `chartType`, `chartData`, `tableData`. Consumers depend on these
//! exact keys, so null fields are serialized rather than skipped.

use crate::chart::validate_chart_data;
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Chart kinds the client knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChartType {
    Bar,
    Line,
    Pie,
    Scatter,
    #[default]
    None,
}

impl ChartType {
    /// Lenient parse of a model-provided chart type; unknown values mean no chart.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "BAR" => ChartType::Bar,
            "LINE" => ChartType::Line,
            "PIE" => ChartType::Pie,
            "SCATTER" => ChartType::Scatter,
            _ => ChartType::None,
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartType::Bar => write!(f, "BAR"),
            ChartType::Line => write!(f, "LINE"),
            ChartType::Pie => write!(f, "PIE"),
            ChartType::Scatter => write!(f, "SCATTER"),
            ChartType::None => write!(f, "NONE"),
        }
    }
}

/// Table-shaped result: column headers plus row-major cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl TableData {
    /// Read a model-provided table. Headers that are not strings are rendered
    /// as text; rows must be arrays.
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let headers = object
            .get("headers")?
            .as_array()?
            .iter()
            .map(|h| match h {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        let rows = object
            .get("rows")?
            .as_array()?
            .iter()
            .map(|row| row.as_array().cloned())
            .collect::<Option<Vec<_>>>()?;

        Some(Self { headers, rows })
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The structured answer returned for every query, success or failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub summary: String,
    pub chart_type: ChartType,
    pub chart_data: Option<Value>,
    pub table_data: Option<TableData>,
}

impl AnswerResponse {
    /// Plain-text answer with no chart and no table. Also used for every
    /// fallback answer.
    pub fn text(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            chart_type: ChartType::None,
            chart_data: None,
            table_data: None,
        }
    }

    /// Build an answer from a model's JSON output.
    ///
    /// Missing or mistyped fields degrade to their empty form instead of
    /// failing. The chart is validated and, when rejected, both the chart
    /// data and the chart type are cleared. Output that is not a JSON object
    /// at all is an error.
    pub fn from_model_json(raw: &str) -> Result<Self> {
        Self::from_model_value(&parse_model_json(raw)?)
    }

    /// Same as [`AnswerResponse::from_model_json`] for an already parsed value.
    pub fn from_model_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AgentError::Llm("Model response is not a JSON object".to_string()))?;

        let summary = match object.get("summary") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };

        let chart_type = object
            .get("chartType")
            .and_then(Value::as_str)
            .map(ChartType::parse)
            .unwrap_or_default();

        let table_data = object.get("tableData").and_then(TableData::from_value);

        let mut answer = Self {
            summary,
            chart_type,
            chart_data: object.get("chartData").cloned(),
            table_data,
        };
        answer.enforce_chart_contract();
        Ok(answer)
    }

    /// Drop a malformed chart and downgrade the chart type to match.
    pub fn enforce_chart_contract(&mut self) {
        self.chart_data = validate_chart_data(self.chart_data.take());
        if self.chart_data.is_none() {
            self.chart_type = ChartType::None;
        }
    }
}

/// Parse raw model output as JSON, tolerating a markdown code fence.
pub fn parse_model_json(raw: &str) -> Result<Value> {
    serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| AgentError::Llm(format!("Model returned invalid JSON: {}", e)))
}

/// Models sometimes wrap JSON in a markdown fence even in JSON mode.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
