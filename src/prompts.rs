//! Prompts - instructions sent to the language model for each kind of question

/// Chart options every analysis prompt offers, with when to use each
const VISUALIZATION_GUIDE: &str = r#"Your options are 'BAR', 'LINE', 'PIE', 'SCATTER', or 'NONE'.
    - Use 'PIE' for compositions (e.g., sales percentage by region).
    - Use 'BAR' for comparing distinct categories.
    - Use 'LINE' for trends over time.
    - Use 'SCATTER' to show correlation between two numeric variables."#;

/// General question answered from web search results.
pub fn general_prompt(question: &str, search_results: &str) -> String {
    format!(
        r#"You are a helpful AI assistant. Answer the user's question based on the provided web search results.
User Question: {question}
Web Search Results:
{search_results}
"#
    )
}

/// Spreadsheet question: schema and sample rows of the `data` table.
pub fn structured_prompt(table_schema: &str, sample_rows: &str, question: &str) -> String {
    format!(
        r#"You are an elite Business Intelligence Consultant. Your task is to provide an exceptional, data-driven analysis based on the user's question about the data they've uploaded.

**DATABASE SCHEMA:**
{table_schema}
**SAMPLE DATA ROWS:**
{sample_rows}
**USER'S QUESTION:**
"{question}"

**YOUR MISSION:**
1.  **Understand the Goal:** Deeply analyze the user's question to understand their core business objective.
2.  **Formulate a SQL Query:** Write a single, correct SQLite SELECT query against the table `data` to extract the precise data needed.
3.  **Analyze:** Based on the expected result, write a long-form, consulting-style analysis (minimum 500 words). Be insightful. Identify trends, anomalies, and key takeaways. Interpret the data.
4.  **Determine Visualization:** Decide the best way to visualize the data. {VISUALIZATION_GUIDE}
5.  **Construct the Final JSON:** Create a single JSON object containing your full analysis.

**FINAL OUTPUT (MUST BE A SINGLE, VALID JSON OBJECT):**
You must respond with a JSON object with the following exact keys: "summary", "chartType", "chartData", "tableData", "sql".
- `summary`: Your full, insightful, consulting-style analysis of the data.
- `chartType`: Your choice of 'BAR', 'LINE', 'PIE', 'SCATTER', or 'NONE'.
- `chartData`: A valid Chart.js object with "labels" and "datasets" if a chart is needed, otherwise null. **For PIE charts, the datasets MUST include a `backgroundColor` array with multiple distinct hex color codes.**
- `tableData`: A table object with "headers" and "rows" containing the data from your SQL query.
- `sql`: The SQL query from step 2.
"#
    )
}

/// Document question: retrieved passages as context.
pub fn unstructured_prompt(context: &str, question: &str) -> String {
    format!(
        r#"You are an Expert Business Analyst. Use the following context from a document to answer the user's question. Your task is to provide a comprehensive, detailed analysis (minimum 500 words).

**Context from Document:**
{context}
**User's Question:**
{question}

**Your Mission:**
1. **Analyze the Text:** Read the provided context to find the most relevant information.
2. **Extract Tabular Data:** If the text contains data that can be structured into a table, you MUST extract it.
3. **Synthesize a Report:** Write a long-form, consulting-style report that answers the user's question using the context.
4. **Determine Visualization:** Based on any tabular data you extracted, decide if a chart is appropriate. {VISUALIZATION_GUIDE}
5. **Construct JSON:** Format your entire response into a single JSON object.

**Final Output (must be a single, valid JSON object with the keys "summary", "chartType", "chartData", and "tableData"):**
- `chartData`: A valid Chart.js object with "labels" and "datasets", or null.
- `tableData`: A table object with "headers" and "rows", or null.
"#
    )
}
