pub mod agent;
pub mod chart;
pub mod config;
pub mod document;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod response;
pub mod search;
pub mod server;
pub mod sql_table;
pub mod tabular;
pub mod uploads;

pub use agent::Agent;
pub use config::AgentConfig;
pub use error::{AgentError, Result};
pub use response::{AnswerResponse, ChartType, TableData};
