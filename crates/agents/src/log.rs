//! Append-only execution log scoped to one pipeline run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::state_machine::PipelineState;

#[derive(Debug, Clone, Serialize)]
pub struct ExecutionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub stage: PipelineState,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct ExecutionLog {
    entries: Vec<ExecutionLogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        stage: PipelineState,
        message: impl Into<String>,
        data: Option<serde_json::Value>,
    ) {
        let message = message.into();
        info!(stage = %stage, "{}", message);
        self.entries.push(ExecutionLogEntry {
            timestamp: Utc::now(),
            stage,
            message,
            data,
        });
    }

    pub fn entries(&self) -> &[ExecutionLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&ExecutionLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line per entry: `[HH:MM:SS] STAGE           | message`.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|entry| {
                format!(
                    "[{}] {:<15} | {}",
                    entry.timestamp.format("%H:%M:%S"),
                    entry.stage.as_str().to_uppercase(),
                    entry.message
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
