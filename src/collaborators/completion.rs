//! Append-only record of completed accounts.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use super::CompletionStore;
use crate::error::CollaboratorError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionRecord {
    pub account_id: String,
    pub completed_at: DateTime<Utc>,
}

/// One JSON object per line.
pub struct JsonlCompletionStore {
    path: PathBuf,
}

impl JsonlCompletionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[cfg(test)]
    async fn read_all(&self) -> Result<Vec<CompletionRecord>, CollaboratorError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| CollaboratorError::Other(e.to_string()))
            })
            .collect()
    }
}

#[async_trait]
impl CompletionStore for JsonlCompletionStore {
    async fn mark_done(&self, account_id: &str) -> Result<(), CollaboratorError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let record = CompletionRecord {
            account_id: account_id.to_string(),
            completed_at: Utc::now(),
        };
        let mut line =
            serde_json::to_string(&record).map_err(|e| CollaboratorError::Other(e.to_string()))?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        tracing::debug!(account_id, path = %self.path.display(), "Completion recorded");
        Ok(())
    }
}
