///! Append-only JSONL audit trail
///!
///! One line per successful enrichment, written to a durable file and never
///! read back by the process. Write failures are logged and swallowed: the
///! audit trail must not interfere with notification delivery.

use crate::module::n2yo::Position;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub sat_name: String,
    pub category: String,
    pub positions: Vec<Position>,
}

impl AuditRecord {
    /// Record the position payload dispatched for one satellite.
    pub fn positions(sat_name: impl Into<String>, positions: Vec<Position>) -> Self {
        Self {
            timestamp: Utc::now().format(TIMESTAMP_FORMAT).to_string(),
            sat_name: sat_name.into(),
            category: "positions".to_string(),
            positions,
        }
    }
}

pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append one record. Failures are logged, never propagated.
    pub async fn append(&self, record: &AuditRecord) {
        if let Err(e) = self.try_append(record).await {
            tracing::error!("Failed to write audit record for {}: {:#}", record.sat_name, e);
        }
    }

    async fn try_append(&self, record: &AuditRecord) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create audit log directory")?;
            }
        }

        let mut line = serde_json::to_string(record).context("Failed to serialize audit record")?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .context("Failed to open audit log")?;

        file.write_all(line.as_bytes())
            .await
            .context("Failed to append audit record")?;

        file.flush().await.context("Failed to flush audit record")?;

        Ok(())
    }
}
