use std::path::PathBuf;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::models::history_record::HistoryRecord;
use crate::models::release::Release;

use super::history_store::HistoryStore;

pub struct JsonHistoryStore {
    path: PathBuf,
}

impl JsonHistoryStore {
    pub fn new(path: PathBuf) -> JsonHistoryStore {
        JsonHistoryStore { path }
    }
}

fn to_pretty_json(history: &[HistoryRecord]) -> Result<Vec<u8>> {
    let mut content = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut content, formatter);
    history.serialize(&mut serializer)?;
    Ok(content)
}

impl HistoryStore for JsonHistoryStore {
    async fn load(&self) -> Vec<HistoryRecord> {
        let content = match tokio::fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read history {}, {}", self.path.display(), e);
                return Vec::new();
            }
        };
        match serde_json::from_slice(&content) {
            Ok(history) => history,
            Err(e) => {
                tracing::warn!(
                    "Ignoring unparsable history {}, {}",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    async fn save(&self, history: &[HistoryRecord]) -> Result<()> {
        let content = to_pretty_json(history)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| Error::io(&self.path, e))
    }

    async fn record_if_new(
        &self,
        history: &mut Vec<HistoryRecord>,
        release: &Release,
    ) -> Result<bool> {
        if history.iter().any(|record| record.tag_name == release.tag_name) {
            return Ok(false);
        }
        history.insert(0, HistoryRecord::from(release));
        self.save(history).await?;
        Ok(true)
    }
}
