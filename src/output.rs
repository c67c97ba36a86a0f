use std::path::PathBuf;

use tokio::io::AsyncWriteExt;

use crate::error::{Error, Result};

/// Appends `key=value` lines to the workflow output file. Values that may
/// span lines use the `key<<DELIM` form with a delimiter drawn fresh for
/// every value, so nothing in the value can close the block early.
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    pub fn new(path: Option<PathBuf>) -> OutputSink {
        OutputSink { path }
    }

    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.append(&format!("{}={}\n", key, value)).await
    }

    pub async fn set_multiline(&self, key: &str, value: &str) -> Result<()> {
        let delimiter = random_delimiter();
        self.append(&format!("{}<<{}\n{}\n{}\n", key, delimiter, value, delimiter))
            .await
    }

    async fn append(&self, content: &str) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("No output sink configured, dropping {:?}", content);
            return Ok(());
        };
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::io(path, e))
    }
}

fn random_delimiter() -> String {
    let bytes: [u8; 6] = rand::random();
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    format!("EOF_{}", hex)
}
