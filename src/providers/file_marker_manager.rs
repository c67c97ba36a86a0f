use std::path::PathBuf;

use crate::error::{Error, Result};

use super::marker_manager::MarkerManager;

pub struct FileMarkerManager {
    path: PathBuf,
}

impl FileMarkerManager {
    pub fn new(path: PathBuf) -> FileMarkerManager {
        FileMarkerManager { path }
    }
}

impl MarkerManager for FileMarkerManager {
    async fn current(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content.trim().to_string()).filter(|tag| !tag.is_empty())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&self.path, e)),
        }
    }

    async fn invoke_if_different<F, Fut, T>(&self, tag: &str, callback: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.current().await?.as_deref() == Some(tag) {
            return Ok(None);
        }

        let output = callback().await?;

        tokio::fs::write(&self.path, tag)
            .await
            .map_err(|e| Error::io(&self.path, e))?;
        Ok(Some(output))
    }
}
