use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::error::{Error, Result};
use crate::models::configuration::Configuration;
use crate::models::release::Asset;

use super::downloader::Downloader;
use super::github_release_fetcher::build_client;

pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
const CHUNK_SIZE: usize = 8192;

pub struct HttpDownloader {
    client: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(configuration: &Configuration) -> Result<HttpDownloader> {
        Ok(HttpDownloader {
            client: build_client(configuration)?,
        })
    }

    async fn download_one(&self, asset: &Asset, target_dir: &Path) -> Result<()> {
        let path = asset_path(target_dir, &asset.name)?;
        let result = self.stream_to_file(&asset.browser_download_url, &path).await;
        if result.is_err() {
            // Leave nothing half-written behind.
            let _ = tokio::fs::remove_file(&path).await;
        }
        result
    }

    async fn stream_to_file(&self, url: &str, path: &Path) -> Result<()> {
        let mut response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;

        let file = tokio::fs::File::create(path)
            .await
            .map_err(|e| Error::io(path, e))?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        while let Some(chunk) = response.chunk().await? {
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| Error::io(path, e))?;
        }
        writer.flush().await.map_err(|e| Error::io(path, e))?;
        Ok(())
    }
}

/// Asset names come from the remote side; refuse anything that would land
/// outside `target_dir`.
fn asset_path(target_dir: &Path, name: &str) -> Result<PathBuf> {
    let is_plain_name = !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\']);
    if !is_plain_name {
        return Err(Error::io(
            target_dir,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refusing asset name {:?}", name),
            ),
        ));
    }
    Ok(target_dir.join(name))
}

impl Downloader for HttpDownloader {
    async fn download_all(&self, assets: &[Asset], target_dir: &Path) -> Result<Vec<String>> {
        if tokio::fs::metadata(target_dir).await.is_err() {
            tokio::fs::create_dir_all(target_dir)
                .await
                .map_err(|e| Error::io(target_dir, e))?;
        }

        let mut downloaded = Vec::new();
        for asset in assets {
            tracing::info!("Downloading {}...", asset.name);
            match self.download_one(asset, target_dir).await {
                Ok(()) => {
                    tracing::info!("Downloaded {}", asset.name);
                    downloaded.push(asset.name.clone());
                }
                Err(e) => tracing::warn!("Failed to download {}: {}", asset.name, e),
            }
        }
        Ok(downloaded)
    }
}
