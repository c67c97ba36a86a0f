use chrono::{DateTime, Utc};

use crate::error::{Error, Result};
use crate::models::configuration::Configuration;
use crate::models::release::Release;
use crate::normalizer::normalize;
use crate::output::OutputSink;
use crate::providers::downloader::Downloader;
use crate::providers::history_store::HistoryStore;
use crate::providers::marker_manager::MarkerManager;
use crate::providers::release_fetcher::ReleaseFetcher;
use crate::report;

#[derive(serde::Serialize)]
struct VersionEntry<'a> {
    version: &'a str,
}

#[derive(Debug, PartialEq)]
pub struct PollOutcome {
    pub tag: String,
    pub version_changed: bool,
    /// Names written to disk, present only when the version changed.
    pub downloaded: Option<Vec<String>>,
}

/// Wires the providers together for the three run modes.
pub struct Keeper<F, D, H, M> {
    pub configuration: Configuration,
    pub fetcher: F,
    pub downloader: D,
    pub history: H,
    pub marker: M,
    pub sink: OutputSink,
}

fn release_body(release: &Release) -> String {
    normalize(release.body.as_deref())
}

impl<F, D, H, M> Keeper<F, D, H, M>
where
    F: ReleaseFetcher,
    D: Downloader,
    H: HistoryStore,
    M: MarkerManager,
{
    /// Compact `[{"version": tag}, ...]`, oldest release first.
    pub async fn export_history(&self) -> Result<String> {
        let mut releases = self.fetcher.list_all_releases().await;
        releases.sort_by(|a, b| a.published_at.cmp(&b.published_at));
        let entries: Vec<VersionEntry> = releases
            .iter()
            .map(|release| VersionEntry {
                version: &release.tag_name,
            })
            .collect();
        Ok(serde_json::to_string(&entries)?)
    }

    /// Downloads the assets of one release and reports it to the sink.
    pub async fn download_tag(&self, tag: &str) -> Result<Vec<String>> {
        tracing::info!("Processing release {}...", tag);
        let release = self
            .fetcher
            .get_release_by_tag(tag)
            .await
            .ok_or_else(|| Error::TagNotFound(tag.to_string()))?;

        let downloaded = self
            .downloader
            .download_all(&release.assets, &self.configuration.download_dir)
            .await?;

        self.sink
            .set("published_at", &report::format_time(&release.published_at))
            .await?;
        self.sink.set("html_url", &release.html_url).await?;
        self.sink
            .set_multiline("body", &release_body(&release))
            .await?;
        self.sink
            .set_multiline("assets", &downloaded.join("\n"))
            .await?;
        Ok(downloaded)
    }

    /// The scheduled check: refresh history and report, and fetch assets
    /// when the latest tag moved past the recorded one.
    pub async fn poll(&self, now: DateTime<Utc>) -> Result<PollOutcome> {
        tracing::info!("Checking for the latest release...");
        let latest = self
            .fetcher
            .get_latest_release()
            .await
            .ok_or(Error::NoLatestRelease)?;
        let tag = latest.tag_name.as_str();

        // Unreadable marker aborts before anything reaches the sink.
        let local = self.marker.current().await?;
        tracing::info!(
            "Local version: {}, remote latest: {}",
            local.as_deref().unwrap_or("<none>"),
            tag
        );
        let version_changed = local.as_deref() != Some(tag);

        let mut history = self.history.load().await;
        if let Err(e) = self.history.record_if_new(&mut history, &latest).await {
            tracing::warn!("Failed to update history: {}", e);
        }
        let rendered = report::render(&history, &self.configuration, now);
        let report_path = &self.configuration.report_path;
        if let Err(e) = tokio::fs::write(report_path, rendered).await {
            tracing::warn!("Failed to write report {}: {}", report_path.display(), e);
        }

        self.sink
            .set("version_changed", if version_changed { "true" } else { "false" })
            .await?;
        self.sink.set("version", tag).await?;
        self.sink
            .set_multiline("body", &release_body(&latest))
            .await?;

        let downloaded = if version_changed {
            tracing::info!("New version {}, downloading assets...", tag);
            self.marker
                .invoke_if_different(tag, || async {
                    let downloaded = self
                        .downloader
                        .download_all(&latest.assets, &self.configuration.download_dir)
                        .await?;
                    self.sink
                        .set_multiline("assets", &downloaded.join("\n"))
                        .await?;
                    Ok::<_, Error>(downloaded)
                })
                .await?
        } else {
            None
        };

        Ok(PollOutcome {
            tag: tag.to_string(),
            version_changed,
            downloaded,
        })
    }
}
