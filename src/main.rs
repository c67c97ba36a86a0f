use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod error;
mod keeper;
mod models;
mod normalizer;
mod output;
mod providers;
mod report;

use crate::error::Result;
use crate::keeper::Keeper;
use crate::models::configuration::Configuration;
use crate::output::OutputSink;
use crate::providers::file_marker_manager::FileMarkerManager;
use crate::providers::github_release_fetcher::GithubReleaseFetcher;
use crate::providers::http_downloader::HttpDownloader;
use crate::providers::json_history_store::JsonHistoryStore;

/// Watches a repository's releases, archives their assets and keeps a
/// Markdown history of every version seen.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Print every release tag as JSON, oldest first.
    #[arg(long, conflicts_with = "download")]
    api_history: bool,

    /// Download the assets of the release with this tag.
    #[arg(long, value_name = "TAG")]
    download: Option<String>,

    /// YAML file overriding the repository and file locations.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
}

async fn run(args: Args) -> Result<()> {
    let configuration = Configuration::load(args.config.as_deref()).await?;
    let keeper = Keeper {
        fetcher: GithubReleaseFetcher::new(&configuration)?,
        downloader: HttpDownloader::new(&configuration)?,
        history: JsonHistoryStore::new(configuration.history_path.clone()),
        marker: FileMarkerManager::new(configuration.version_path.clone()),
        sink: OutputSink::new(configuration.output_path.clone()),
        configuration,
    };

    if args.api_history {
        println!("{}", keeper.export_history().await?);
    } else if let Some(tag) = args.download {
        keeper.download_tag(&tag).await?;
    } else {
        keeper.poll(chrono::Utc::now()).await?;
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
