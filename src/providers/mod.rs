pub mod release_fetcher;
pub mod github_release_fetcher;

pub mod downloader;
pub mod http_downloader;

pub mod history_store;
pub mod json_history_store;

pub mod marker_manager;
pub mod file_marker_manager;
