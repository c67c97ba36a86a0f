use std::path::Path;

use crate::error::Result;
use crate::models::release::Asset;

pub trait Downloader {
    /// Streams every asset into `target_dir`, one after the other, and
    /// returns the names that made it to disk in input order. A failed asset
    /// is logged and skipped.
    fn download_all(
        &self,
        assets: &[Asset],
        target_dir: &Path,
    ) -> impl std::future::Future<Output = Result<Vec<String>>>;
}
