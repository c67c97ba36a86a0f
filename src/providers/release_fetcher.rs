use crate::models::release::Release;

pub trait ReleaseFetcher {
    /// Every release, page by page. A failure mid-way returns what was
    /// collected up to that point.
    fn list_all_releases(&self) -> impl std::future::Future<Output = Vec<Release>>;

    /// The provider's latest release, falling back to the first listed
    /// release when the provider has none marked latest.
    fn get_latest_release(&self) -> impl std::future::Future<Output = Option<Release>>;

    fn get_release_by_tag(
        &self,
        tag: &str,
    ) -> impl std::future::Future<Output = Option<Release>>;
}
