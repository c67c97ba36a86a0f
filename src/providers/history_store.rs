use crate::error::Result;
use crate::models::history_record::HistoryRecord;
use crate::models::release::Release;

pub trait HistoryStore {
    /// Persisted history, or an empty one when the file is missing or
    /// unreadable.
    fn load(&self) -> impl std::future::Future<Output = Vec<HistoryRecord>>;

    fn save(&self, history: &[HistoryRecord]) -> impl std::future::Future<Output = Result<()>>;

    /// Inserts `release` at the front and persists, unless its tag is
    /// already recorded. Returns whether anything was added.
    fn record_if_new(
        &self,
        history: &mut Vec<HistoryRecord>,
        release: &Release,
    ) -> impl std::future::Future<Output = Result<bool>>;
}
