use crate::error::Result;

pub trait MarkerManager {
    /// The tag recorded by the last processed run, if any.
    async fn current(&self) -> Result<Option<String>>;

    /// Runs `callback` only when `tag` differs from the recorded one, then
    /// records `tag`. Returns the callback's output, or `None` when skipped.
    async fn invoke_if_different<F, Fut, T>(&self, tag: &str, callback: F) -> Result<Option<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>;
}
