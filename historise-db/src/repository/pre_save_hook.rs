use async_trait::async_trait;
use historise_api::HistoriseResult;

use crate::models::document::Document;

/// Callback run by the save pipeline before a document is written
///
/// Hooks are registered on a [`crate::Schema`] and run in registration order on every save.
/// Returning `Ok(())` lets the save proceed; returning an error aborts it before anything is
/// written, and the error is surfaced to the caller of the save.
#[async_trait]
pub trait PreSaveHook: Send + Sync {
    /// Inspect and possibly mutate the document about to be written
    ///
    /// # Arguments
    /// * `document` - The in-memory document, with its directly modified paths
    async fn before_save(&self, document: &mut Document) -> HistoriseResult<()>;
}
