use async_trait::async_trait;
use uuid::Uuid;

use crate::models::document::Document;

/// Point read of the currently persisted state of a document
///
/// This is the only store capability the change interceptor needs: it is injected at
/// plugin attachment time and used to fetch the baseline of every update.
///
/// # Example
/// ```ignore
/// #[async_trait]
/// impl FindById for DocumentRepositoryImpl {
///     async fn find_by_id(
///         &self,
///         model: &str,
///         id: Uuid,
///     ) -> Result<Option<Document>, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait FindById: Send + Sync {
    /// Find a document by its model name and unique identifier
    ///
    /// # Arguments
    /// * `model` - The name of the model (collection) the document belongs to
    /// * `id` - The UUID of the document to find
    ///
    /// # Returns
    /// * `Ok(Some(Document))` - The persisted document, with no modified paths
    /// * `Ok(None)` - If the document does not exist
    /// * `Err` - An error if the store could not be read
    async fn find_by_id(
        &self,
        model: &str,
        id: Uuid,
    ) -> Result<Option<Document>, Box<dyn std::error::Error + Send + Sync>>;
}
