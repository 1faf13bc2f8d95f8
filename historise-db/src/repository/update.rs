use async_trait::async_trait;

use crate::models::document::Document;

/// Replaces the persisted body of an existing document
///
/// Implementations may skip the write when the body is unchanged.
#[async_trait]
pub trait Update: Send + Sync {
    /// Overwrite a persisted document with its in-memory state
    ///
    /// # Arguments
    /// * `model` - The name of the model (collection) the document belongs to
    /// * `document` - The document to write, identified by its own id
    ///
    /// # Returns
    /// * `Ok(())` - The document is persisted with the given body
    /// * `Err` - An error if the document does not exist or the write failed
    async fn update(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
