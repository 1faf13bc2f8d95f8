use async_trait::async_trait;

use crate::models::document::Document;

/// Inserts a document that has never been persisted
#[async_trait]
pub trait Create: Send + Sync {
    /// Persist a new document
    ///
    /// # Arguments
    /// * `model` - The name of the model (collection) the document belongs to
    /// * `document` - The document to insert, identified by its own id
    ///
    /// # Returns
    /// * `Ok(())` - The document was inserted
    /// * `Err` - An error if a document with the same id already exists or the write failed
    async fn create(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
