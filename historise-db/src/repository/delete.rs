use async_trait::async_trait;
use uuid::Uuid;

/// Removes a document together with its embedded history
#[async_trait]
pub trait Delete: Send + Sync {
    /// Delete a document by its model name and unique identifier
    ///
    /// # Returns
    /// * `Ok(true)` - The document existed and was removed
    /// * `Ok(false)` - If the document does not exist
    /// * `Err` - An error if the delete could not be executed
    async fn delete(
        &self,
        model: &str,
        id: Uuid,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}
