use uuid::Uuid;

/// Trait for documents that can be uniquely identified by a UUID within their model
pub trait Identifiable {
    /// Returns the unique identifier of the document
    fn get_id(&self) -> Uuid;
}
