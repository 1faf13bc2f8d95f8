pub mod document;
pub mod history;
pub mod identifiable;
pub mod schema;

// Re-exports
pub use document::*;
pub use history::*;
pub use identifiable::*;
pub use schema::*;
