pub mod create;
pub mod delete;
pub mod document_store;
pub mod find_by_id;
pub mod pagination;
pub mod pre_save_hook;
pub mod update;

// Re-exports
pub use create::*;
pub use delete::*;
pub use document_store::*;
pub use find_by_id::*;
pub use pagination::*;
pub use pre_save_hook::*;
pub use update::*;
