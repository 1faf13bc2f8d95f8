pub mod model;
pub mod models;
pub mod plugin;
pub mod repository;
pub mod store;
pub mod utils;

pub use model::Model;
pub use models::*;
pub use plugin::historise;
pub use store::InMemoryDocumentStore;
