pub mod create;
pub mod delete;
pub mod find_by_id;
pub mod repo_impl;
pub mod update;


pub use repo_impl::DocumentRepositoryImpl;
