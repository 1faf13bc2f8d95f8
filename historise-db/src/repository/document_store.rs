use super::{create::Create, delete::Delete, find_by_id::FindById, update::Update};

/// Full document store contract required by [`crate::Model`]
pub trait DocumentStore: FindById + Create + Update + Delete {}

impl<T: FindById + Create + Update + Delete + ?Sized> DocumentStore for T {}
