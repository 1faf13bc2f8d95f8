use sqlx::PgPool;
use std::sync::Arc;

use crate::repository::document_repository::DocumentRepositoryImpl;

pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }

    /// Document repository backing historised models.
    ///
    /// Pass the same instance to `historise` and to the `Model` so baselines are read from the
    /// table the model writes to.
    pub fn create_document_repository(&self) -> Arc<DocumentRepositoryImpl> {
        Arc::new(DocumentRepositoryImpl::new(self.pool.clone()))
    }
}
