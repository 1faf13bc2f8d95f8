use sqlx::PgPool;
use std::sync::Arc;

/// PostgreSQL document store: one `historised_document` row per document, body as JSONB.
///
/// Implements every capability of `historise_db::repository::DocumentStore`, so one instance
/// serves both as a model's store and as the baseline reader of its change interceptor.
pub struct DocumentRepositoryImpl {
    pub(crate) pool: Arc<PgPool>,
}

impl DocumentRepositoryImpl {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}
