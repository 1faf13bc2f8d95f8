use async_trait::async_trait;
use historise_db::models::document::Document;
use historise_db::models::identifiable::Identifiable;
use historise_db::repository::create::Create;
use historise_db::utils::hash_as_i64;
use sqlx::types::Json;
use std::error::Error;

use super::repo_impl::DocumentRepositoryImpl;

impl DocumentRepositoryImpl {
    pub(super) async fn create_impl(
        repo: &DocumentRepositoryImpl,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let hash = hash_as_i64(document.fields())?;

        sqlx::query(
            r#"
            INSERT INTO historised_document (model, id, body, hash)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(model)
        .bind(document.get_id())
        .bind(Json(document.fields()))
        .bind(hash)
        .execute(&*repo.pool)
        .await?;

        tracing::trace!(%model, id = %document.get_id(), hash, "document inserted");
        Ok(())
    }
}

#[async_trait]
impl Create for DocumentRepositoryImpl {
    async fn create(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::create_impl(self, model, document).await
    }
}
