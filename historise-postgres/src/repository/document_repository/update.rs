use async_trait::async_trait;
use historise_db::models::document::Document;
use historise_db::models::identifiable::Identifiable;
use historise_db::repository::update::Update;
use historise_db::utils::hash_as_i64;
use sqlx::types::Json;
use std::error::Error;

use super::repo_impl::DocumentRepositoryImpl;

impl DocumentRepositoryImpl {
    pub(super) async fn update_impl(
        repo: &DocumentRepositoryImpl,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let id = document.get_id();
        let computed_hash = hash_as_i64(document.fields())?;

        let mut transaction = repo.pool.begin().await?;

        let previous_hash: Option<i64> = sqlx::query_scalar(
            r#"SELECT hash FROM historised_document WHERE model = $1 AND id = $2 FOR UPDATE"#,
        )
        .bind(model)
        .bind(id)
        .fetch_optional(&mut *transaction)
        .await?;

        let previous_hash =
            previous_hash.ok_or_else(|| format!("{model} document {id} does not exist"))?;
        if previous_hash == computed_hash {
            tracing::trace!(%model, %id, "document body unchanged, write skipped");
            transaction.commit().await?;
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE historised_document SET body = $3, hash = $4
            WHERE model = $1 AND id = $2
            "#,
        )
        .bind(model)
        .bind(id)
        .bind(Json(document.fields()))
        .bind(computed_hash)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;
        tracing::trace!(%model, %id, hash = computed_hash, "document updated");
        Ok(())
    }
}

#[async_trait]
impl Update for DocumentRepositoryImpl {
    async fn update(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        Self::update_impl(self, model, document).await
    }
}
