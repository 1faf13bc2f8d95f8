use async_trait::async_trait;
use historise_db::models::document::Document;
use historise_db::repository::find_by_id::FindById;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::DocumentRepositoryImpl;
use crate::utils::TryFromRow;

impl DocumentRepositoryImpl {
    pub(super) async fn find_by_id_impl(
        repo: &DocumentRepositoryImpl,
        model: &str,
        id: Uuid,
    ) -> Result<Option<Document>, Box<dyn Error + Send + Sync>> {
        let row = sqlx::query(
            r#"SELECT id, body FROM historised_document WHERE model = $1 AND id = $2"#,
        )
        .bind(model)
        .bind(id)
        .fetch_optional(&*repo.pool)
        .await?;

        row.map(|row| Document::try_from_row(&row)).transpose()
    }
}

#[async_trait]
impl FindById for DocumentRepositoryImpl {
    async fn find_by_id(
        &self,
        model: &str,
        id: Uuid,
    ) -> Result<Option<Document>, Box<dyn Error + Send + Sync>> {
        Self::find_by_id_impl(self, model, id).await
    }
}
