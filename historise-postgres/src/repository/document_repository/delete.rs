use async_trait::async_trait;
use historise_db::repository::delete::Delete;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::DocumentRepositoryImpl;

impl DocumentRepositoryImpl {
    pub(super) async fn delete_impl(
        repo: &DocumentRepositoryImpl,
        model: &str,
        id: Uuid,
    ) -> Result<bool, Box<dyn Error + Send + Sync>> {
        let result = sqlx::query(r#"DELETE FROM historised_document WHERE model = $1 AND id = $2"#)
            .bind(model)
            .bind(id)
            .execute(&*repo.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Delete for DocumentRepositoryImpl {
    async fn delete(&self, model: &str, id: Uuid) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Self::delete_impl(self, model, id).await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use historise_db::models::document::Document;
    use historise_db::models::identifiable::Identifiable;
    use historise_db::repository::create::Create;
    use historise_db::repository::delete::Delete;
    use historise_db::repository::find_by_id::FindById;
    use uuid::Uuid;

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_delete() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let repo = ctx.repos().create_document_repository();

        let doc = Document::new(Default::default());
        repo.create(&ctx.model, &doc).await?;

        assert!(repo.delete(&ctx.model, doc.get_id()).await?);
        assert!(repo.find_by_id(&ctx.model, doc.get_id()).await?.is_none());
        assert!(!repo.delete(&ctx.model, Uuid::new_v4()).await?);

        Ok(())
    }
}
