use historise_db::models::document::Document;
use serde_json::{Map, Value};
use sqlx::{postgres::PgRow, types::Json, Row};
use std::error::Error;

/// A trait for converting a database row into a model.
pub trait TryFromRow<R>: Sized {
    /// Performs the conversion.
    fn try_from_row(row: &R) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

/// Rebuilds a persisted document from a `historised_document` row.
impl TryFromRow<PgRow> for Document {
    fn try_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let body: Json<Map<String, Value>> = row.try_get("body")?;
        Ok(Document::from_persisted(row.try_get("id")?, body.0))
    }
}
