use chrono::{SecondsFormat, Utc};
use historise_api::{HistoriseError, HistoriseResult};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::document::Document;
use crate::models::history::{HistoryEntry, HistoryLog};
use crate::models::identifiable::Identifiable;
use crate::models::schema::Schema;
use crate::repository::document_store::DocumentStore;
use crate::repository::pagination::{Page, PageRequest};

/// A named collection of documents sharing one schema, backed by a document store.
///
/// `save` is the persistence pipeline: automatic timestamps, then every pre-save hook of the
/// schema in registration order, then the insert or update. A failing hook aborts the save
/// before anything is written.
pub struct Model<S: DocumentStore + ?Sized> {
    name: String,
    schema: Schema,
    store: Arc<S>,
}

impl<S: DocumentStore + ?Sized> Model<S> {
    pub fn new(name: impl Into<String>, schema: Schema, store: Arc<S>) -> Self {
        let name = name.into();
        if let Some(config) = schema.history_config() {
            if config.model_name != name {
                warn!(
                    model = %name,
                    history_model = %config.model_name,
                    "history baselines are read from a different model"
                );
            }
        }
        Self {
            name,
            schema,
            store,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Builds a new, unsaved document with the schema defaults applied.
    pub fn create(&self, fields: Map<String, Value>) -> Document {
        let mut document = Document::new(fields);
        self.schema.apply_defaults(&mut document);
        document
    }

    /// Loads a persisted document, backfilling fields added to the schema since it was written.
    pub async fn find_by_id(&self, id: Uuid) -> HistoriseResult<Option<Document>> {
        let document = self
            .store
            .find_by_id(&self.name, id)
            .await
            .map_err(|e| HistoriseError::DatabaseError(e.to_string()))?;
        Ok(document.map(|mut document| {
            self.schema.apply_defaults(&mut document);
            document
        }))
    }

    /// Persists `document` and clears its dirty tracking.
    ///
    /// The document is borrowed so that a failed save leaves the caller's pending edits in
    /// place and the save can be retried.
    pub async fn save(&self, document: &mut Document) -> HistoriseResult<()> {
        let id = document.get_id();
        let is_new = document.is_new();

        if let Some(timestamps) = &self.schema.options().timestamps {
            let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true));
            if is_new {
                document.set(&timestamps.created_at, now.clone())?;
            }
            document.set(&timestamps.updated_at, now)?;
        }

        for hook in self.schema.pre_save_hooks() {
            if let Err(e) = hook.before_save(document).await {
                warn!(model = %self.name, %id, error = %e, "save aborted by pre-save hook");
                return Err(e);
            }
        }

        if is_new {
            if let Some(version_key) = &self.schema.options().version_key {
                document.write_untracked(version_key, Value::from(0));
            }
            self.store
                .create(&self.name, document)
                .await
                .map_err(|e| HistoriseError::DatabaseError(e.to_string()))?;
        } else {
            self.store
                .update(&self.name, document)
                .await
                .map_err(|e| HistoriseError::DatabaseError(e.to_string()))?;
        }

        debug!(model = %self.name, %id, created = is_new, "document saved");
        document.mark_persisted();
        Ok(())
    }

    /// Deletes a document; its embedded history goes with it.
    pub async fn delete(&self, id: Uuid) -> HistoriseResult<bool> {
        self.store
            .delete(&self.name, id)
            .await
            .map_err(|e| HistoriseError::DatabaseError(e.to_string()))
    }

    /// Typed, paginated view of a document's history, in the configured order.
    pub async fn history(
        &self,
        id: Uuid,
        page: PageRequest,
    ) -> HistoriseResult<Page<HistoryEntry>> {
        let config = self.schema.history_config().ok_or_else(|| {
            HistoriseError::ConfigurationError(format!(
                "model '{}' does not record history",
                self.name
            ))
        })?;
        let document = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| HistoriseError::NotFound(format!("{} document {id}", self.name)))?;

        let names = &config.field_names;
        let log = HistoryLog::from_value(document.get(&names.history), names)?;
        Ok(Page::from_slice(log.entries(), page))
    }
}
