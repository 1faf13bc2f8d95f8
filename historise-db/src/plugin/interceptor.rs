use async_trait::async_trait;
use chrono::Utc;
use historise_api::{HistoriseConfig, HistoriseError, HistoriseResult};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, trace};
use uuid::Uuid;

use crate::models::document::Document;
use crate::models::history::{FieldModification, HistoryEntry, HistoryLog};
use crate::models::identifiable::Identifiable;
use crate::models::schema::SchemaOptions;
use crate::repository::find_by_id::FindById;
use crate::repository::pre_save_hook::PreSaveHook;

/// Fields through which a save is recognised as the initial creation of a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationMarkers {
    /// Auto-set creation timestamp, modified only by the first save
    pub created_at: Option<String>,
    /// Version key, absent until the first insert
    pub version_key: Option<String>,
}

impl CreationMarkers {
    pub fn from_options(options: &SchemaOptions) -> Self {
        Self {
            created_at: options
                .timestamps
                .as_ref()
                .map(|timestamps| timestamps.created_at.clone()),
            version_key: options.version_key.clone(),
        }
    }

    /// True for the first save of a document: it was never persisted, or a marker shows it.
    pub fn is_creation(&self, document: &Document) -> bool {
        if document.is_new() {
            return true;
        }
        let created = self
            .created_at
            .as_deref()
            .is_some_and(|field| document.is_modified(field));
        let unversioned = self
            .version_key
            .as_deref()
            .is_some_and(|key| document.get(key).is_none());
        created || unversioned
    }
}

/// Pre-save hook recording every update of a document into its embedded history log.
///
/// On each save of an existing document:
/// 1. fetch the persisted baseline through the injected reader
/// 2. diff every directly modified, non-ignored path against the baseline
/// 3. restore the persisted log when override protection is on
/// 4. record one entry holding all modifications, if any
/// 5. apply the retention limit, whether or not an entry was recorded
///
/// Any failure aborts the save. There is no lock between the baseline read and the write:
/// concurrent saves of one document may drop the earlier save's entry.
pub struct ChangeInterceptor {
    config: Arc<HistoriseConfig>,
    reader: Arc<dyn FindById>,
    creation: CreationMarkers,
}

impl ChangeInterceptor {
    pub fn new(
        config: Arc<HistoriseConfig>,
        reader: Arc<dyn FindById>,
        creation: CreationMarkers,
    ) -> Self {
        Self {
            config,
            reader,
            creation,
        }
    }

    pub fn config(&self) -> &HistoriseConfig {
        &self.config
    }

    async fn fetch_baseline(&self, id: Uuid) -> HistoriseResult<Document> {
        let model = &self.config.model_name;
        match self.reader.find_by_id(model, id).await {
            Ok(Some(baseline)) => Ok(baseline),
            Ok(None) => Err(HistoriseError::BaselineFetchError(format!(
                "no persisted version of {model} document {id}"
            ))),
            Err(e) => Err(HistoriseError::BaselineFetchError(format!(
                "failed to read {model} document {id}: {e}"
            ))),
        }
    }

    /// Builds one modification per tracked path, in the order the paths were modified.
    pub fn diff(&self, document: &Document, baseline: &Document) -> Vec<FieldModification> {
        document
            .modified_paths()
            .iter()
            .filter(|path| !self.config.is_ignored(path))
            .map(|path| {
                FieldModification::new(
                    path.as_str(),
                    baseline.get(path).cloned(),
                    document.get(path).cloned(),
                )
            })
            .collect()
    }
}

#[async_trait]
impl PreSaveHook for ChangeInterceptor {
    async fn before_save(&self, document: &mut Document) -> HistoriseResult<()> {
        let id = document.get_id();
        if self.creation.is_creation(document) {
            trace!(model = %self.config.model_name, %id, "document creation, history skipped");
            return Ok(());
        }

        let baseline = self.fetch_baseline(id).await?;
        let modifications = self.diff(document, &baseline);
        let names = &self.config.field_names;

        if self.config.prevent_history_override {
            let persisted = baseline
                .get(&names.history)
                .cloned()
                .unwrap_or_else(|| Value::Array(Vec::new()));
            document.write_untracked(&names.history, persisted);
        }

        let entry = HistoryEntry::new(Utc::now(), modifications);
        if entry.is_none() && self.config.limit.is_none() {
            trace!(model = %self.config.model_name, %id, "no tracked modifications");
            return Ok(());
        }

        let mut log = HistoryLog::from_value(document.get(&names.history), names)?;
        match entry {
            Some(entry) => {
                let changed = entry.modifications().len();
                log.record(entry, self.config.order, self.config.limit);
                debug!(
                    model = %self.config.model_name,
                    %id,
                    fields = changed,
                    entries = log.len(),
                    "history entry recorded"
                );
            }
            None => {
                let dropped = log.truncate(self.config.order, self.config.limit);
                if dropped == 0 {
                    trace!(model = %self.config.model_name, %id, "no tracked modifications");
                    return Ok(());
                }
                debug!(
                    model = %self.config.model_name,
                    %id,
                    dropped,
                    entries = log.len(),
                    "history trimmed to limit"
                );
            }
        }
        document.write_untracked(&names.history, log.to_value(names));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::create::Create;
    use crate::store::memory::InMemoryDocumentStore;
    use historise_api::{HistoriseOptions, HistoryOrder};
    use serde_json::{json, Map};

    struct UnreachableReader;

    #[async_trait]
    impl FindById for UnreachableReader {
        async fn find_by_id(
            &self,
            _model: &str,
            _id: Uuid,
        ) -> Result<Option<Document>, Box<dyn std::error::Error + Send + Sync>> {
            Err("connection refused".into())
        }
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn markers() -> CreationMarkers {
        CreationMarkers::from_options(&SchemaOptions::default())
    }

    async fn persisted(store: &InMemoryDocumentStore, body: Value) -> Document {
        let doc = Document::from_persisted(Uuid::new_v4(), object(body));
        store.create("Movie", &doc).await.unwrap();
        doc
    }

    fn interceptor(
        options: HistoriseOptions,
        store: Arc<InMemoryDocumentStore>,
    ) -> ChangeInterceptor {
        let config = Arc::new(HistoriseConfig::resolve(&options).unwrap());
        ChangeInterceptor::new(config, store, markers())
    }

    #[test]
    fn test_creation_markers() {
        let markers = markers();

        let fresh = Document::new(object(json!({ "title": "A", "createdAt": "now" })));
        assert!(markers.is_creation(&fresh));

        let unversioned =
            Document::from_persisted(Uuid::new_v4(), object(json!({ "title": "A" })));
        assert!(markers.is_creation(&unversioned));

        let versioned =
            Document::from_persisted(Uuid::new_v4(), object(json!({ "title": "A", "__v": 0 })));
        assert!(!markers.is_creation(&versioned));
    }

    #[test]
    fn test_unsaved_document_is_a_creation_without_markers() {
        let no_markers = CreationMarkers::default();

        let fresh = Document::new(object(json!({ "title": "A" })));
        assert!(no_markers.is_creation(&fresh));

        let persisted = Document::from_persisted(Uuid::new_v4(), object(json!({ "title": "A" })));
        assert!(!no_markers.is_creation(&persisted));
    }

    #[tokio::test]
    async fn test_creation_is_bypassed_without_reading() {
        let config = Arc::new(HistoriseConfig::resolve(&HistoriseOptions::new("Movie")).unwrap());
        let hook = ChangeInterceptor::new(config, Arc::new(UnreachableReader), markers());

        let mut doc = Document::new(object(json!({ "title": "A", "createdAt": "now" })));
        tokio_test::assert_ok!(hook.before_save(&mut doc).await);
        assert_eq!(doc.get("history"), None);
    }

    #[tokio::test]
    async fn test_baseline_read_failure_aborts() {
        let config = Arc::new(HistoriseConfig::resolve(&HistoriseOptions::new("Movie")).unwrap());
        let hook = ChangeInterceptor::new(config, Arc::new(UnreachableReader), markers());

        let mut doc =
            Document::from_persisted(Uuid::new_v4(), object(json!({ "title": "A", "__v": 0 })));
        doc.set("title", json!("B")).unwrap();

        let error = tokio_test::assert_err!(hook.before_save(&mut doc).await);
        assert!(matches!(
            error,
            HistoriseError::BaselineFetchError(ref msg) if msg.contains("connection refused")
        ));
    }

    #[tokio::test]
    async fn test_missing_baseline_aborts() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let hook = interceptor(HistoriseOptions::new("Movie"), store);

        let mut doc =
            Document::from_persisted(Uuid::new_v4(), object(json!({ "title": "A", "__v": 0 })));
        doc.set("title", json!("B")).unwrap();

        let result = hook.before_save(&mut doc).await;
        assert!(matches!(result, Err(HistoriseError::BaselineFetchError(_))));
    }

    #[tokio::test]
    async fn test_diff_uses_baseline_and_current_values() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(
            &store,
            json!({
                "title": "A",
                "duration": "X",
                "meta": { "studio": "WB" },
                "history": [],
                "__v": 0
            }),
        )
        .await;
        let hook = interceptor(HistoriseOptions::new("Movie"), store);

        let mut doc = base.clone();
        doc.set("duration", json!("Y")).unwrap();
        doc.set("meta.studio", json!("Heyday")).unwrap();
        doc.set("subtitle", json!("Part 1")).unwrap();
        doc.set("updatedAt", json!("2024-01-01T00:00:00Z")).unwrap();

        let modifications = hook.diff(&doc, &base);
        assert_eq!(
            modifications,
            vec![
                FieldModification::new("duration", Some(json!("X")), Some(json!("Y"))),
                FieldModification::new("meta.studio", Some(json!("WB")), Some(json!("Heyday"))),
                FieldModification::new("subtitle", None, Some(json!("Part 1"))),
            ]
        );
    }

    #[tokio::test]
    async fn test_records_single_entry_per_save() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(
            &store,
            json!({ "title": "A", "duration": "X", "history": [], "__v": 0 }),
        )
        .await;
        let hook = interceptor(HistoriseOptions::new("Movie"), store);

        let mut doc = base.clone();
        doc.set("title", json!("B")).unwrap();
        doc.set("duration", json!("Z")).unwrap();
        hook.before_save(&mut doc).await.unwrap();

        let config = hook.config();
        let log = HistoryLog::from_value(doc.get("history"), &config.field_names).unwrap();
        assert_eq!(log.len(), 1);
        let entry = log.newest(HistoryOrder::ReverseChronological).unwrap();
        assert_eq!(entry.modifications().len(), 2);
        assert_eq!(entry.modifications()[0].field, "title");
        assert_eq!(entry.modifications()[1].field, "duration");
    }

    #[tokio::test]
    async fn test_ignored_changes_leave_history_untouched() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base =
            persisted(&store, json!({ "title": "A", "views": 1, "history": [], "__v": 0 })).await;
        let hook = interceptor(
            HistoriseOptions::new("Movie").with_ignore_fields(["views", "history"]),
            store,
        );

        let mut doc = base.clone();
        doc.set("views", json!(2)).unwrap();
        hook.before_save(&mut doc).await.unwrap();
        assert_eq!(doc.get("history"), Some(&json!([])));
    }

    #[tokio::test]
    async fn test_override_protection_restores_persisted_log() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(&store, json!({ "title": "A", "history": [], "__v": 0 })).await;
        let hook = interceptor(HistoriseOptions::new("Movie"), store);

        let mut doc = base.clone();
        doc.set("history", json!("tampered")).unwrap();
        hook.before_save(&mut doc).await.unwrap();
        assert_eq!(doc.get("history"), Some(&json!([])));

        doc.set("title", json!("B")).unwrap();
        hook.before_save(&mut doc).await.unwrap();
        assert_eq!(doc.get("history").and_then(Value::as_array).map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_without_override_protection_caller_log_is_kept() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(&store, json!({ "title": "A", "history": [], "__v": 0 })).await;
        let hook = interceptor(
            HistoriseOptions::new("Movie").with_history_override_protection(false),
            store,
        );

        let imported = json!([{
            "timestamp": "2020-01-01T00:00:00Z",
            "modifications": [{ "field": "title", "oldValue": "0", "newValue": "A" }]
        }]);
        let mut doc = base.clone();
        doc.set("history", imported.clone()).unwrap();
        hook.before_save(&mut doc).await.unwrap();
        assert_eq!(doc.get("history"), Some(&imported));

        doc.set("title", json!("B")).unwrap();
        hook.before_save(&mut doc).await.unwrap();
        let entries = doc.get("history").and_then(Value::as_array).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1], imported[0]);
    }

    #[tokio::test]
    async fn test_malformed_log_aborts_when_unprotected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(&store, json!({ "title": "A", "history": [], "__v": 0 })).await;
        let hook = interceptor(
            HistoriseOptions::new("Movie").with_history_override_protection(false),
            store,
        );

        let mut doc = base.clone();
        doc.set("history", json!({ "not": "a list" })).unwrap();
        doc.set("title", json!("B")).unwrap();
        let result = hook.before_save(&mut doc).await;
        assert!(matches!(result, Err(HistoriseError::ValidationError(_))));
    }

    fn stored_log(fields: &[&str]) -> Value {
        Value::Array(
            fields
                .iter()
                .enumerate()
                .map(|(i, field)| {
                    json!({
                        "timestamp": format!("2023-11-14T22:13:{:02}Z", 50 - i),
                        "modifications": [{ "field": field, "oldValue": 0, "newValue": 1 }]
                    })
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_limit_trims_persisted_log_without_new_entry() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(
            &store,
            json!({ "title": "A", "history": stored_log(&["d", "c", "b", "a"]), "__v": 0 }),
        )
        .await;
        let hook = interceptor(HistoriseOptions::new("Movie").with_limit(2), store);

        let mut doc = base.clone();
        doc.set("updatedAt", json!("2024-01-01T00:00:00Z")).unwrap();
        tokio_test::assert_ok!(hook.before_save(&mut doc).await);

        let log = HistoryLog::from_value(doc.get("history"), &hook.config().field_names).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].modifications()[0].field, "d");
        assert_eq!(log.entries()[1].modifications()[0].field, "c");
    }

    #[tokio::test]
    async fn test_limit_trims_caller_log_when_unprotected() {
        let store = Arc::new(InMemoryDocumentStore::new());
        let base = persisted(&store, json!({ "title": "A", "history": [], "__v": 0 })).await;
        let hook = interceptor(
            HistoriseOptions::new("Movie")
                .with_limit(2)
                .with_order(HistoryOrder::Chronological)
                .with_history_override_protection(false),
            store,
        );

        let mut doc = base.clone();
        doc.set("history", stored_log(&["a", "b", "c"])).unwrap();
        tokio_test::assert_ok!(hook.before_save(&mut doc).await);

        let log = HistoryLog::from_value(doc.get("history"), &hook.config().field_names).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].modifications()[0].field, "b");
        assert_eq!(log.entries()[1].modifications()[0].field, "c");
    }
}
