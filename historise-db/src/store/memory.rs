use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use crate::models::document::Document;
use crate::models::identifiable::Identifiable;
use crate::repository::{create::Create, delete::Delete, find_by_id::FindById, update::Update};

type DocumentKey = (String, Uuid);

/// Process-local document store keyed by model name and document id.
///
/// The lock is never held across an await point.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<HashMap<DocumentKey, Map<String, Value>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored for `model`
    pub fn count(&self, model: &str) -> usize {
        self.documents
            .read()
            .keys()
            .filter(|(stored_model, _)| stored_model == model)
            .count()
    }
}

#[async_trait]
impl FindById for InMemoryDocumentStore {
    async fn find_by_id(
        &self,
        model: &str,
        id: Uuid,
    ) -> Result<Option<Document>, Box<dyn Error + Send + Sync>> {
        let fields = self.documents.read().get(&(model.to_string(), id)).cloned();
        Ok(fields.map(|fields| Document::from_persisted(id, fields)))
    }
}

#[async_trait]
impl Create for InMemoryDocumentStore {
    async fn create(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let key = (model.to_string(), document.get_id());
        let mut documents = self.documents.write();
        if documents.contains_key(&key) {
            return Err(format!("{model} document {} already exists", key.1).into());
        }
        documents.insert(key, document.fields().clone());
        Ok(())
    }
}

#[async_trait]
impl Update for InMemoryDocumentStore {
    async fn update(
        &self,
        model: &str,
        document: &Document,
    ) -> Result<(), Box<dyn Error + Send + Sync>> {
        let key = (model.to_string(), document.get_id());
        let mut documents = self.documents.write();
        match documents.get_mut(&key) {
            Some(stored) => {
                *stored = document.fields().clone();
                Ok(())
            }
            None => Err(format!("{model} document {} does not exist", key.1).into()),
        }
    }
}

#[async_trait]
impl Delete for InMemoryDocumentStore {
    async fn delete(&self, model: &str, id: Uuid) -> Result<bool, Box<dyn Error + Send + Sync>> {
        Ok(self.documents.write().remove(&(model.to_string(), id)).is_some())
    }
}
