use historise_api::{HistoriseError, HistoriseResult, PATH_SEPARATOR};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::identifiable::Identifiable;
use crate::utils::path::{get_path, get_path_mut, remove_path, set_path};

/// A schemaless document body with dirty-path tracking.
///
/// - `fields` holds the JSON body, keyed by top-level field name.
/// - `modified_paths` lists the paths directly modified since the document was created or
///   loaded, in the order they were first modified. A recorded path covers its sub-paths.
/// - `is_new` is true until the document has been persisted once.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    id: Uuid,
    fields: Map<String, Value>,
    modified_paths: Vec<String>,
    is_new: bool,
}

impl Document {
    /// Creates a new, not yet persisted document. Every supplied field counts as modified.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self::with_id(Uuid::new_v4(), fields)
    }

    /// Creates a new, not yet persisted document with a caller-chosen identity.
    pub fn with_id(id: Uuid, fields: Map<String, Value>) -> Self {
        let modified_paths = fields.keys().cloned().collect();
        Self {
            id,
            fields,
            modified_paths,
            is_new: true,
        }
    }

    /// Rehydrates a document read from a store. Nothing is marked modified.
    pub fn from_persisted(id: Uuid, fields: Map<String, Value>) -> Self {
        Self {
            id,
            fields,
            modified_paths: Vec::new(),
            is_new: false,
        }
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }

    pub fn get(&self, path: &str) -> Option<&Value> {
        get_path(&self.fields, path)
    }

    /// Sets `path` to `value` and records it as modified.
    ///
    /// Assigning a value equal to the current one is a no-op and does not mark the path.
    pub fn set(&mut self, path: &str, value: Value) -> HistoriseResult<()> {
        if self.get(path) == Some(&value) {
            return Ok(());
        }
        set_path(&mut self.fields, path, value).map_err(HistoriseError::ValidationError)?;
        self.mark_modified(path);
        Ok(())
    }

    /// Appends `value` to the array at `path`, creating the array when the path is unset.
    pub fn push(&mut self, path: &str, value: Value) -> HistoriseResult<()> {
        match get_path_mut(&mut self.fields, path) {
            Some(Value::Array(items)) => items.push(value),
            Some(Value::Null) | None => {
                set_path(&mut self.fields, path, Value::Array(vec![value]))
                    .map_err(HistoriseError::ValidationError)?;
            }
            Some(_) => {
                return Err(HistoriseError::ValidationError(format!(
                    "cannot push to '{path}': not an array"
                )));
            }
        }
        self.mark_modified(path);
        Ok(())
    }

    /// Removes the value at `path`, recording the path as modified when something was removed.
    pub fn unset(&mut self, path: &str) -> Option<Value> {
        let removed = remove_path(&mut self.fields, path);
        if removed.is_some() {
            self.mark_modified(path);
        }
        removed
    }

    /// Records `path` as directly modified.
    ///
    /// A path already covered by a recorded ancestor is not recorded again; recorded
    /// descendants of `path` are folded into it.
    pub fn mark_modified(&mut self, path: &str) {
        if self
            .modified_paths
            .iter()
            .any(|recorded| recorded == path || is_sub_path(path, recorded))
        {
            return;
        }
        self.modified_paths
            .retain(|recorded| !is_sub_path(recorded, path));
        self.modified_paths.push(path.to_string());
    }

    /// Returns true if `path`, one of its ancestors, or one of its descendants was modified.
    pub fn is_modified(&self, path: &str) -> bool {
        self.modified_paths.iter().any(|recorded| {
            recorded == path || is_sub_path(recorded, path) || is_sub_path(path, recorded)
        })
    }

    /// Paths directly modified since the document was created or loaded, in detection order.
    pub fn modified_paths(&self) -> &[String] {
        &self.modified_paths
    }

    /// Writes a top-level field without recording it as modified.
    pub(crate) fn write_untracked(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }

    pub(crate) fn fields_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.fields
    }

    /// Clears dirty tracking after a successful write.
    pub(crate) fn mark_persisted(&mut self) {
        self.modified_paths.clear();
        self.is_new = false;
    }
}

impl Identifiable for Document {
    fn get_id(&self) -> Uuid {
        self.id
    }
}

/// True when `path` lies strictly below `ancestor`.
fn is_sub_path(path: &str, ancestor: &str) -> bool {
    path.strip_prefix(ancestor)
        .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
}
