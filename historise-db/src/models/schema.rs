use chrono::{SecondsFormat, Utc};
use historise_api::{HistoriseConfig, HistoriseError, HistoriseResult};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use super::document::Document;
use crate::repository::pre_save_hook::PreSaveHook;

/// Declared type of a schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String,
    Number,
    Boolean,
    Date,
    /// Untyped value, stored as-is
    Mixed,
    Array(Box<FieldType>),
    Embedded(Structure),
}

/// Value given to a field that is absent from a document
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
    Value(Value),
    /// The time at which the default is applied
    Now,
    EmptyArray,
}

impl FieldDefault {
    fn resolve(&self) -> Value {
        match self {
            FieldDefault::Value(value) => value.clone(),
            FieldDefault::Now => {
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldDefault::EmptyArray => Value::Array(Vec::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: String,
    pub field_type: FieldType,
    pub default: Option<FieldDefault>,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            default: None,
        }
    }

    pub fn with_default(mut self, default: FieldDefault) -> Self {
        self.default = Some(default);
        self
    }
}

/// An ordered set of field definitions, used both for documents and for embedded records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Structure {
    fields: Vec<FieldDef>,
}

impl Structure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Structure::add`]; a definition with the same name is replaced.
    pub fn with_field(mut self, def: FieldDef) -> Self {
        self.fields.retain(|existing| existing.name != def.name);
        self.fields.push(def);
        self
    }

    /// Registers a field, rejecting a name that is already defined.
    pub fn add(&mut self, def: FieldDef) -> HistoriseResult<()> {
        if self.field(&def.name).is_some() {
            return Err(HistoriseError::SchemaError(format!(
                "field '{}' is already defined",
                def.name
            )));
        }
        self.fields.push(def);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Fills absent fields with their defaults, recursing into embedded records.
    pub fn apply_defaults(&self, record: &mut Map<String, Value>) {
        for def in &self.fields {
            if !record.contains_key(&def.name) {
                if let Some(default) = &def.default {
                    record.insert(def.name.clone(), default.resolve());
                }
            }
            if let Some(value) = record.get_mut(&def.name) {
                apply_nested_defaults(&def.field_type, value);
            }
        }
    }
}

fn apply_nested_defaults(field_type: &FieldType, value: &mut Value) {
    match (field_type, value) {
        (FieldType::Embedded(structure), Value::Object(record)) => structure.apply_defaults(record),
        (FieldType::Array(item_type), Value::Array(items)) => {
            for item in items {
                apply_nested_defaults(item_type, item);
            }
        }
        _ => {}
    }
}

/// Names of the timestamps the save pipeline maintains automatically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampFields {
    pub created_at: String,
    pub updated_at: String,
}

impl Default for TimestampFields {
    fn default() -> Self {
        Self {
            created_at: "createdAt".to_string(),
            updated_at: "updatedAt".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaOptions {
    /// Automatic creation/update timestamps, `None` to disable them
    pub timestamps: Option<TimestampFields>,
    /// Field set to 0 when a document is first inserted, `None` to disable it
    pub version_key: Option<String>,
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self {
            timestamps: Some(TimestampFields::default()),
            version_key: Some("__v".to_string()),
        }
    }
}

/// Document schema: field definitions, lifecycle options and pre-save hooks.
#[derive(Clone, Default)]
pub struct Schema {
    structure: Structure,
    options: SchemaOptions,
    pre_save_hooks: Vec<Arc<dyn PreSaveHook>>,
    history: Option<Arc<HistoriseConfig>>,
}

impl Schema {
    pub fn new(structure: Structure) -> Self {
        Self {
            structure,
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: SchemaOptions) -> Self {
        self.options = options;
        self
    }

    pub fn structure(&self) -> &Structure {
        &self.structure
    }

    pub fn options(&self) -> &SchemaOptions {
        &self.options
    }

    /// Registers a top-level field, rejecting a name that is already defined.
    pub fn add(&mut self, def: FieldDef) -> HistoriseResult<()> {
        self.structure.add(def)
    }

    pub fn pre_save(&mut self, hook: Arc<dyn PreSaveHook>) {
        self.pre_save_hooks.push(hook);
    }

    pub fn pre_save_hooks(&self) -> &[Arc<dyn PreSaveHook>] {
        &self.pre_save_hooks
    }

    /// Configuration of the history log, once the schema has been augmented
    pub fn history_config(&self) -> Option<&Arc<HistoriseConfig>> {
        self.history.as_ref()
    }

    pub(crate) fn set_history_config(&mut self, config: Arc<HistoriseConfig>) {
        self.history = Some(config);
    }

    pub fn apply_defaults(&self, document: &mut Document) {
        self.structure.apply_defaults(document.fields_mut());
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("structure", &self.structure)
            .field("options", &self.options)
            .field("pre_save_hooks", &self.pre_save_hooks.len())
            .field("history", &self.history)
            .finish()
    }
}
