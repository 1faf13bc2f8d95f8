use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::HistoryOrder;

/// Caller-supplied plugin options, every field optional.
///
/// Deserializes from the camelCase option object used in configuration files:
///
/// ```
/// use historise_api::HistoriseOptions;
///
/// let options: HistoriseOptions = serde_json::from_str(r#"{
///     "modelName": "Movie",
///     "fieldnames": { "history": "historique" },
///     "limit": 10,
///     "order": 1
/// }"#).unwrap();
///
/// assert_eq!(options.model_name.as_deref(), Some("Movie"));
/// ```
///
/// `limit` and `order` are kept as raw JSON values: they are coerced during resolution, see
/// [`crate::HistoriseConfig::resolve`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoriseOptions {
    /// Name of the model whose persisted documents serve as baselines
    pub model_name: Option<String>,
    pub fieldnames: Option<FieldNameOptions>,
    pub limit: Option<Value>,
    pub order: Option<Value>,
    pub ignore_fields: Option<Vec<String>>,
    pub prevent_history_override: Option<bool>,
}

/// Partial field-name overrides; unset names fall back to the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNameOptions {
    pub history: Option<String>,
    pub modifications: Option<String>,
    pub timestamp: Option<String>,
    pub field: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

impl HistoriseOptions {
    pub fn new(model_name: impl Into<String>) -> Self {
        Self {
            model_name: Some(model_name.into()),
            ..Self::default()
        }
    }

    pub fn with_field_names(mut self, fieldnames: FieldNameOptions) -> Self {
        self.fieldnames = Some(fieldnames);
        self
    }

    pub fn with_limit(mut self, limit: impl Into<Value>) -> Self {
        self.limit = Some(limit.into());
        self
    }

    pub fn with_order(mut self, order: HistoryOrder) -> Self {
        self.order = Some(Value::from(order.as_option()));
        self
    }

    pub fn with_ignore_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignore_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_history_override_protection(mut self, enabled: bool) -> Self {
        self.prevent_history_override = Some(enabled);
        self
    }
}
