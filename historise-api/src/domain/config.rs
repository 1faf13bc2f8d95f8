use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::num::NonZeroUsize;
use validator::Validate;

use super::field_names::{FieldNames, PATH_SEPARATOR};
use super::options::HistoriseOptions;
use crate::error::{HistoriseError, HistoriseResult};

/// Auto-updated timestamp field ignored by default when the schema does not say otherwise
pub const DEFAULT_UPDATED_AT_FIELD: &str = "updatedAt";

/// Position of newly appended history entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HistoryOrder {
    /// Oldest entry first, new entries are appended at the end
    Chronological,
    /// Newest entry first, new entries are inserted at the front
    #[default]
    ReverseChronological,
}

impl HistoryOrder {
    /// Interprets the raw `order` option.
    ///
    /// `1` (number, numeric string or `true`) selects chronological order, anything else
    /// reverse-chronological.
    pub fn from_option(value: &Value) -> Self {
        if coerce_number(value) == Some(1.0) {
            HistoryOrder::Chronological
        } else {
            HistoryOrder::ReverseChronological
        }
    }

    pub fn as_option(self) -> i64 {
        match self {
            HistoryOrder::Chronological => 1,
            HistoryOrder::ReverseChronological => -1,
        }
    }
}

/// Fully-defaulted plugin configuration, resolved once per schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoriseConfig {
    pub model_name: String,
    pub field_names: FieldNames,
    pub order: HistoryOrder,
    /// Maximum number of retained entries, `None` for an unbounded log
    pub limit: Option<NonZeroUsize>,
    pub ignore_fields: Vec<String>,
    pub prevent_history_override: bool,
}

impl HistoriseConfig {
    /// Resolves options against the default auto-updated timestamp field (`updatedAt`).
    pub fn resolve(options: &HistoriseOptions) -> HistoriseResult<Self> {
        Self::resolve_with_updated_at(options, DEFAULT_UPDATED_AT_FIELD)
    }

    /// Resolves caller options into a complete configuration.
    ///
    /// # Arguments
    /// * `options` - The caller-supplied options, left untouched
    /// * `updated_at_field` - The store's auto-updated timestamp field, ignored by default
    ///
    /// # Returns
    /// * `Ok(HistoriseConfig)` - The resolved configuration
    /// * `Err(HistoriseError::ConfigurationError)` - If no model name is supplied or a field
    ///   name is invalid
    pub fn resolve_with_updated_at(
        options: &HistoriseOptions,
        updated_at_field: &str,
    ) -> HistoriseResult<Self> {
        let model_name = options
            .model_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| {
                HistoriseError::ConfigurationError(
                    "a model name is required to fetch baseline documents".to_string(),
                )
            })?
            .to_string();

        let field_names = resolve_field_names(options)?;

        let limit = options.limit.as_ref().and_then(coerce_limit);
        let order = options
            .order
            .as_ref()
            .map(HistoryOrder::from_option)
            .unwrap_or_default();
        let ignore_fields = match &options.ignore_fields {
            Some(fields) => fields.clone(),
            None => vec![updated_at_field.to_string(), field_names.history.clone()],
        };
        let prevent_history_override = options.prevent_history_override.unwrap_or(true);

        Ok(Self {
            model_name,
            field_names,
            order,
            limit,
            ignore_fields,
            prevent_history_override,
        })
    }

    /// Returns true when `path` is an ignored field or lies below one.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.ignore_fields.iter().any(|ignored| {
            path == ignored
                || path
                    .strip_prefix(ignored.as_str())
                    .is_some_and(|rest| rest.starts_with(PATH_SEPARATOR))
        })
    }
}

fn resolve_field_names(options: &HistoriseOptions) -> HistoriseResult<FieldNames> {
    let mut names = FieldNames::default();
    if let Some(custom) = &options.fieldnames {
        let overrides = [
            (&mut names.history, &custom.history),
            (&mut names.modifications, &custom.modifications),
            (&mut names.timestamp, &custom.timestamp),
            (&mut names.field, &custom.field),
            (&mut names.old_value, &custom.old_value),
            (&mut names.new_value, &custom.new_value),
        ];
        for (name, value) in overrides {
            if let Some(value) = value {
                *name = value.clone();
            }
        }
    }

    names
        .validate()
        .map_err(|e| HistoriseError::ConfigurationError(format!("invalid field names: {e}")))?;
    Ok(names)
}

/// Coerces a raw `limit` option into a retention limit.
///
/// Absent, zero, negative, non-finite and non-numeric values all mean "unbounded".
/// Fractional limits are floored.
pub fn coerce_limit(value: &Value) -> Option<NonZeroUsize> {
    let limit = coerce_number(value)?;
    if !limit.is_finite() || limit < 1.0 {
        return None;
    }
    NonZeroUsize::new(limit.floor() as usize)
}

fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Some(0.0)
            } else {
                s.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}
