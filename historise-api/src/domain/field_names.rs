use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

/// Separator used by dotted field paths. Configured names must not contain it.
pub const PATH_SEPARATOR: char = '.';

/// Names under which the history structures are stored on a document.
///
/// Every attribute of the embedded log can be renamed, including with non-English names.
/// Names within one nesting level must be distinct:
/// - entry level: `modifications`, `timestamp`
/// - modification level: `field`, `old_value`, `new_value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_distinct_names"))]
pub struct FieldNames {
    /// Name of the array field holding the history log on the owning document
    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub history: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub modifications: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub timestamp: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub field: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub old_value: String,

    #[validate(length(min = 1, max = 64), custom(function = "validate_no_path_separator"))]
    pub new_value: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            history: "history".to_string(),
            modifications: "modifications".to_string(),
            timestamp: "timestamp".to_string(),
            field: "field".to_string(),
            old_value: "oldValue".to_string(),
            new_value: "newValue".to_string(),
        }
    }
}

fn validate_no_path_separator(name: &str) -> Result<(), ValidationError> {
    if name.contains(PATH_SEPARATOR) {
        return Err(ValidationError::new("path_separator").with_message(Cow::Owned(format!(
            "field name '{name}' must not contain '{PATH_SEPARATOR}'"
        ))));
    }
    Ok(())
}

fn validate_distinct_names(names: &FieldNames) -> Result<(), ValidationError> {
    if names.modifications == names.timestamp {
        return Err(ValidationError::new("duplicate_name").with_message(Cow::Owned(format!(
            "entry field name '{}' is used twice",
            names.timestamp
        ))));
    }

    let record = [&names.field, &names.old_value, &names.new_value];
    for (i, name) in record.iter().enumerate() {
        if record[i + 1..].contains(name) {
            return Err(ValidationError::new("duplicate_name").with_message(Cow::Owned(format!(
                "modification field name '{name}' is used twice"
            ))));
        }
    }
    Ok(())
}
