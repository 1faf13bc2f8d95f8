use historise_api::{HistoriseConfig, HistoriseError, HistoriseResult};
use std::sync::Arc;

use crate::models::schema::{FieldDef, FieldDefault, FieldType, Schema, Structure};

/// Record describing one field modification, under the configured names
pub fn modification_structure(config: &HistoriseConfig) -> Structure {
    let names = &config.field_names;
    Structure::new()
        .with_field(FieldDef::new(names.field.clone(), FieldType::String))
        .with_field(FieldDef::new(names.old_value.clone(), FieldType::Mixed))
        .with_field(FieldDef::new(names.new_value.clone(), FieldType::Mixed))
}

/// Record describing one history entry, under the configured names
pub fn entry_structure(config: &HistoriseConfig) -> Structure {
    let names = &config.field_names;
    Structure::new()
        .with_field(FieldDef::new(
            names.modifications.clone(),
            FieldType::Array(Box::new(FieldType::Embedded(modification_structure(config)))),
        ))
        .with_field(
            FieldDef::new(names.timestamp.clone(), FieldType::Date).with_default(FieldDefault::Now),
        )
}

/// Registers the history log field on `schema`.
///
/// The log is a list of entry records defaulting to an empty list, so every document of the
/// schema carries a list even before its first update.
///
/// # Returns
/// * `Ok(())` - The schema now carries the history field
/// * `Err(HistoriseError::SchemaError)` - If the schema was already augmented or already
///   defines a field under the history name
pub fn augment_schema(schema: &mut Schema, config: &Arc<HistoriseConfig>) -> HistoriseResult<()> {
    if let Some(existing) = schema.history_config() {
        return Err(HistoriseError::SchemaError(format!(
            "schema already records history in '{}'",
            existing.field_names.history
        )));
    }

    schema.add(
        FieldDef::new(
            config.field_names.history.clone(),
            FieldType::Array(Box::new(FieldType::Embedded(entry_structure(config)))),
        )
        .with_default(FieldDefault::EmptyArray),
    )?;
    schema.set_history_config(config.clone());

    tracing::debug!(
        model = %config.model_name,
        field = %config.field_names.history,
        "history field registered on schema"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::Document;
    use historise_api::{FieldNameOptions, HistoriseOptions};
    use serde_json::{json, Map};

    fn french_config() -> Arc<HistoriseConfig> {
        let options = HistoriseOptions::new("Movie").with_field_names(FieldNameOptions {
            history: Some("historique".to_string()),
            modifications: Some("amendements".to_string()),
            timestamp: Some("horodatage".to_string()),
            field: Some("champ".to_string()),
            old_value: Some("ancienneValeur".to_string()),
            new_value: Some("nouvelleValeur".to_string()),
        });
        Arc::new(HistoriseConfig::resolve(&options).unwrap())
    }

    #[test]
    fn test_augment_registers_renamed_structures() {
        let config = french_config();
        let mut schema = Schema::new(Structure::new());
        augment_schema(&mut schema, &config).unwrap();

        let history = schema.structure().field("historique").unwrap();
        assert_eq!(history.default, Some(FieldDefault::EmptyArray));

        let FieldType::Array(item) = &history.field_type else {
            panic!("history must be an array");
        };
        let FieldType::Embedded(entry) = item.as_ref() else {
            panic!("history items must be embedded records");
        };
        let names: Vec<_> = entry.fields().iter().map(|def| def.name.as_str()).collect();
        assert_eq!(names, ["amendements", "horodatage"]);
        assert_eq!(entry.field("horodatage").unwrap().default, Some(FieldDefault::Now));

        let modification = modification_structure(&config);
        let names: Vec<_> = modification.fields().iter().map(|def| def.name.as_str()).collect();
        assert_eq!(names, ["champ", "ancienneValeur", "nouvelleValeur"]);
        assert!(schema.structure().field("history").is_none());
    }

    #[test]
    fn test_augment_twice_is_rejected() {
        let config = french_config();
        let mut schema = Schema::new(Structure::new());
        augment_schema(&mut schema, &config).unwrap();

        let result = augment_schema(&mut schema, &config);
        assert!(matches!(result, Err(HistoriseError::SchemaError(_))));
        assert_eq!(schema.structure().fields().len(), 1);
    }

    #[test]
    fn test_augment_rejects_clashing_field() {
        let config = french_config();
        let mut schema = Schema::new(
            Structure::new().with_field(FieldDef::new("historique", FieldType::String)),
        );
        let result = augment_schema(&mut schema, &config);
        assert!(matches!(result, Err(HistoriseError::SchemaError(_))));
        assert!(schema.history_config().is_none());
    }

    #[test]
    fn test_defaults_create_empty_log_and_entry_timestamps() {
        let config = french_config();
        let mut schema = Schema::new(Structure::new());
        augment_schema(&mut schema, &config).unwrap();

        let mut doc = Document::new(Map::new());
        schema.apply_defaults(&mut doc);
        assert_eq!(doc.get("historique"), Some(&json!([])));

        let mut doc = Document::new(match json!({
            "historique": [{ "amendements": [{ "champ": "title" }] }]
        }) {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        });
        schema.apply_defaults(&mut doc);
        assert!(doc.get("historique.0.horodatage").is_some_and(|ts| ts.is_string()));
    }
}
