pub mod augment;
pub mod interceptor;

pub use augment::*;
pub use interceptor::*;

use historise_api::{HistoriseConfig, HistoriseOptions, HistoriseResult, DEFAULT_UPDATED_AT_FIELD};
use std::sync::Arc;

use crate::models::schema::Schema;
use crate::repository::find_by_id::FindById;

/// Attaches change history to `schema`.
///
/// Resolves `options`, registers the history field and installs a [`ChangeInterceptor`] as a
/// pre-save hook. `reader` is the store used to fetch baselines of the model named in the
/// options; it must be the store the model saves to.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use historise_api::HistoriseOptions;
/// use historise_db::{
///     historise, FieldDef, FieldType, InMemoryDocumentStore, Model, Schema, Structure,
/// };
///
/// let store = Arc::new(InMemoryDocumentStore::new());
/// let mut schema = Schema::new(
///     Structure::new()
///         .with_field(FieldDef::new("title", FieldType::String))
///         .with_field(FieldDef::new("duration", FieldType::String)),
/// );
/// historise(&mut schema, &HistoriseOptions::new("Movie").with_limit(10), store.clone()).unwrap();
/// let movies = Model::new("Movie", schema, store);
/// assert!(movies.schema().history_config().is_some());
/// ```
///
/// # Returns
/// * `Ok(Arc<HistoriseConfig>)` - The resolved configuration, also kept on the schema
/// * `Err(HistoriseError::ConfigurationError)` - If the options are incomplete or invalid
/// * `Err(HistoriseError::SchemaError)` - If the schema already records history
pub fn historise(
    schema: &mut Schema,
    options: &HistoriseOptions,
    reader: Arc<dyn FindById>,
) -> HistoriseResult<Arc<HistoriseConfig>> {
    let updated_at = schema
        .options()
        .timestamps
        .as_ref()
        .map_or(DEFAULT_UPDATED_AT_FIELD, |timestamps| timestamps.updated_at.as_str())
        .to_string();
    let config = Arc::new(HistoriseConfig::resolve_with_updated_at(options, &updated_at)?);

    augment_schema(schema, &config)?;

    let creation = CreationMarkers::from_options(schema.options());
    schema.pre_save(Arc::new(ChangeInterceptor::new(config.clone(), reader, creation)));

    tracing::debug!(
        model = %config.model_name,
        order = ?config.order,
        limit = ?config.limit,
        "history tracking attached"
    );
    Ok(config)
}
