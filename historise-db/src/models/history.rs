use chrono::{DateTime, SecondsFormat, Utc};
use historise_api::{FieldNames, HistoriseError, HistoriseResult, HistoryOrder};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::num::NonZeroUsize;

/// One changed field within a history entry.
///
/// `old_value` is `None` when the baseline had no value at `field`, `new_value` is `None`
/// when the field was unset by the save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldModification {
    pub field: String,
    pub old_value: Option<Value>,
    pub new_value: Option<Value>,
}

impl FieldModification {
    pub fn new(
        field: impl Into<String>,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        Self {
            field: field.into(),
            old_value,
            new_value,
        }
    }

    /// Serializes the modification under the configured names. Absent values are omitted.
    pub fn to_value(&self, names: &FieldNames) -> Value {
        let mut record = Map::new();
        record.insert(names.field.clone(), Value::String(self.field.clone()));
        if let Some(old_value) = &self.old_value {
            record.insert(names.old_value.clone(), old_value.clone());
        }
        if let Some(new_value) = &self.new_value {
            record.insert(names.new_value.clone(), new_value.clone());
        }
        Value::Object(record)
    }

    pub fn from_value(value: &Value, names: &FieldNames) -> HistoriseResult<Self> {
        let record = value.as_object().ok_or_else(|| malformed("modification is not an object"))?;
        let field = record
            .get(&names.field)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(&format!("modification has no '{}' string", names.field)))?;

        Ok(Self {
            field: field.to_string(),
            old_value: record.get(&names.old_value).cloned(),
            new_value: record.get(&names.new_value).cloned(),
        })
    }
}

/// One save's worth of field modifications. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    modifications: Vec<FieldModification>,
}

impl HistoryEntry {
    /// Builds an entry, or `None` when there is nothing to record.
    pub fn new(timestamp: DateTime<Utc>, modifications: Vec<FieldModification>) -> Option<Self> {
        if modifications.is_empty() {
            return None;
        }
        Some(Self {
            timestamp,
            modifications,
        })
    }

    pub fn modifications(&self) -> &[FieldModification] {
        &self.modifications
    }

    pub fn to_value(&self, names: &FieldNames) -> Value {
        let mut record = Map::new();
        record.insert(
            names.modifications.clone(),
            Value::Array(
                self.modifications
                    .iter()
                    .map(|modification| modification.to_value(names))
                    .collect(),
            ),
        );
        record.insert(
            names.timestamp.clone(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        );
        Value::Object(record)
    }

    pub fn from_value(value: &Value, names: &FieldNames) -> HistoriseResult<Self> {
        let record = value.as_object().ok_or_else(|| malformed("entry is not an object"))?;

        let timestamp = record
            .get(&names.timestamp)
            .and_then(Value::as_str)
            .ok_or_else(|| malformed(&format!("entry has no '{}' string", names.timestamp)))?;
        let timestamp = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|e| malformed(&format!("invalid entry timestamp '{timestamp}': {e}")))?
            .with_timezone(&Utc);

        let modifications = record
            .get(&names.modifications)
            .and_then(Value::as_array)
            .ok_or_else(|| malformed(&format!("entry has no '{}' list", names.modifications)))?
            .iter()
            .map(|modification| FieldModification::from_value(modification, names))
            .collect::<HistoriseResult<Vec<_>>>()?;

        Self::new(timestamp, modifications)
            .ok_or_else(|| malformed("entry without modifications"))
    }
}

/// The ordered list of entries embedded in a document.
///
/// The order is fixed by [`HistoryOrder`]; whichever the order, [`HistoryLog::record`] keeps
/// only the most recently created entries when a limit applies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The most recently recorded entry for a log kept in `order`.
    pub fn newest(&self, order: HistoryOrder) -> Option<&HistoryEntry> {
        match order {
            HistoryOrder::Chronological => self.entries.last(),
            HistoryOrder::ReverseChronological => self.entries.first(),
        }
    }

    /// Inserts `entry` as the newest entry and enforces the retention limit.
    pub fn record(
        &mut self,
        entry: HistoryEntry,
        order: HistoryOrder,
        limit: Option<NonZeroUsize>,
    ) {
        match order {
            HistoryOrder::Chronological => self.entries.push(entry),
            HistoryOrder::ReverseChronological => self.entries.insert(0, entry),
        }
        self.truncate(order, limit);
    }

    /// Drops the oldest entries beyond `limit` and returns how many were dropped.
    pub fn truncate(&mut self, order: HistoryOrder, limit: Option<NonZeroUsize>) -> usize {
        let Some(limit) = limit else {
            return 0;
        };
        let excess = self.entries.len().saturating_sub(limit.get());
        match order {
            HistoryOrder::Chronological => {
                self.entries.drain(..excess);
            }
            HistoryOrder::ReverseChronological => self.entries.truncate(limit.get()),
        }
        excess
    }

    /// Parses a stored history value. An absent or null value is an empty log.
    pub fn from_value(value: Option<&Value>, names: &FieldNames) -> HistoriseResult<Self> {
        let entries = match value {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| HistoryEntry::from_value(item, names))
                .collect::<HistoriseResult<Vec<_>>>()?,
            Some(_) => {
                return Err(malformed(&format!("'{}' is not a list", names.history)));
            }
        };
        Ok(Self { entries })
    }

    pub fn to_value(&self, names: &FieldNames) -> Value {
        Value::Array(self.entries.iter().map(|entry| entry.to_value(names)).collect())
    }
}

fn malformed(reason: &str) -> HistoriseError {
    HistoriseError::ValidationError(format!("malformed history: {reason}"))
}
