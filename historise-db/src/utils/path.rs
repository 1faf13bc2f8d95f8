//! Dotted field-path access over JSON document bodies.
//!
//! A path such as `cast.0.name` walks objects by key and arrays by numeric index.

use historise_api::PATH_SEPARATOR;
use serde_json::{Map, Value};

/// Resolves `path` against a document body, returning `None` when any segment is missing.
pub fn get_path<'a>(root: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let mut segments = path.split(PATH_SEPARATOR);
    let mut current = root.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Mutable counterpart of [`get_path`].
pub fn get_path_mut<'a>(root: &'a mut Map<String, Value>, path: &str) -> Option<&'a mut Value> {
    let mut segments = path.split(PATH_SEPARATOR);
    let mut current = root.get_mut(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => items.get_mut(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Writes `value` at `path`, creating intermediate objects where needed.
///
/// Array segments must address an existing element, except for the last segment which may
/// also equal the array length to append.
pub fn set_path(root: &mut Map<String, Value>, path: &str, value: Value) -> Result<(), String> {
    let Some((parent, key)) = path.rsplit_once(PATH_SEPARATOR) else {
        root.insert(path.to_string(), value);
        return Ok(());
    };

    let mut segments = parent.split(PATH_SEPARATOR);
    let first = segments.next().unwrap_or(parent);
    let mut current = root
        .entry(first.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    for segment in segments {
        current = step_or_create(current, segment, path)?;
    }

    match current {
        Value::Object(map) => {
            map.insert(key.to_string(), value);
            Ok(())
        }
        Value::Array(items) => match key.parse::<usize>() {
            Ok(index) if index < items.len() => {
                items[index] = value;
                Ok(())
            }
            Ok(index) if index == items.len() => {
                items.push(value);
                Ok(())
            }
            _ => Err(format!("cannot set '{path}': '{key}' is not a valid array index")),
        },
        Value::Null => {
            let mut map = Map::new();
            map.insert(key.to_string(), value);
            *current = Value::Object(map);
            Ok(())
        }
        _ => Err(format!("cannot set '{path}': '{parent}' is not an object")),
    }
}

fn step_or_create<'a>(
    current: &'a mut Value,
    segment: &str,
    path: &str,
) -> Result<&'a mut Value, String> {
    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => Ok(map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()))),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get_mut(index))
            .ok_or_else(|| format!("cannot set '{path}': '{segment}' is not a valid array index")),
        _ => Err(format!("cannot set '{path}': '{segment}' has a scalar parent")),
    }
}

/// Removes the value at `path` from its parent object, returning it.
pub fn remove_path(root: &mut Map<String, Value>, path: &str) -> Option<Value> {
    match path.rsplit_once(PATH_SEPARATOR) {
        None => root.remove(path),
        Some((parent, key)) => match get_path_mut(root, parent)? {
            Value::Object(map) => map.remove(key),
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn movie() -> Map<String, Value> {
        match json!({
            "title": "A",
            "cast": ["Daniel", "Rupert"],
            "meta": { "studio": { "name": "WB" } }
        }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_get_path() {
        let doc = movie();
        assert_eq!(get_path(&doc, "title"), Some(&json!("A")));
        assert_eq!(get_path(&doc, "cast.1"), Some(&json!("Rupert")));
        assert_eq!(get_path(&doc, "meta.studio.name"), Some(&json!("WB")));
        assert_eq!(get_path(&doc, "meta.studio.city"), None);
        assert_eq!(get_path(&doc, "cast.7"), None);
        assert_eq!(get_path(&doc, "title.length"), None);
        assert_eq!(get_path(&doc, "missing"), None);
    }

    #[test]
    fn test_set_path_creates_intermediate_objects() {
        let mut doc = movie();
        set_path(&mut doc, "meta.rating.imdb", json!(7.6)).unwrap();
        assert_eq!(get_path(&doc, "meta.rating.imdb"), Some(&json!(7.6)));
        assert_eq!(get_path(&doc, "meta.studio.name"), Some(&json!("WB")));
    }

    #[test]
    fn test_set_path_on_arrays() {
        let mut doc = movie();
        set_path(&mut doc, "cast.0", json!("Emma")).unwrap();
        set_path(&mut doc, "cast.2", json!("Maggie")).unwrap();
        assert_eq!(doc["cast"], json!(["Emma", "Rupert", "Maggie"]));

        assert!(set_path(&mut doc, "cast.9", json!("Alan")).is_err());
    }

    #[test]
    fn test_set_path_through_scalar_fails() {
        let mut doc = movie();
        assert!(set_path(&mut doc, "title.main", json!("B")).is_err());
    }

    #[test]
    fn test_remove_path() {
        let mut doc = movie();
        assert_eq!(remove_path(&mut doc, "meta.studio.name"), Some(json!("WB")));
        assert_eq!(get_path(&doc, "meta.studio"), Some(&json!({})));
        assert_eq!(remove_path(&mut doc, "title"), Some(json!("A")));
        assert_eq!(remove_path(&mut doc, "title"), None);
    }
}
