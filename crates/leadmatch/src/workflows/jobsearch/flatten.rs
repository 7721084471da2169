use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Keys tried, in order, when rendering an object nested inside an array.
const LABEL_KEYS: [&str; 3] = ["label", "name", "value"];

/// Flattens one search hit into dotted-path columns. Nulls are dropped,
/// scalar arrays are joined with `", "`.
pub fn flatten_hit(hit: &Value) -> BTreeMap<String, String> {
    let mut columns = BTreeMap::new();
    match hit {
        Value::Object(object) => flatten_object(object, None, &mut columns),
        Value::Null => {}
        other => {
            if let Some(text) = render_value(other) {
                columns.insert("value".to_string(), text);
            }
        }
    }
    columns
}

fn flatten_object(object: &Map<String, Value>, prefix: Option<&str>, columns: &mut BTreeMap<String, String>) {
    for (key, value) in object {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };

        match value {
            Value::Object(nested) => flatten_object(nested, Some(&path), columns),
            other => {
                if let Some(text) = render_value(other) {
                    columns.insert(path, text);
                }
            }
        }
    }
}

fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(render_item).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join(", "))
            }
        }
        Value::Object(_) => Some(value.to_string()),
    }
}

fn render_item(item: &Value) -> Option<String> {
    match item {
        Value::Object(object) => LABEL_KEYS
            .iter()
            .find_map(|key| object.get(*key).and_then(|value| value.as_str()))
            .map(str::to_string)
            .or_else(|| Some(item.to_string())),
        Value::Array(_) => Some(item.to_string()),
        other => render_value(other),
    }
}
