//! Profile statistics flattening.

use serde_json::{Map, Value};

/// Flattened statistics, e.g. `movies_watched -> 42`.
pub type Stats = Map<String, Value>;

/// Flatten one level: `{"movies": {"watched": 3}}` becomes `{"movies_watched": 3}`.
///
/// Deeper objects (such as the rating distribution) are kept as values.
pub fn flatten_stats(data: &Value) -> Stats {
    let mut stats = Map::new();
    let Some(object) = data.as_object() else {
        return stats;
    };

    for (key, value) in object {
        match value {
            Value::Object(children) => {
                for (child_key, child_value) in children {
                    stats.insert(format!("{}_{}", key, child_key), child_value.clone());
                }
            }
            other => {
                stats.insert(key.clone(), other.clone());
            }
        }
    }
    stats
}
