//! Layered config values.
//!
//! Each config layer is parsed into a [`serde_json::Value`] and laid over the
//! ones below it before the result is deserialized into
//! [`Config`](super::Config).

use serde_json::Value;

/// Lay `upper` over `lower` in place.
///
/// Maps combine key by key, so a layer only mentions the settings it changes.
/// `null` leaves the lower value alone; anything else replaces it.
///
/// ```
/// use serde_json::json;
/// use taskboard::config::overlay;
///
/// let mut config = json!({ "server": { "bind": "127.0.0.1", "port": 31995 } });
/// overlay(&mut config, json!({ "server": { "port": 8080 } }));
/// assert_eq!(config, json!({ "server": { "bind": "127.0.0.1", "port": 8080 } }));
/// ```
pub fn overlay(lower: &mut Value, upper: Value) {
    match (lower, upper) {
        (_, Value::Null) => {}
        (Value::Object(below), Value::Object(above)) => {
            for (key, value) in above {
                overlay(below.entry(key).or_insert(Value::Null), value);
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Stack layers bottom to top.
pub fn merge_layers(layers: impl IntoIterator<Item = Value>) -> Value {
    let mut merged = Value::Null;
    for layer in layers {
        overlay(&mut merged, layer);
    }
    merged
}
