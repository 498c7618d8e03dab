//! Attribute values shared by entity configurations and custom events.
//!
//! Attribute values are plain JSON values so any `serde` data format can feed
//! them in, and component constructors can deserialize straight out of them.

use indexmap::IndexMap;

pub use serde_json::Value;

/// Named attributes in insertion order.
pub type AttributeMap = IndexMap<String, Value>;

/// Converts an attribute map into a JSON object, preserving attribute order.
#[must_use]
pub fn to_object(attributes: &AttributeMap) -> Value {
    Value::Object(
        attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn to_object_keeps_every_attribute() {
        let mut attributes = AttributeMap::new();
        attributes.insert("x".into(), 42.into());
        attributes.insert("name".into(), "door".into());

        assert_eq!(to_object(&attributes), json!({"x": 42, "name": "door"}));
    }

    #[test]
    fn to_object_of_empty_map_is_empty_object() {
        assert_eq!(to_object(&AttributeMap::new()), json!({}));
    }
}
