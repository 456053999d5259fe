use serde::Serialize;
use serde_json::{Map, Value};

/// A structured key/value pair attached to a record
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    key: String,
    value: Value,
}

impl Field {
    /// Values that fail to serialize are recorded as their error text so the
    /// record itself is never lost.
    pub fn new(key: impl Into<String>, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value)
            .unwrap_or_else(|e| Value::String(format!("<unserializable: {}>", e)));
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl<K, V> From<(K, V)> for Field
where
    K: Into<String>,
    V: Serialize,
{
    fn from((key, value): (K, V)) -> Self {
        Field::new(key, value)
    }
}

/// Flatten fields into a JSON object, later keys replacing earlier ones.
pub(crate) fn to_object<'a, I>(fields: I) -> Map<String, Value>
where
    I: IntoIterator<Item = &'a Field>,
{
    let mut object = Map::new();
    for field in fields {
        object.insert(field.key.clone(), field.value.clone());
    }
    object
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Visit {
        ward: &'static str,
        bed: u32,
    }

    #[test]
    fn test_field_from_serializable() {
        let field = Field::new("visit", Visit { ward: "B", bed: 4 });
        assert_eq!(field.key(), "visit");
        assert_eq!(field.value(), &json!({"ward": "B", "bed": 4}));
    }

    #[test]
    fn test_field_from_tuple() {
        let field: Field = ("attempts", 3).into();
        assert_eq!(field, Field::new("attempts", 3));
    }

    #[test]
    fn test_object_keeps_order_and_last_value() {
        let fields = vec![
            Field::new("b", 1),
            Field::new("a", 2),
            Field::new("b", 3),
        ];
        let object = to_object(&fields);
        let keys: Vec<&String> = object.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(object["b"], 3);
    }
}
