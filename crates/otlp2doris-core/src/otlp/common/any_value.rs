// AnyValue conversion utilities
//
// Doris stores attribute maps in VARIANT/JSON columns, so every OTLP AnyValue
// is rendered as a serde_json::Value.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use otlp2doris_proto::opentelemetry::proto::common::v1::{any_value, AnyValue, KeyValue};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};

/// Extract string value from an AnyValue, if it's a string variant
pub(crate) fn any_value_string(any_val: &AnyValue) -> Option<&str> {
    match any_val.value.as_ref()? {
        any_value::Value::StringValue(s) => Some(s.as_str()),
        _ => None,
    }
}

/// Convert OTLP AnyValue to serde_json::Value for JSON serialization
pub(crate) fn any_value_to_json_value(any_val: &AnyValue) -> JsonValue {
    match any_val.value.as_ref() {
        Some(any_value::Value::StringValue(s)) => JsonValue::String(s.clone()),
        Some(any_value::Value::BoolValue(b)) => JsonValue::Bool(*b),
        Some(any_value::Value::IntValue(i)) => JsonValue::Number(JsonNumber::from(*i)),
        Some(any_value::Value::DoubleValue(d)) => JsonNumber::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(d.to_string())),
        Some(any_value::Value::BytesValue(b)) => JsonValue::String(BASE64.encode(b)),
        Some(any_value::Value::ArrayValue(arr)) => {
            JsonValue::Array(arr.values.iter().map(any_value_to_json_value).collect())
        }
        Some(any_value::Value::KvlistValue(kv)) => JsonValue::Object(attributes_to_map(&kv.values)),
        None => JsonValue::Null,
    }
}

/// Render key-value attributes as a JSON object.
pub(crate) fn attributes_to_map(attributes: &[KeyValue]) -> JsonMap<String, JsonValue> {
    let mut map = JsonMap::new();
    for attr in attributes {
        let value = attr
            .value
            .as_ref()
            .map(any_value_to_json_value)
            .unwrap_or(JsonValue::Null);
        map.insert(attr.key.clone(), value);
    }
    map
}

/// Render an AnyValue as text: strings verbatim, everything else as JSON.
pub(crate) fn any_value_as_text(any_val: Option<&AnyValue>) -> String {
    let Some(any_val) = any_val else {
        return String::new();
    };
    match any_val.value.as_ref() {
        Some(any_value::Value::StringValue(s)) => s.clone(),
        None => String::new(),
        Some(_) => any_value_to_json_value(any_val).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use otlp2doris_proto::opentelemetry::proto::common::v1::{ArrayValue, KeyValueList};

    fn string_value(s: &str) -> AnyValue {
        AnyValue {
            value: Some(any_value::Value::StringValue(s.to_string())),
        }
    }

    fn kv(key: &str, value: AnyValue) -> KeyValue {
        KeyValue {
            key: key.to_string(),
            value: Some(value),
        }
    }

    #[test]
    fn test_scalars_to_json() {
        let int = AnyValue {
            value: Some(any_value::Value::IntValue(42)),
        };
        assert_eq!(any_value_to_json_value(&int), serde_json::json!(42));

        let nan = AnyValue {
            value: Some(any_value::Value::DoubleValue(f64::NAN)),
        };
        assert_eq!(any_value_to_json_value(&nan), serde_json::json!("NaN"));

        let bytes = AnyValue {
            value: Some(any_value::Value::BytesValue(vec![1, 2, 3])),
        };
        assert_eq!(any_value_to_json_value(&bytes), serde_json::json!("AQID"));
    }

    #[test]
    fn test_nested_values_to_json() {
        let nested = AnyValue {
            value: Some(any_value::Value::KvlistValue(KeyValueList {
                values: vec![
                    kv("name", string_value("db")),
                    kv(
                        "ports",
                        AnyValue {
                            value: Some(any_value::Value::ArrayValue(ArrayValue {
                                values: vec![
                                    AnyValue {
                                        value: Some(any_value::Value::IntValue(5432)),
                                    },
                                    AnyValue { value: None },
                                ],
                            })),
                        },
                    ),
                ],
            })),
        };

        assert_eq!(
            any_value_to_json_value(&nested),
            serde_json::json!({"name": "db", "ports": [5432, null]})
        );
    }

    #[test]
    fn test_body_text() {
        assert_eq!(any_value_as_text(None), "");
        assert_eq!(any_value_as_text(Some(&string_value("hello"))), "hello");

        let flag = AnyValue {
            value: Some(any_value::Value::BoolValue(true)),
        };
        assert_eq!(any_value_as_text(Some(&flag)), "true");
    }
}
