use crate::serializer::formatter::HtmlSafeFormatter;
use crate::{BoxError, Metadata, Payload, ReconstituteError, Timestamp};
use chrono::DateTime;
use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Number, Value};

/// `YYYY-MM-DDThh:mm:ss.ffffff±hh:mm`, never a literal `Z`.
pub(crate) const CREATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f%:z";

pub(crate) const AGGREGATE_ID_CLASS: &str = "aggregateIdClass";
pub(crate) const AGGREGATE_ID: &str = "aggregateId";
pub(crate) const AGGREGATE_VERSION: &str = "aggregateVersion";
pub(crate) const METADATA: &str = "metadata";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Envelope<'a> {
    pub class: &'a str,
    pub payload: &'a Payload,
    pub created_at: String,
    pub attributes: Attributes<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Attributes<'a> {
    pub aggregate_id_class: &'a str,
    pub aggregate_id: String,
    pub aggregate_version: u64,
    pub metadata: &'a Metadata,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub(crate) struct RawEnvelope {
    pub class: String,
    #[serde(deserialize_with = "mapping")]
    pub payload: Payload,
    pub created_at: String,
    #[serde(deserialize_with = "mapping")]
    pub attributes: Map<String, Value>,
}

impl Envelope<'_> {
    pub(crate) fn to_json(&self) -> Result<String, BoxError> {
        let mut buffer = Vec::with_capacity(256);
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, HtmlSafeFormatter);
        self.serialize(&mut serializer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

pub(crate) fn format_created_at(created_at: &Timestamp) -> String {
    created_at.format(CREATED_AT_FORMAT).to_string()
}

pub(crate) fn parse_created_at(value: &str) -> Result<Timestamp, ReconstituteError> {
    DateTime::parse_from_str(value, CREATED_AT_FORMAT).map_err(|source| {
        ReconstituteError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

/// Accepts a JSON object, or an empty array standing for an empty mapping.
pub(crate) fn mapping<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map),
        Value::Array(items) if items.is_empty() => Ok(Map::new()),
        other => Err(D::Error::invalid_type(unexpected(&other), &"a mapping")),
    }
}

/// Reads an attribute value that must be a mapping, with the same leniency
/// as [`mapping`].
pub(crate) fn mapping_value(value: Value) -> Option<Map<String, Value>> {
    match value {
        Value::Object(map) => Some(map),
        Value::Array(items) if items.is_empty() => Some(Map::new()),
        _ => None,
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

/// Rewrites every integer that fits neither `i64` nor `u64` into a string
/// holding its exact decimal digits.
pub(crate) fn stringify_big_integers(value: &mut Value) {
    match value {
        Value::Number(number) => {
            if is_big_integer(number) {
                let digits = number.to_string();
                *value = Value::String(digits);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(stringify_big_integers),
        Value::Object(map) => map.values_mut().for_each(stringify_big_integers),
        _ => {}
    }
}

fn is_big_integer(number: &Number) -> bool {
    if number.is_i64() || number.is_u64() {
        return false;
    }
    let literal = number.to_string();
    let digits = literal.strip_prefix('-').unwrap_or(&literal);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_created_at_format() {
        let created_at = DateTime::parse_from_rfc3339("2019-01-01T00:00:00Z").unwrap();
        assert_eq!(
            format_created_at(&created_at),
            "2019-01-01T00:00:00.000000+00:00"
        );

        let created_at = DateTime::parse_from_rfc3339("2020-02-29T23:59:59.123456-05:30").unwrap();
        assert_eq!(
            format_created_at(&created_at),
            "2020-02-29T23:59:59.123456-05:30"
        );
        assert_eq!(
            parse_created_at("2020-02-29T23:59:59.123456-05:30").unwrap(),
            created_at
        );
    }

    #[test]
    fn test_created_at_rejects_other_formats() {
        for value in [
            "2019-01-01",
            "2019-01-01T00:00:00+00:00",
            "2019-01-01T00:00:00.1+00:00",
            "2019-01-01T00:00:00.123456789+00:00",
            "2019-01-01T00:00:00.000000Z",
            "yesterday",
        ] {
            assert!(
                matches!(
                    parse_created_at(value),
                    Err(ReconstituteError::InvalidTimestamp { .. })
                ),
                "{value} should be rejected"
            );
        }
    }

    #[test]
    fn test_stringify_big_integers() {
        let mut value: Value = serde_json::from_str(
            r#"{"big":18446744073709551616,"neg":-9223372036854775809,"max":18446744073709551615,"min":-9223372036854775808,"float":1.5,"exp":1e10,"nested":[{"n":123456789012345678901234567890}]}"#,
        )
        .unwrap();
        stringify_big_integers(&mut value);

        assert_eq!(value["big"], json!("18446744073709551616"));
        assert_eq!(value["neg"], json!("-9223372036854775809"));
        assert_eq!(value["max"], json!(u64::MAX));
        assert_eq!(value["min"], json!(i64::MIN));
        assert!(value["float"].is_number());
        assert!(value["exp"].is_number());
        assert_eq!(value["nested"][0]["n"], json!("123456789012345678901234567890"));
    }

    #[test]
    fn test_raw_envelope_accepts_empty_array_as_mapping() {
        let envelope: RawEnvelope = serde_json::from_value(json!({
            "class": "bank.AccountOpened",
            "payload": [],
            "createdAt": "2019-01-01T00:00:00.000000+00:00",
            "attributes": {}
        }))
        .unwrap();
        assert!(envelope.payload.is_empty());
        assert!(envelope.attributes.is_empty());
    }

    #[test]
    fn test_raw_envelope_rejects_bad_shapes() {
        for value in [
            json!({"class": "a", "payload": {}, "createdAt": "x"}),
            json!({"class": "a", "payload": {}, "createdAt": "x", "attributes": {}, "extra": 1}),
            json!({"class": "a", "payload": "1234", "createdAt": "x", "attributes": {}}),
            json!({"class": "a", "payload": [1], "createdAt": "x", "attributes": {}}),
            json!({"class": 1, "payload": {}, "createdAt": "x", "attributes": {}}),
            json!({"class": "a", "payload": {}, "createdAt": null, "attributes": {}}),
        ] {
            assert!(
                serde_json::from_value::<RawEnvelope>(value.clone()).is_err(),
                "{value} should be rejected"
            );
        }
    }
}
