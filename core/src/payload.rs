//! Per-call request payloads and their body encoding.

use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::error::PayloadError;

/// Request body for a single call.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Payload {
    /// No body is sent.
    #[default]
    Empty,
    /// Sent verbatim.
    Text(String),
    /// Serialized to JSON text.
    Json(Value),
    /// Pre-encoded bytes (binary or multipart), sent verbatim.
    Opaque {
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

/// The wire form of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct EncodedBody {
    pub bytes: Option<Vec<u8>>,
    pub content_type: Option<String>,
}

impl Payload {
    /// Serialize any value into a JSON payload.
    ///
    /// Fails with `InvalidPayloadType` when the value has no JSON
    /// representation.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, PayloadError> {
        serde_json::to_value(value)
            .map(Payload::Json)
            .map_err(PayloadError::InvalidPayloadType)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Payload::Text(text.into())
    }

    pub fn opaque(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Payload::Opaque {
            content_type: Some(content_type.into()),
            bytes: bytes.into(),
        }
    }

    /// The payload as a JSON value for input-schema checks.
    ///
    /// `None` for opaque payloads, which have no JSON view.
    pub fn as_json(&self) -> Option<Cow<'_, Value>> {
        match self {
            Payload::Empty => Some(Cow::Owned(Value::Null)),
            Payload::Text(text) => Some(Cow::Owned(Value::String(text.clone()))),
            Payload::Json(value) => Some(Cow::Borrowed(value)),
            Payload::Opaque { .. } => None,
        }
    }

    pub(crate) fn encode(self) -> EncodedBody {
        match self {
            Payload::Empty => EncodedBody {
                bytes: None,
                content_type: None,
            },
            Payload::Text(text) => EncodedBody {
                bytes: Some(text.into_bytes()),
                content_type: None,
            },
            Payload::Json(value) => EncodedBody {
                bytes: Some(value.to_string().into_bytes()),
                content_type: Some("application/json".to_string()),
            },
            Payload::Opaque {
                content_type,
                bytes,
            } => EncodedBody {
                bytes: Some(bytes),
                content_type,
            },
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Payload::Empty
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Payload::Empty, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[rstest]
    #[case::empty(Payload::Empty, None, None)]
    #[case::text(Payload::text("hello"), Some("hello"), None)]
    #[case::json(Payload::Json(json!({"id": 1})), Some(r#"{"id":1}"#), Some("application/json"))]
    #[case::opaque(
        Payload::opaque("multipart/form-data; boundary=x", b"--x--".to_vec()),
        Some("--x--"),
        Some("multipart/form-data; boundary=x")
    )]
    fn encodes_each_variant(
        #[case] payload: Payload,
        #[case] body: Option<&str>,
        #[case] content_type: Option<&str>,
    ) {
        let encoded = payload.encode();
        assert_eq!(encoded.bytes.as_deref(), body.map(str::as_bytes));
        assert_eq!(encoded.content_type.as_deref(), content_type);
    }

    #[test]
    fn json_payload_round_trips() {
        #[derive(Serialize)]
        struct Login<'a> {
            username: &'a str,
            password: &'a str,
        }

        let payload = Payload::json(&Login {
            username: "patrick115",
            password: "pepa1234",
        })
        .unwrap();
        let bytes = payload.encode().bytes.unwrap();
        let decoded: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, json!({"username": "patrick115", "password": "pepa1234"}));
    }

    #[test]
    fn json_rejects_non_string_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], "value");
        let err = Payload::json(&map).unwrap_err();
        assert!(matches!(err, PayloadError::InvalidPayloadType(_)));
    }

    #[test]
    fn json_view_of_each_variant() {
        assert_eq!(Payload::Empty.as_json().unwrap().into_owned(), Value::Null);
        assert_eq!(Payload::text("x").as_json().unwrap().into_owned(), json!("x"));
        assert_eq!(Payload::Json(json!([1])).as_json().unwrap().into_owned(), json!([1]));
        assert!(Payload::opaque("application/octet-stream", vec![0u8]).as_json().is_none());
    }

    #[test]
    fn conversions() {
        assert_eq!(Payload::from(json!(1)), Payload::Json(json!(1)));
        assert_eq!(Payload::from("a"), Payload::Text("a".to_string()));
        assert_eq!(Payload::from(()), Payload::Empty);
        assert_eq!(Payload::from(None::<Value>), Payload::Empty);
    }
}
