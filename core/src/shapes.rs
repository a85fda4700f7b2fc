//! Common response shapes: the `{status, data}` success envelope and the
//! default `{status: false, error}` error body.

use std::fmt;

use serde::de::{self, DeserializeOwned, Deserializer, Unexpected};
use serde::{Deserialize, Serialize, Serializer};

use crate::schema::{Map, SchemaExt, Typed, ValidationError};

/// A boolean that only deserializes from the literal `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Flag<const B: bool>;

impl<const B: bool> Serialize for Flag<B> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(B)
    }
}

impl<'de, const B: bool> Deserialize<'de> for Flag<B> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = bool::deserialize(deserializer)?;
        if value == B {
            Ok(Flag)
        } else {
            let expected = if B { "the literal `true`" } else { "the literal `false`" };
            Err(de::Error::invalid_value(Unexpected::Bool(value), &expected))
        }
    }
}

/// Success envelope `{"status": true, "data": T}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: Flag<true>,
    pub data: T,
}

pub type EnvelopeSchema<T> = Map<Typed<Envelope<T>>, fn(Envelope<T>) -> T>;

/// Schema for `{"status": true, "data": T}` that yields the inner `T`.
pub fn envelope<T: DeserializeOwned>() -> EnvelopeSchema<T> {
    fn unwrap<T>(envelope: Envelope<T>) -> T {
        envelope.data
    }
    Typed::<Envelope<T>>::new().map(unwrap::<T> as fn(Envelope<T>) -> T)
}

/// The error shape recognized when no error schema is configured:
/// `{"status": false, "error": string | validation-error}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: Flag<false>,
    pub error: ErrorDetail,
}

impl ErrorBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Flag,
            error: ErrorDetail::Message(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Validation(ValidationError),
}

impl fmt::Display for ErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorDetail::Message(message) => f.write_str(message),
            ErrorDetail::Validation(err) => fmt::Display::fmt(err, f),
        }
    }
}

pub type DefaultErrorSchema = Typed<ErrorBody>;
