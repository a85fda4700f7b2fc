//! Error types for endpoint construction and calls.
//!
//! # Design
//! Schema failures (`ValidationError`) live with the schemas because the
//! default error shape embeds them. Everything here is about the plumbing
//! around a call: building the endpoint, building the payload, moving bytes,
//! and the collapsed error of the throwing call mode.

use serde_json::Value;

use crate::schema::ValidationError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors raised while building an `Endpoint`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("endpoint url must not be empty")]
    EmptyUrl,

    #[error("invalid endpoint url `{url}`: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported HTTP method `{0}`")]
    UnsupportedMethod(String),

    #[error("invalid header `{name}`")]
    InvalidHeader { name: String },

    #[error("invalid JSON schema: {0}")]
    InvalidSchema(String),
}

/// Errors raised while turning a value into a request payload.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// The value has no JSON representation (e.g. a map with non-string keys).
    #[error("payload has no JSON representation: {0}")]
    InvalidPayloadType(#[source] serde_json::Error),
}

/// Failures reported by a `Transport` implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received.
    #[error("request failed: {0}")]
    Request(#[source] BoxError),

    /// A response arrived but its body could not be read as text.
    #[error("could not read response body: {0}")]
    Body(#[source] BoxError),
}

/// The request never produced a JSON document to classify.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("response is not valid JSON: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        text: String,
    },
}

impl DispatchError {
    /// Raw response text, only available when the body failed to parse.
    pub fn raw_text(&self) -> Option<&str> {
        match self {
            DispatchError::InvalidJson { text, .. } => Some(text),
            DispatchError::Transport(_) => None,
        }
    }
}

/// Error of the throwing call mode (`Endpoint::fetch`).
#[derive(Debug, thiserror::Error)]
pub enum EndpointError<E> {
    /// The payload failed the input schema; nothing was sent.
    #[error("request payload rejected: {0}")]
    InvalidInput(ValidationError),

    #[error(transparent)]
    Dispatch(DispatchError),

    /// The response matched the error schema.
    #[error("server returned an error response: {0:?}")]
    Rejected(E),

    /// The response matched neither schema.
    #[error("unrecognized response: {0}")]
    Unrecognized(Value),
}
