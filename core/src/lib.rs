//! Typed HTTP endpoints with schema-classified responses.
//!
//! # Overview
//! An `Endpoint` is bound to one url, one method and a success schema. Each
//! call sends exactly one request and classifies the JSON response into an
//! `Outcome`: success-schema match, recognized error (error-schema match),
//! unrecognized JSON, transport/parse failure, or a payload rejected by the
//! input schema before anything was sent.
//!
//! # Design
//! - `Endpoint` is immutable; the payload is a call argument, never stored.
//! - The pipeline is split into `build_request` (payload in, `HttpRequest`
//!   out) and `classify` (`HttpResponse` in, `Outcome` out) around a
//!   `Transport`, so the classification logic is testable without a network.
//! - `fetch_safe` returns the `Outcome`; `fetch` collapses it into a `Result`.
//! - Schemas are a trait: serde types (`Typed<T>`), JSON Schema documents
//!   (`JsonSchema`), and combinators over both.
//!
//! ```no_run
//! use serde::Deserialize;
//! use serde_json::json;
//! use typed_endpoint::{envelope, Endpoint, HttpMethod, Outcome, UreqTransport};
//!
//! #[derive(Debug, Deserialize)]
//! struct User {
//!     id: u32,
//!     username: String,
//! }
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let login = Endpoint::new("http://localhost:5173/api/login", HttpMethod::Post, envelope::<User>())?;
//! let transport = UreqTransport::new();
//!
//! match login.fetch_safe(&transport, json!({"username": "patrick115", "password": "pepa1234"})) {
//!     Outcome::Success(user) => println!("logged in as {} ({})", user.username, user.id),
//!     Outcome::RecognizedError(body) => println!("login refused: {}", body.error),
//!     other => println!("login failed: {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod outcome;
pub mod payload;
pub mod schema;
pub mod shapes;
#[cfg(feature = "ureq")]
pub mod transport;

pub use config::EndpointConfig;
pub use endpoint::{Endpoint, EndpointBuilder};
pub use error::{ConfigError, DispatchError, EndpointError, PayloadError, TransportError};
pub use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use outcome::Outcome;
pub use payload::Payload;
pub use schema::{Issue, JsonSchema, Schema, SchemaExt, Typed, ValidationError};
pub use shapes::{envelope, DefaultErrorSchema, Envelope, EnvelopeSchema, ErrorBody, ErrorDetail, Flag};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
