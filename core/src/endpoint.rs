//! A typed endpoint: one url, one method, one set of schemas.
//!
//! # Design
//! `Endpoint` holds only immutable configuration. The payload is an argument
//! of every call, so concurrent calls on one endpoint share nothing mutable.
//!
//! A call is one linear pipeline:
//!
//! 1. `build_request` checks the payload against the input schema (if any)
//!    and encodes it. A rejected payload never reaches the transport.
//! 2. The transport sends the request and returns the full body text.
//! 3. `classify` parses the text as JSON and tries the success schema, then
//!    the error schema. The error schema is only consulted when the success
//!    schema fails.
//!
//! `fetch_safe` runs the pipeline and returns the `Outcome`; `fetch` is the
//! same call collapsed into a `Result`. Like `build_*`/`parse_*` in a
//! host-does-IO client, `build_request` and `classify` are public so callers
//! can drive the transport themselves.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::EndpointConfig;
use crate::error::{ConfigError, DispatchError, EndpointError};
use crate::http::{find_header, HttpMethod, HttpRequest, HttpResponse, Transport};
use crate::outcome::Outcome;
use crate::payload::Payload;
use crate::schema::{Schema, ValidationError};
use crate::shapes::DefaultErrorSchema;

/// Type-erased input schema; its output is discarded.
trait InputSchema: Send + Sync {
    fn check(&self, value: &Value) -> Result<(), ValidationError>;
}

impl<I> InputSchema for I
where
    I: Schema + Send + Sync,
{
    fn check(&self, value: &Value) -> Result<(), ValidationError> {
        self.validate(value).map(drop)
    }
}

#[derive(Clone)]
pub struct Endpoint<S, E = DefaultErrorSchema> {
    config: EndpointConfig,
    success: S,
    error: E,
    input: Option<Arc<dyn InputSchema>>,
}

impl<S> Endpoint<S, DefaultErrorSchema> {
    /// Endpoint with the default error schema and no input schema.
    pub fn new(url: impl Into<String>, method: HttpMethod, schema: S) -> Result<Self, ConfigError> {
        Self::builder(url, method, schema).build()
    }

    pub fn from_config(config: EndpointConfig, schema: S) -> Result<Self, ConfigError> {
        EndpointBuilder {
            config,
            success: schema,
            error: DefaultErrorSchema::new(),
            input: None,
        }
        .build()
    }

    pub fn builder(url: impl Into<String>, method: HttpMethod, schema: S) -> EndpointBuilder<S> {
        EndpointBuilder {
            config: EndpointConfig::new(url, method),
            success: schema,
            error: DefaultErrorSchema::new(),
            input: None,
        }
    }
}

impl<S, E> Endpoint<S, E> {
    pub fn url(&self) -> &str {
        &self.config.url
    }

    pub fn method(&self) -> HttpMethod {
        self.config.method
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.config.headers
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }
}

impl<S, E> Endpoint<S, E>
where
    S: Schema,
    E: Schema,
{
    /// Check `payload` against the input schema and encode the request.
    ///
    /// Static headers come first; the content type required by the body is
    /// appended only when no static `content-type` header is configured.
    pub fn build_request(&self, payload: Payload) -> Result<HttpRequest, ValidationError> {
        if let Some(input) = &self.input {
            let value = payload.as_json().ok_or_else(|| {
                ValidationError::single("", "opaque payloads cannot be checked against an input schema")
            })?;
            input.check(&value)?;
        }

        let encoded = payload.encode();
        let mut headers = self.config.headers.clone();
        if let Some(content_type) = encoded.content_type {
            if find_header(&headers, "content-type").is_none() {
                headers.push(("content-type".to_string(), content_type));
            }
        }

        Ok(HttpRequest {
            method: self.config.method,
            url: self.config.url.clone(),
            headers,
            body: encoded.bytes,
        })
    }

    /// Classify a response body against the success and error schemas.
    ///
    /// The status code is not consulted: a 500 carrying a success-shaped
    /// body is a `Success`.
    pub fn classify(&self, response: HttpResponse) -> Outcome<S::Output, E::Output> {
        let parsed = serde_json::from_str::<Value>(&response.body);
        let json = match parsed {
            Ok(json) => json,
            Err(source) => {
                warn!(status = response.status, error = %source, "response body is not JSON");
                return Outcome::TransportFailure(DispatchError::InvalidJson {
                    source,
                    text: response.body,
                });
            }
        };

        match self.success.validate(&json) {
            Ok(data) => {
                debug!(status = response.status, "response matched success schema");
                return Outcome::Success(data);
            }
            Err(err) => debug!(error = %err, "response does not match success schema"),
        }

        match self.error.validate(&json) {
            Ok(data) => {
                debug!(status = response.status, "response matched error schema");
                Outcome::RecognizedError(data)
            }
            Err(err) => {
                warn!(status = response.status, error = %err, "response matched neither schema");
                Outcome::UnrecognizedError(json)
            }
        }
    }

    /// Run one call and return its full outcome.
    #[instrument(skip_all, fields(method = %self.config.method, url = %self.config.url))]
    pub fn fetch_safe<T>(&self, transport: &T, payload: impl Into<Payload>) -> Outcome<S::Output, E::Output>
    where
        T: Transport + ?Sized,
    {
        let request = match self.build_request(payload.into()) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "payload rejected by input schema, nothing sent");
                return Outcome::InputValidationFailure(err);
            }
        };

        debug!(?request.headers, "sending...");
        let response = match transport.send(&request) {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "transport failed");
                return Outcome::TransportFailure(DispatchError::Transport(err));
            }
        };
        debug!(status = response.status, "...receiving");

        self.classify(response)
    }

    /// Run one call; anything but a success-schema match is an error.
    pub fn fetch<T>(&self, transport: &T, payload: impl Into<Payload>) -> Result<S::Output, EndpointError<E::Output>>
    where
        T: Transport + ?Sized,
    {
        self.fetch_safe(transport, payload).into_result()
    }
}

impl<S, E> fmt::Debug for Endpoint<S, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("method", &self.config.method)
            .field("url", &self.config.url)
            .field("headers", &self.config.headers)
            .field("input_schema", &self.input.is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for `Endpoint`; validation happens in `build`.
pub struct EndpointBuilder<S, E = DefaultErrorSchema> {
    config: EndpointConfig,
    success: S,
    error: E,
    input: Option<Arc<dyn InputSchema>>,
}

impl<S, E> EndpointBuilder<S, E> {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.headers.push((name.into(), value.into()));
        self
    }

    pub fn headers<I, K, V>(mut self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.config
            .headers
            .extend(headers.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Validate every outgoing payload with `schema` before dispatch.
    pub fn input_schema<I>(mut self, schema: I) -> Self
    where
        I: Schema + Send + Sync + 'static,
    {
        self.input = Some(Arc::new(schema));
        self
    }

    /// Replace the default `{status: false, error}` error schema.
    pub fn error_schema<E2: Schema>(self, schema: E2) -> EndpointBuilder<S, E2> {
        EndpointBuilder {
            config: self.config,
            success: self.success,
            error: schema,
            input: self.input,
        }
    }

    pub fn build(self) -> Result<Endpoint<S, E>, ConfigError> {
        self.config.validate()?;
        Ok(Endpoint {
            config: self.config,
            success: self.success,
            error: self.error,
            input: self.input,
        })
    }
}
