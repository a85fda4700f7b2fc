//! Blocking `Transport` backed by ureq.

use std::fmt;

use tracing::debug;
use ureq::{Agent, RequestBuilder};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Sends each `HttpRequest` with a ureq `Agent`.
///
/// The agent is configured so 4xx/5xx responses come back as data rather
/// than `Err`; the endpoint classifies bodies regardless of status.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It should have `http_status_as_error`
    /// disabled, otherwise error statuses surface as transport failures.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => send_without_body(with_headers(self.agent.get(url), request), body),
            HttpMethod::Delete => send_without_body(with_headers(self.agent.delete(url), request), body),
            HttpMethod::Post => send_with_body(with_headers(self.agent.post(url), request), body),
            HttpMethod::Put => send_with_body(with_headers(self.agent.put(url), request), body),
        };
        let mut response = result.map_err(|err| TransportError::Request(Box::new(err)))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // No size cap, and invalid UTF-8 is replaced so the text still reaches
        // classification.
        let bytes = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|err| TransportError::Body(Box::new(err)))?;
        debug!(status, bytes = bytes.len(), "response body read");
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_without_body(
    builder: RequestBuilder<ureq::typestate::WithoutBody>,
    body: Option<&[u8]>,
) -> Result<::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.force_send_body().send(bytes),
        None => builder.call(),
    }
}

fn send_with_body(
    builder: RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&[u8]>,
) -> Result<::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}
