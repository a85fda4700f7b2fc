//! Declarative endpoint configuration.
//!
//! `EndpointConfig` is the schema-free half of an endpoint: where to send
//! the request, with which method, and which headers to attach every time.
//! It deserializes from configuration files; schemas are attached in code
//! through `Endpoint::from_config` or the builder.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;
use crate::http::HttpMethod;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub url: String,
    pub method: HttpMethod,
    /// Static headers sent on every call, as `[name, value]` pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub headers: Vec<(String, String)>,
}

impl EndpointConfig {
    pub fn new(url: impl Into<String>, method: HttpMethod) -> Self {
        Self {
            url: url.into(),
            method,
            headers: Vec::new(),
        }
    }

    /// Check that the url is a non-empty absolute URL and every header is
    /// legal on the wire.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.url.trim().is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        url::Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;

        for (name, value) in &self.headers {
            let valid_name = ::http::HeaderName::from_bytes(name.as_bytes()).is_ok();
            let valid_value = ::http::HeaderValue::from_str(value).is_ok();
            if !valid_name || !valid_value {
                warn!(header = %name, "rejecting invalid static header");
                return Err(ConfigError::InvalidHeader { name: name.clone() });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_from_json() {
        let config: EndpointConfig = serde_json::from_str(
            r#"{
                "url": "http://localhost:5173/api/login",
                "method": "POST",
                "headers": [["x-api-key", "secret"]]
            }"#,
        )
        .unwrap();
        assert_eq!(config.method, HttpMethod::Post);
        assert_eq!(config.headers, vec![("x-api-key".to_string(), "secret".to_string())]);
        config.validate().unwrap();
    }

    #[test]
    fn headers_default_to_empty() {
        let config: EndpointConfig =
            serde_json::from_str(r#"{"url": "http://localhost/", "method": "GET"}"#).unwrap();
        assert!(config.headers.is_empty());
    }

    #[test]
    fn rejects_empty_url() {
        let err = EndpointConfig::new("  ", HttpMethod::Get).validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyUrl));
    }

    #[test]
    fn rejects_relative_url() {
        let err = EndpointConfig::new("/api/login", HttpMethod::Get)
            .validate()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_header_with_newline() {
        let mut config = EndpointConfig::new("http://localhost/", HttpMethod::Get);
        config.headers.push(("x-bad".to_string(), "a\r\nb".to_string()));
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHeader { ref name } if name == "x-bad"));
    }

    #[test]
    fn rejects_unknown_method() {
        let result: Result<EndpointConfig, _> =
            serde_json::from_str(r#"{"url": "http://localhost/", "method": "PATCH"}"#);
        assert!(result.is_err());
    }
}
