//! The classified result of one endpoint call.

use serde_json::Value;

use crate::error::{DispatchError, EndpointError};
use crate::schema::ValidationError;

/// Exactly one of these is produced per call.
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// The response matched the success schema.
    Success(T),
    /// The response failed the success schema and matched the error schema.
    RecognizedError(E),
    /// The response was JSON but matched neither schema.
    UnrecognizedError(Value),
    /// The request failed or the body was not JSON.
    TransportFailure(DispatchError),
    /// The payload failed the input schema; no request was sent.
    InputValidationFailure(ValidationError),
}

impl<T, E> Outcome<T, E> {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Whether a request reached the transport.
    pub fn was_dispatched(&self) -> bool {
        !matches!(self, Outcome::InputValidationFailure(_))
    }

    pub fn success(self) -> Option<T> {
        match self {
            Outcome::Success(data) => Some(data),
            _ => None,
        }
    }

    pub fn recognized_error(self) -> Option<E> {
        match self {
            Outcome::RecognizedError(data) => Some(data),
            _ => None,
        }
    }

    /// Collapse into the throwing call mode's result.
    pub fn into_result(self) -> Result<T, EndpointError<E>> {
        match self {
            Outcome::Success(data) => Ok(data),
            Outcome::RecognizedError(data) => Err(EndpointError::Rejected(data)),
            Outcome::UnrecognizedError(raw) => Err(EndpointError::Unrecognized(raw)),
            Outcome::TransportFailure(err) => Err(EndpointError::Dispatch(err)),
            Outcome::InputValidationFailure(err) => Err(EndpointError::InvalidInput(err)),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U, E> {
        match self {
            Outcome::Success(data) => Outcome::Success(f(data)),
            Outcome::RecognizedError(data) => Outcome::RecognizedError(data),
            Outcome::UnrecognizedError(raw) => Outcome::UnrecognizedError(raw),
            Outcome::TransportFailure(err) => Outcome::TransportFailure(err),
            Outcome::InputValidationFailure(err) => Outcome::InputValidationFailure(err),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, EndpointError<E>> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
