//! Validators for request payloads and response bodies.
//!
//! # Design
//! A `Schema` checks a parsed JSON value and, on success, produces a typed
//! output. Two engines are provided: `Typed<T>` uses serde deserialization
//! as the schema (the output is the coerced `T`), `JsonSchema` runs a JSON
//! Schema document and hands back the value unchanged. Combinators in
//! `SchemaExt` compose either kind.
//!
//! Failures are reported as a `ValidationError`, a list of issues that
//! serializes to `{"issues":[{"path":..,"message":..}]}`. That is the same
//! shape the default error schema accepts, so a server echoing client-side
//! validation errors is recognized.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// A single validation failure at a location inside the checked value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Dotted path to the offending value; empty for the root.
    #[serde(default)]
    pub path: String,
    pub message: String,
}

impl Issue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        let path = path.into();
        // serde_path_to_error renders the root as "."
        let path = if path == "." { String::new() } else { path };
        Self {
            path,
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// A value did not satisfy a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<Issue>,
}

impl ValidationError {
    pub fn new(issues: Vec<Issue>) -> Self {
        Self { issues }
    }

    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![Issue::new(path, message)],
        }
    }

    fn merge(mut self, other: ValidationError) -> Self {
        self.issues.extend(other.issues);
        self
    }
}

fn join_issues(issues: &[Issue]) -> String {
    if issues.is_empty() {
        return "validation failed".to_string();
    }
    issues
        .iter()
        .map(Issue::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validator abstraction: check a JSON value, produce typed data.
pub trait Schema {
    type Output;

    fn validate(&self, value: &Value) -> Result<Self::Output, ValidationError>;
}

impl<S: Schema + ?Sized> Schema for &S {
    type Output = S::Output;

    fn validate(&self, value: &Value) -> Result<Self::Output, ValidationError> {
        (**self).validate(value)
    }
}

impl<S: Schema + ?Sized> Schema for Box<S> {
    type Output = S::Output;

    fn validate(&self, value: &Value) -> Result<Self::Output, ValidationError> {
        (**self).validate(value)
    }
}

impl<S: Schema + ?Sized> Schema for Arc<S> {
    type Output = S::Output;

    fn validate(&self, value: &Value) -> Result<Self::Output, ValidationError> {
        (**self).validate(value)
    }
}

/// Serde deserialization used as a schema.
///
/// Any `T: DeserializeOwned` is accepted; unknown fields are ignored unless
/// `T` says otherwise (`#[serde(deny_unknown_fields)]`). Issue paths come
/// from `serde_path_to_error`, e.g. `data.id`.
pub struct Typed<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> Typed<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for Typed<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Typed<T> {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl<T> Copy for Typed<T> {}

impl<T> fmt::Debug for Typed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Typed<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned> Schema for Typed<T> {
    type Output = T;

    fn validate(&self, value: &Value) -> Result<T, ValidationError> {
        serde_path_to_error::deserialize(value).map_err(|err| {
            let path = err.path().to_string();
            ValidationError::single(path, err.into_inner().to_string())
        })
    }
}

/// A compiled JSON Schema document.
#[derive(Clone)]
pub struct JsonSchema {
    validator: Arc<jsonschema::Validator>,
}

impl JsonSchema {
    pub fn new(schema: &Value) -> Result<Self, ConfigError> {
        let validator =
            jsonschema::validator_for(schema).map_err(|err| ConfigError::InvalidSchema(err.to_string()))?;
        Ok(Self {
            validator: Arc::new(validator),
        })
    }
}

impl fmt::Debug for JsonSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchema").finish_non_exhaustive()
    }
}

impl Schema for JsonSchema {
    type Output = Value;

    fn validate(&self, value: &Value) -> Result<Value, ValidationError> {
        let issues: Vec<Issue> = self
            .validator
            .iter_errors(value)
            .map(|err| Issue::new(String::new(), err.to_string()))
            .collect();
        if issues.is_empty() {
            Ok(value.clone())
        } else {
            Err(ValidationError::new(issues))
        }
    }
}

/// Combinators available on every schema.
pub trait SchemaExt: Schema + Sized {
    /// Transform the validated output.
    fn map<F, O>(self, f: F) -> Map<Self, F>
    where
        F: Fn(Self::Output) -> O,
    {
        Map { inner: self, f }
    }

    /// Add a check on the validated output; `message` is reported when the
    /// predicate returns false.
    fn refine<F>(self, predicate: F, message: impl Into<String>) -> Refine<Self, F>
    where
        F: Fn(&Self::Output) -> bool,
    {
        Refine {
            inner: self,
            predicate,
            message: message.into(),
        }
    }

    /// Union with another schema producing the same output. The first schema
    /// that matches wins; on failure the issues of both are reported.
    fn or<B>(self, other: B) -> Or<Self, B>
    where
        B: Schema<Output = Self::Output>,
    {
        Or {
            first: self,
            second: other,
        }
    }
}

impl<S: Schema> SchemaExt for S {}

#[derive(Debug, Clone)]
pub struct Map<S, F> {
    inner: S,
    f: F,
}

impl<S, F, O> Schema for Map<S, F>
where
    S: Schema,
    F: Fn(S::Output) -> O,
{
    type Output = O;

    fn validate(&self, value: &Value) -> Result<O, ValidationError> {
        self.inner.validate(value).map(&self.f)
    }
}

#[derive(Debug, Clone)]
pub struct Refine<S, F> {
    inner: S,
    predicate: F,
    message: String,
}

impl<S, F> Schema for Refine<S, F>
where
    S: Schema,
    F: Fn(&S::Output) -> bool,
{
    type Output = S::Output;

    fn validate(&self, value: &Value) -> Result<S::Output, ValidationError> {
        let output = self.inner.validate(value)?;
        if (self.predicate)(&output) {
            Ok(output)
        } else {
            Err(ValidationError::single(String::new(), self.message.clone()))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Or<A, B> {
    first: A,
    second: B,
}

impl<A, B> Schema for Or<A, B>
where
    A: Schema,
    B: Schema<Output = A::Output>,
{
    type Output = A::Output;

    fn validate(&self, value: &Value) -> Result<A::Output, ValidationError> {
        match self.first.validate(value) {
            Ok(output) => Ok(output),
            Err(first) => self.second.validate(value).map_err(|second| first.merge(second)),
        }
    }
}
