//! Error types for Sockroute.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`SockrouteError`] - Top-level error type for all Sockroute operations
//! - [`ConfigError`] - Declaration linkage errors raised at startup
//! - [`DispatchError`] - Errors raised while invoking an action
//! - [`ResolveError`] - Errors raised while resolving a single parameter
//! - [`ArgError`] - Errors raised by handlers reading their arguments
//! - [`Fault`] - A handler failure carrying a structured payload

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Sockroute operations.
#[derive(Error, Debug)]
pub enum SockrouteError {
    /// The declarations could not be turned into descriptors.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An action invocation failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Declaration linkage errors.
///
/// These are raised once, while descriptors are built, and are not
/// recoverable at runtime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A controller target was requested but never declared.
    #[error("controller `{0}` is not registered")]
    UnknownController(String),

    /// A middleware target was requested but never declared.
    #[error("middleware `{0}` is not registered")]
    UnknownMiddleware(String),

    /// An action was declared on a method that has no handler bound.
    #[error("action `{target}::{method}` has no bound handler")]
    UnboundMethod {
        /// Controller target.
        target: String,
        /// Method name.
        method: String,
    },

    /// A parameter was declared on a method that is not an action.
    #[error("parameter {index} of `{target}::{method}` belongs to no action")]
    OrphanParam {
        /// Controller target.
        target: String,
        /// Method name.
        method: String,
        /// Declared parameter index.
        index: usize,
    },

    /// A result rule was declared on a method that is not an action.
    #[error("result rule on `{target}::{method}` belongs to no action")]
    OrphanResult {
        /// Controller target.
        target: String,
        /// Method name.
        method: String,
    },

    /// Two parameters of the same method share an index.
    #[error("parameter index {index} of `{target}::{method}` is declared twice")]
    DuplicateParamIndex {
        /// Controller target.
        target: String,
        /// Method name.
        method: String,
        /// The clashing index.
        index: usize,
    },

    /// A named-message action was declared without an event name.
    #[error("message action `{target}::{method}` has an empty event name")]
    EmptyEventName {
        /// Controller target.
        target: String,
        /// Method name.
        method: String,
    },
}

/// Errors raised while invoking an action.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// One of the action's parameters could not be resolved.
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    /// The handler itself failed.
    #[error(transparent)]
    Handler(BoxError),

    /// The handler's result could not be mapped for emission.
    #[error("result mapping failed: {0}")]
    Mapping(#[source] BoxError),
}

impl DispatchError {
    /// Returns the underlying error, whichever phase produced it.
    ///
    /// A failed parameter transform yields the transform's own error.
    pub fn inner(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        match self {
            DispatchError::Resolve(ResolveError::Transform(e)) => &**e,
            DispatchError::Resolve(e) => e,
            DispatchError::Handler(e) => &**e,
            DispatchError::Mapping(e) => &**e,
        }
    }
}

/// Errors raised while resolving a single parameter.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A message body could not be parsed as structured data.
    #[error("given parameter {raw} is invalid: value cannot be parsed into JSON")]
    ParameterParse {
        /// The offending raw value.
        raw: Value,
        /// What went wrong.
        #[source]
        source: BoxError,
    },

    /// A parameter's own transform function failed.
    #[error(transparent)]
    Transform(BoxError),

    /// The messaging root was dropped before the parameter was resolved.
    #[error("messaging root is no longer available")]
    RootUnavailable,
}

impl ResolveError {
    /// Returns the raw value carried by a parse error.
    pub fn raw(&self) -> Option<&Value> {
        match self {
            ResolveError::ParameterParse { raw, .. } => Some(raw),
            ResolveError::Transform(_) | ResolveError::RootUnavailable => None,
        }
    }
}

/// Errors raised when a handler reads an argument it did not get.
#[derive(Error, Debug)]
pub enum ArgError {
    /// No argument at this position.
    #[error("no argument at index {0}")]
    Missing(usize),

    /// The argument is of a different kind.
    #[error("argument {index} is not a {expected}")]
    Mismatch {
        /// Argument position.
        index: usize,
        /// What the handler asked for.
        expected: &'static str,
    },

    /// The argument could not be deserialized into the requested type.
    #[error("argument {index} cannot be deserialized: {source}")]
    Deserialize {
        /// Argument position.
        index: usize,
        /// The serde error.
        #[source]
        source: serde_json::Error,
    },
}

/// A handler failure carrying a structured payload.
///
/// Returning a `Fault` lets a handler decide what the failure emission
/// contains. A fault whose payload is empty is emitted as its message.
///
/// ```rust,ignore
/// Err(Fault::new("quota exceeded").with_payload(json!({ "code": 429 })))
/// ```
#[derive(Debug, Clone)]
pub struct Fault {
    message: String,
    payload: Value,
}

impl Fault {
    /// Create a fault with a message and no payload.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            payload: Value::Null,
        }
    }

    /// Attach a structured payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// The human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The structured payload.
    pub fn payload(&self) -> &Value {
        &self.payload
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Fault {}

// Convenience conversions
impl From<BoxError> for SockrouteError {
    fn from(err: BoxError) -> Self {
        SockrouteError::Custom(err)
    }
}

impl From<BoxError> for DispatchError {
    fn from(err: BoxError) -> Self {
        DispatchError::Handler(err)
    }
}
