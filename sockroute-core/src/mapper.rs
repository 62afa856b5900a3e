//! Pluggable value mapping.
//!
//! Structured message bodies can be mapped from plain JSON into the shape a
//! handler declared, and handler results can be mapped back into plain JSON
//! before they are emitted. Both directions go through a [`ValueMapper`], so
//! the executor does not depend on any particular mapping scheme.

use crate::error::BoxError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{borrow::Cow, fmt};

/// Name of the target shape a structured parameter is mapped into.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape(Cow<'static, str>);

impl Shape {
    /// Create a shape from a static name.
    pub const fn named(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Get the shape name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Shape {
    fn from(name: &'static str) -> Self {
        Self::named(name)
    }
}

impl From<String> for Shape {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which keys survive mapping by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Every key is kept unless excluded.
    #[default]
    ExposeAll,
    /// Only explicitly exposed keys are kept.
    ExcludeAll,
}

/// Options steering a [`ValueMapper`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    /// Default key policy.
    pub strategy: Strategy,
    /// Keys kept under [`Strategy::ExcludeAll`].
    pub expose: Vec<String>,
    /// Keys always dropped.
    pub exclude: Vec<String>,
    /// Keys starting with any of these prefixes are dropped.
    pub exclude_prefixes: Vec<String>,
}

impl MapOptions {
    /// Create options with the expose-all strategy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Expose a key.
    pub fn expose(mut self, key: impl Into<String>) -> Self {
        self.expose.push(key.into());
        self
    }

    /// Exclude a key.
    pub fn exclude(mut self, key: impl Into<String>) -> Self {
        self.exclude.push(key.into());
        self
    }

    /// Exclude keys with a prefix.
    pub fn exclude_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.exclude_prefixes.push(prefix.into());
        self
    }

    /// Whether a key survives these options.
    pub fn keeps(&self, key: &str) -> bool {
        if self.exclude.iter().any(|k| k == key) {
            return false;
        }
        if self.exclude_prefixes.iter().any(|p| key.starts_with(p.as_str())) {
            return false;
        }
        match self.strategy {
            Strategy::ExposeAll => true,
            Strategy::ExcludeAll => self.expose.iter().any(|k| k == key),
        }
    }
}

/// Maps values between plain JSON and declared shapes.
pub trait ValueMapper: Send + Sync + 'static {
    /// Map a parsed message body into `shape`.
    fn to_instance(&self, shape: &Shape, plain: Value, options: &MapOptions)
    -> Result<Value, BoxError>;

    /// Map a handler result (or failure payload) into plain JSON.
    fn to_plain(&self, value: Value, options: &MapOptions) -> Result<Value, BoxError>;
}
