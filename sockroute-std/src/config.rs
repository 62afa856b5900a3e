//! Executor configuration.

use crate::mapper::IdentityMapper;
use serde::Deserialize;
use sockroute_core::{MapOptions, ValueMapper};
use std::{fmt, sync::Arc};

fn default_mapper() -> Arc<dyn ValueMapper> {
    Arc::new(IdentityMapper)
}

fn enabled() -> bool {
    true
}

/// Options controlling how the executor maps values.
///
/// The mapping switches and default options can be loaded from any serde
/// format; the mapper itself is set in code.
///
/// # Example
///
/// ```rust,ignore
/// let options: ExecutorOptions = serde_json::from_str(r#"{
///     "use_value_mapper": true,
///     "instance_to_plain": { "exclude_prefixes": ["_"] }
/// }"#)?;
/// let options = options.with_mapper(PruneMapper::new());
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorOptions {
    /// Map structured bodies and emitted payloads through the mapper.
    #[serde(default = "enabled")]
    pub use_value_mapper: bool,
    /// Default options for results and failure payloads.
    pub instance_to_plain: MapOptions,
    /// Default options for structured message bodies.
    pub plain_to_instance: MapOptions,
    /// The mapper.
    #[serde(skip, default = "default_mapper")]
    pub mapper: Arc<dyn ValueMapper>,
}

impl Default for ExecutorOptions {
    fn default() -> Self {
        Self {
            use_value_mapper: true,
            instance_to_plain: MapOptions::default(),
            plain_to_instance: MapOptions::default(),
            mapper: default_mapper(),
        }
    }
}

impl fmt::Debug for ExecutorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorOptions")
            .field("use_value_mapper", &self.use_value_mapper)
            .field("instance_to_plain", &self.instance_to_plain)
            .field("plain_to_instance", &self.plain_to_instance)
            .finish_non_exhaustive()
    }
}

impl ExecutorOptions {
    /// Create options with mapping enabled and the identity mapper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn value mapping on or off.
    pub fn with_value_mapper(mut self, enabled: bool) -> Self {
        self.use_value_mapper = enabled;
        self
    }

    /// Set the mapper.
    pub fn with_mapper(mut self, mapper: impl ValueMapper) -> Self {
        self.mapper = Arc::new(mapper);
        self
    }

    /// Set the default options for outbound payloads.
    pub fn with_instance_to_plain(mut self, options: MapOptions) -> Self {
        self.instance_to_plain = options;
        self
    }

    /// Set the default options for structured bodies.
    pub fn with_plain_to_instance(mut self, options: MapOptions) -> Self {
        self.plain_to_instance = options;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sockroute_core::Strategy;

    #[test]
    fn test_defaults() {
        let options = ExecutorOptions::default();
        assert!(options.use_value_mapper);
        assert_eq!(options.instance_to_plain, MapOptions::default());
    }

    #[test]
    fn test_deserialize_partial() {
        let options: ExecutorOptions = serde_json::from_str(
            r#"{ "plain_to_instance": { "strategy": "exclude_all", "expose": ["id"] } }"#,
        )
        .unwrap();

        assert!(options.use_value_mapper);
        assert_eq!(options.plain_to_instance.strategy, Strategy::ExcludeAll);
        assert!(options.instance_to_plain.expose.is_empty());
    }

    #[test]
    fn test_deserialize_disable_mapping() {
        let options: ExecutorOptions =
            serde_json::from_str(r#"{ "use_value_mapper": false }"#).unwrap();
        assert!(!options.use_value_mapper);
    }
}
