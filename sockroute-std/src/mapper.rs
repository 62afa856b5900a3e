//! Standard value mappers.

use serde_json::{Map, Value};
use sockroute_core::{BoxError, MapOptions, Shape, ValueMapper};
use std::collections::HashMap;

/// A mapper that returns every value unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl ValueMapper for IdentityMapper {
    fn to_instance(
        &self,
        _shape: &Shape,
        plain: Value,
        _options: &MapOptions,
    ) -> Result<Value, BoxError> {
        Ok(plain)
    }

    fn to_plain(&self, value: Value, _options: &MapOptions) -> Result<Value, BoxError> {
        Ok(value)
    }
}

/// A mapper that drops object keys according to [`MapOptions`].
///
/// Pruning recurses into nested objects and arrays. Shapes can additionally
/// declare the fields they accept; keys outside a shape's field list are
/// dropped when mapping into that shape, and a non-object body is rejected.
#[derive(Debug, Clone, Default)]
pub struct PruneMapper {
    shapes: HashMap<Shape, Vec<String>>,
}

impl PruneMapper {
    /// Create a mapper with no shape field lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the fields of `shape`.
    pub fn shape_fields<I, S>(mut self, shape: impl Into<Shape>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.shapes
            .insert(shape.into(), fields.into_iter().map(Into::into).collect());
        self
    }

    fn prune(value: Value, options: &MapOptions) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .filter(|(key, _)| options.keeps(key))
                    .map(|(key, v)| (key, Self::prune(v, options)))
                    .collect(),
            ),
            Value::Array(items) => {
                Value::Array(items.into_iter().map(|v| Self::prune(v, options)).collect())
            }
            other => other,
        }
    }
}

impl ValueMapper for PruneMapper {
    fn to_instance(
        &self,
        shape: &Shape,
        plain: Value,
        options: &MapOptions,
    ) -> Result<Value, BoxError> {
        let Some(fields) = self.shapes.get(shape) else {
            return Ok(Self::prune(plain, options));
        };
        let Value::Object(map) = plain else {
            return Err(format!("expected an object for shape `{shape}`").into());
        };

        let kept: Map<String, Value> = map
            .into_iter()
            .filter(|(key, _)| fields.iter().any(|f| f == key))
            .collect();
        Ok(Self::prune(Value::Object(kept), options))
    }

    fn to_plain(&self, value: Value, options: &MapOptions) -> Result<Value, BoxError> {
        Ok(Self::prune(value, options))
    }
}
