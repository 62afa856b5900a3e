//! Parameter resolution and coercion.

use super::Dispatch;
use futures::future::try_join_all;
use serde_json::{Number, Value};
use sockroute_core::{
    ActionDescriptor, Arg, Args, Coercion, MapOptions, ParamDescriptor, ParamKind, ResolveError,
    SocketRef,
};

impl Dispatch {
    /// Resolve every parameter of `action`, concurrently.
    ///
    /// The first failure aborts the invocation.
    pub(super) async fn resolve_params(
        &self,
        action: &ActionDescriptor,
        socket: &SocketRef,
        payload: Option<Value>,
    ) -> Result<Args, ResolveError> {
        let resolutions = action
            .params
            .iter()
            .map(|param| self.resolve_param(param, socket, payload.clone()));
        Ok(Args::new(try_join_all(resolutions).await?))
    }

    async fn resolve_param(
        &self,
        param: &ParamDescriptor,
        socket: &SocketRef,
        payload: Option<Value>,
    ) -> Result<Arg, ResolveError> {
        let arg = match &param.kind {
            ParamKind::ConnectedSocket => Arg::Socket(socket.clone()),
            ParamKind::SocketIo => {
                Arg::Root(self.root.upgrade().ok_or(ResolveError::RootUnavailable)?)
            }
            ParamKind::QueryParam(name) => Arg::Value(
                socket
                    .handshake()
                    .query_param(name)
                    .map(|value| Value::String(value.to_owned())),
            ),
            ParamKind::SocketId => Arg::Value(Some(Value::String(socket.id().to_owned()))),
            ParamKind::SocketRequest => Arg::Request(socket.request()),
            ParamKind::SocketRooms => Arg::Rooms(socket.rooms()),
            ParamKind::MessageBody | ParamKind::Custom => {
                Arg::Value(self.resolve_body(param, socket, payload).await?)
            }
        };
        Ok(arg)
    }

    async fn resolve_body(
        &self,
        param: &ParamDescriptor,
        socket: &SocketRef,
        payload: Option<Value>,
    ) -> Result<Option<Value>, ResolveError> {
        let value = match payload {
            Some(raw) if !raw.is_null() && raw != "" => {
                Some(self.coerce(&param.coercion, param.options.as_ref(), raw)?)
            }
            other => other,
        };

        match &param.transform {
            Some(transform) => transform
                .apply(value, socket.clone())
                .await
                .map_err(ResolveError::Transform),
            None => Ok(value),
        }
    }

    fn coerce(
        &self,
        coercion: &Coercion,
        options: Option<&MapOptions>,
        raw: Value,
    ) -> Result<Value, ResolveError> {
        match coercion {
            Coercion::Raw | Coercion::Text => Ok(raw),
            Coercion::Number => Ok(coerce_number(&raw)),
            Coercion::Boolean => Ok(coerce_boolean(&raw)),
            Coercion::Structured(_) if !is_truthy(&raw) => Ok(raw),
            Coercion::Structured(shape) => {
                let parsed = match &raw {
                    Value::String(text) => serde_json::from_str(text).map_err(|err| {
                        ResolveError::ParameterParse {
                            raw: raw.clone(),
                            source: Box::new(err),
                        }
                    })?,
                    other => other.clone(),
                };

                match shape {
                    Some(shape) if self.options.use_value_mapper => {
                        let options = options.unwrap_or(&self.options.plain_to_instance);
                        self.options
                            .mapper
                            .to_instance(shape, parsed, options)
                            .map_err(|source| ResolveError::ParameterParse { raw, source })
                    }
                    _ => Ok(parsed),
                }
            }
        }
    }
}

/// Numeric coercion with the usual loose-typing rules.
///
/// Text is trimmed and parsed as a decimal, `0x`/`0o`/`0b` literal or
/// `Infinity`; an empty string is zero. Values with no numeric meaning
/// become `null`, as do infinities. Integral results up to 2^53 - 1 are
/// integers; larger ones, including radix literals wider than 64 bits, are
/// floats.
pub fn coerce_number(value: &Value) -> Value {
    let number = match value {
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => return Value::Number(n.clone()),
        Value::String(text) => parse_number(text),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [Value::Object(_)] => None,
            [item] => return coerce_number(item),
            _ => None,
        },
        Value::Object(_) => None,
    };
    number.map_or(Value::Null, number_value)
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = text.strip_prefix(prefix) {
            if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
                return None;
            }
            // Folded as a float so literals wider than 64 bits lose precision
            // instead of failing.
            return Some(digits.chars().filter_map(|c| c.to_digit(radix)).fold(0.0, |acc, d| {
                acc * f64::from(radix) + f64::from(d)
            }));
        }
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return Some(if text.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    // Rejects the spellings `f64::from_str` accepts beyond decimal literals.
    if !unsigned
        .bytes()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'))
    {
        return None;
    }
    text.parse().ok()
}

fn number_value(n: f64) -> Value {
    const MAX_SAFE: f64 = 9_007_199_254_740_991.0;

    if !n.is_finite() {
        Value::Null
    } else if n.fract() == 0.0 && n.abs() <= MAX_SAFE {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

/// Boolean coercion: the literals `"true"` and `"false"`, otherwise
/// truthiness.
pub fn coerce_boolean(value: &Value) -> Value {
    match value.as_str() {
        Some("true") => Value::Bool(true),
        Some("false") => Value::Bool(false),
        _ => Value::Bool(is_truthy(value)),
    }
}

/// Whether a value counts as set.
///
/// `null`, `false`, zero and the empty string are falsy; objects and arrays
/// are always truthy, even when empty.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_number_from_text() {
        assert_eq!(coerce_number(&json!("42")), json!(42));
        assert_eq!(coerce_number(&json!(" 4.5 ")), json!(4.5));
        assert_eq!(coerce_number(&json!("0x1F")), json!(31));
        assert_eq!(coerce_number(&json!("1e3")), json!(1000));
        assert_eq!(coerce_number(&json!("-7")), json!(-7));
        assert_eq!(coerce_number(&json!("   ")), json!(0));
    }

    #[test]
    fn test_wide_radix_literal_is_float() {
        assert_eq!(
            coerce_number(&json!("0x20000000000000000")),
            json!(36893488147419103232.0)
        );
        assert_eq!(coerce_number(&json!("0xZZ")), Value::Null);
    }

    #[test]
    fn test_number_without_meaning_is_null() {
        assert_eq!(coerce_number(&json!("abc")), Value::Null);
        assert_eq!(coerce_number(&json!("inf")), Value::Null);
        assert_eq!(coerce_number(&json!("NaN")), Value::Null);
        assert_eq!(coerce_number(&json!("Infinity")), Value::Null);
        assert_eq!(coerce_number(&json!({ "a": 1 })), Value::Null);
        assert_eq!(coerce_number(&json!([1, 2])), Value::Null);
    }

    #[test]
    fn test_number_from_other_scalars() {
        assert_eq!(coerce_number(&json!(true)), json!(1));
        assert_eq!(coerce_number(&json!(false)), json!(0));
        assert_eq!(coerce_number(&json!(12)), json!(12));
        assert_eq!(coerce_number(&json!([])), json!(0));
        assert_eq!(coerce_number(&json!(["8"])), json!(8));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(coerce_boolean(&json!("true")), json!(true));
        assert_eq!(coerce_boolean(&json!("false")), json!(false));
        assert_eq!(coerce_boolean(&json!("yes")), json!(true));
        assert_eq!(coerce_boolean(&json!(0)), json!(false));
        assert_eq!(coerce_boolean(&json!({})), json!(true));
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0.0)));
        assert!(is_truthy(&json!([])));
        assert!(is_truthy(&json!("0")));
    }
}
