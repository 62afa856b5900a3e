//! # Action Handlers
//!
//! A handler is the terminal point of an action: it receives the resolved
//! [`Args`] and produces an [`Outcome`]. The outcome decides which emission
//! rule fires: `Ok` goes to the success path, `Err` to the failure path.
//!
//! # Usage Patterns
//!
//! 1. **Async closure**: `|args: Args| async move { ... }`
//! 2. **Sync closure**: `SyncHandler(|args: Args| ...)` for handlers that
//!    return an immediate value
//! 3. **Struct implementation**: `impl ActionHandler for MyHandler`
//!
//! Anything implementing [`IntoOutcome`] can be returned.

use crate::{args::Args, error::BoxError};
use futures::future::BoxFuture;
use serde::Serialize;
use serde_json::Value;
use std::future::Future;

/// The result of one handler invocation. `Ok(None)` is an empty result.
pub type Outcome = Result<Option<Value>, BoxError>;

/// The terminal endpoint of an action.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be used as a socket action handler",
    label = "missing `ActionHandler` implementation",
    note = "Async closures taking `Args` and returning an `IntoOutcome` value implement it."
)]
pub trait ActionHandler: Send + Sync + 'static {
    /// Executes the handler logic.
    fn call(&self, args: Args) -> impl Future<Output = Outcome> + Send;
}

// Blanket impl for async closures
impl<F, Fut> ActionHandler for F
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future + Send,
    Fut::Output: IntoOutcome,
{
    async fn call(&self, args: Args) -> Outcome {
        (self)(args).await.into_outcome()
    }
}

/// Adapter for synchronous handlers returning an immediate value.
pub struct SyncHandler<F>(pub F);

impl<F, Out> ActionHandler for SyncHandler<F>
where
    F: Fn(Args) -> Out + Send + Sync + 'static,
    Out: IntoOutcome,
{
    async fn call(&self, args: Args) -> Outcome {
        (self.0)(args).into_outcome()
    }
}

/// Object-safe version of [`ActionHandler`], used for storage in descriptors.
pub trait DynActionHandler: Send + Sync + 'static {
    /// Executes the handler logic (dynamic dispatch version).
    fn call_dyn(&self, args: Args) -> BoxFuture<'_, Outcome>;
}

impl<T: ActionHandler> DynActionHandler for T {
    fn call_dyn(&self, args: Args) -> BoxFuture<'_, Outcome> {
        Box::pin(self.call(args))
    }
}

/// Conversion of a handler's return value into an [`Outcome`].
///
/// # Default Implementations
///
/// - `()` → empty result
/// - `Value` → the value (`Value::Null` counts as empty downstream)
/// - `String`, `&'static str`, `bool` → a JSON scalar
/// - [`Json<T>`] → `T` serialized with serde
/// - `Option<T>` → `None` is an empty result
/// - `Result<T, E>` → delegates to `T`, or fails with `E`
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be turned into an action outcome",
    label = "missing `IntoOutcome` implementation",
    note = "Wrap serializable values in `Json(..)`."
)]
pub trait IntoOutcome {
    /// Convert into an outcome.
    fn into_outcome(self) -> Outcome;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Outcome {
        Ok(None)
    }
}

impl IntoOutcome for Value {
    fn into_outcome(self) -> Outcome {
        Ok(Some(self))
    }
}

impl IntoOutcome for String {
    fn into_outcome(self) -> Outcome {
        Ok(Some(Value::String(self)))
    }
}

impl IntoOutcome for &'static str {
    fn into_outcome(self) -> Outcome {
        Ok(Some(Value::String(self.to_owned())))
    }
}

impl IntoOutcome for bool {
    fn into_outcome(self) -> Outcome {
        Ok(Some(Value::Bool(self)))
    }
}

impl<T: IntoOutcome> IntoOutcome for Option<T> {
    fn into_outcome(self) -> Outcome {
        match self {
            Some(t) => t.into_outcome(),
            None => Ok(None),
        }
    }
}

impl<T, E> IntoOutcome for Result<T, E>
where
    T: IntoOutcome,
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Outcome {
        match self {
            Ok(t) => t.into_outcome(),
            Err(e) => Err(e.into()),
        }
    }
}

/// Serializes any `T: Serialize` as the handler's result.
#[derive(Debug, Clone)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoOutcome for Json<T> {
    fn into_outcome(self) -> Outcome {
        serde_json::to_value(self.0)
            .map(Some)
            .map_err(|e| Box::new(e) as BoxError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::Arg;
    use serde_json::json;

    #[derive(Serialize)]
    struct Saved {
        id: u32,
    }

    #[tokio::test]
    async fn test_async_closure_handler() {
        let handler = |args: Args| async move { args.value(0).map(|v| v.cloned()) };
        let outcome = handler
            .call(Args::new(vec![Arg::from(json!({ "x": 1 }))]))
            .await
            .unwrap();
        assert_eq!(outcome, Some(json!({ "x": 1 })));
    }

    #[tokio::test]
    async fn test_sync_handler() {
        let handler = SyncHandler(|_args: Args| Json(Saved { id: 7 }));
        let outcome = handler.call(Args::default()).await.unwrap();
        assert_eq!(outcome, Some(json!({ "id": 7 })));
    }

    #[tokio::test]
    async fn test_error_outcome() {
        let handler = SyncHandler(|_args: Args| Err::<(), _>("nope"));
        let err = handler.call_dyn(Args::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "nope");
    }

    #[test]
    fn test_unit_and_option_are_empty() {
        assert_eq!(().into_outcome().unwrap(), None);
        assert_eq!(None::<Value>.into_outcome().unwrap(), None);
        assert_eq!(true.into_outcome().unwrap(), Some(json!(true)));
    }
}
