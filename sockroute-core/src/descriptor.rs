//! Immutable descriptors.
//!
//! Descriptors are produced once, when declarations are built, and are only
//! read afterwards. The executor shares them behind `Arc` for the lifetime of
//! the process.

use crate::{
    error::BoxError,
    handler::DynActionHandler,
    mapper::{MapOptions, Shape},
    middleware::Middleware,
    socket::SocketRef,
};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};
use serde_json::Value;
use std::{fmt, future::Future, sync::Arc};

/// What triggers an action.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    /// Runs once, as soon as a connection is established.
    Connect,
    /// Runs when the connection's disconnect signal fires.
    Disconnect,
    /// Runs whenever a message with this name arrives.
    Message(String),
}

/// Where a parameter's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKind {
    /// The connection handle itself.
    ConnectedSocket,
    /// The messaging root.
    SocketIo,
    /// A named value from the handshake query.
    QueryParam(String),
    /// The connection id.
    SocketId,
    /// The connection's upgrade request.
    SocketRequest,
    /// The rooms the connection has joined.
    SocketRooms,
    /// The message payload.
    MessageBody,
    /// The message payload, shaped by the parameter's own transform.
    Custom,
}

/// How a free-form value is coerced before it reaches the handler.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Coercion {
    /// Passed through untouched.
    #[default]
    Raw,
    /// Numeric parsing.
    Number,
    /// Passed through as text.
    Text,
    /// `"true"`/`"false"` literals, otherwise truthiness.
    Boolean,
    /// JSON parsing of text, then optional mapping into a shape.
    Structured(Option<Shape>),
}

impl Coercion {
    /// Structured coercion into a plain JSON value.
    pub const fn object() -> Self {
        Coercion::Structured(None)
    }

    /// Structured coercion mapped into `shape`.
    pub fn shaped(shape: impl Into<Shape>) -> Self {
        Coercion::Structured(Some(shape.into()))
    }
}

type TransformFn =
    dyn Fn(Option<Value>, SocketRef) -> BoxFuture<'static, Result<Option<Value>, BoxError>>
        + Send
        + Sync;

/// A parameter's own transform function.
///
/// It receives the coerced value and the connection, and its result replaces
/// the value entirely.
#[derive(Clone)]
pub struct ParamTransform(Arc<TransformFn>);

impl ParamTransform {
    /// Wrap an async transform.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Option<Value>, SocketRef) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, BoxError>> + Send + 'static,
    {
        Self(Arc::new(move |value: Option<Value>, socket: SocketRef| {
            f(value, socket).boxed()
        }))
    }

    /// Wrap a synchronous transform.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Option<Value>, &SocketRef) -> Result<Option<Value>, BoxError> + Send + Sync + 'static,
    {
        Self(Arc::new(move |value: Option<Value>, socket: SocketRef| {
            future::ready(f(value, &socket)).boxed()
        }))
    }

    /// Run the transform.
    pub async fn apply(
        &self,
        value: Option<Value>,
        socket: SocketRef,
    ) -> Result<Option<Value>, BoxError> {
        (self.0)(value, socket).await
    }
}

impl fmt::Debug for ParamTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ParamTransform")
    }
}

/// One declared parameter of an action.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    /// Declared position.
    pub index: usize,
    /// Value source.
    pub kind: ParamKind,
    /// Coercion applied to free-form values.
    pub coercion: Coercion,
    /// Parameter-specific transform, applied last.
    pub transform: Option<ParamTransform>,
    /// Mapping options overriding the global default.
    pub options: Option<MapOptions>,
}

/// An outbound event emitted after an action completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmissionRule {
    /// Event name to emit.
    pub event: String,
    /// Mapping options overriding the global default.
    pub options: Option<MapOptions>,
}

impl EmissionRule {
    /// Create a rule without options.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            options: None,
        }
    }

    /// Attach mapping options.
    pub fn with_options(mut self, options: MapOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// One action of a controller.
pub struct ActionDescriptor {
    /// Declaring controller.
    pub target: String,
    /// Declaring method.
    pub method: String,
    /// Trigger.
    pub kind: ActionKind,
    /// Parameters, ascending by index.
    pub params: Vec<ParamDescriptor>,
    /// Emitted when the handler succeeds.
    pub on_success: Option<EmissionRule>,
    /// Emitted when resolution or the handler fails.
    pub on_fail: Option<EmissionRule>,
    /// Suppress emissions for empty results.
    pub skip_empty_result: bool,
    /// The bound handler.
    pub handler: Arc<dyn DynActionHandler>,
}

impl fmt::Debug for ActionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("target", &self.target)
            .field("method", &self.method)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("on_success", &self.on_success)
            .field("on_fail", &self.on_fail)
            .field("skip_empty_result", &self.skip_empty_result)
            .finish_non_exhaustive()
    }
}

/// A controller and its actions.
#[derive(Debug, Clone)]
pub struct ControllerDescriptor {
    /// Controller target.
    pub target: String,
    /// Namespace, `None` for the root.
    pub namespace: Option<String>,
    /// Actions in declaration order.
    pub actions: Vec<Arc<ActionDescriptor>>,
}

/// A connection-level interceptor.
#[derive(Clone)]
pub struct MiddlewareDescriptor {
    /// Middleware target.
    pub target: String,
    /// Lower runs first; `None` runs before any explicit priority.
    pub priority: Option<i32>,
    /// The bound instance.
    pub instance: Arc<dyn Middleware>,
}

impl fmt::Debug for MiddlewareDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareDescriptor")
            .field("target", &self.target)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}
