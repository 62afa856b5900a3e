//! Explicit declaration registry.
//!
//! The registry is an append-only list of declaration records. It is built
//! by application code before the executor starts and passed to it
//! explicitly; nothing is collected behind the application's back.

use super::declare::{ControllerDecl, MiddlewareDecl};
use sockroute_core::{
    ActionHandler, ActionKind, Coercion, DynActionHandler, EmissionRule, MapOptions, Middleware,
    ParamKind, ParamTransform,
};
use std::{fmt, sync::Arc};

/// Declares a controller, optionally bound to a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRecord {
    /// Controller target.
    pub target: String,
    /// Namespace, `None` for the root.
    pub namespace: Option<String>,
}

/// Binds a handler to a controller method.
#[derive(Clone)]
pub struct MethodBinding {
    /// Controller target.
    pub target: String,
    /// Method name.
    pub method: String,
    /// The handler invoked for this method.
    pub handler: Arc<dyn DynActionHandler>,
}

impl fmt::Debug for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodBinding")
            .field("target", &self.target)
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

/// Declares that a method reacts to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    /// Controller target.
    pub target: String,
    /// Method name.
    pub method: String,
    /// Trigger.
    pub kind: ActionKind,
}

/// Declares one parameter of a method.
#[derive(Debug, Clone)]
pub struct ParamRecord {
    /// Controller target.
    pub target: String,
    /// Method name.
    pub method: String,
    /// Declared position.
    pub index: usize,
    /// Value source.
    pub kind: ParamKind,
    /// Coercion for free-form values.
    pub coercion: Coercion,
    /// Parameter-specific transform.
    pub transform: Option<ParamTransform>,
    /// Mapping options override.
    pub options: Option<MapOptions>,
}

/// What a result record asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultKind {
    /// Emit after the handler succeeds.
    EmitOnSuccess(EmissionRule),
    /// Emit after resolution or the handler fails.
    EmitOnFail(EmissionRule),
    /// Suppress emissions for empty results.
    SkipEmitOnEmptyResult,
}

/// Declares a result rule on a method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    /// Controller target.
    pub target: String,
    /// Method name.
    pub method: String,
    /// The rule.
    pub kind: ResultKind,
}

/// Declares a connection-level middleware.
#[derive(Clone)]
pub struct MiddlewareRecord {
    /// Middleware target.
    pub target: String,
    /// Lower runs first; `None` runs before any explicit priority.
    pub priority: Option<i32>,
    /// The instance to register.
    pub instance: Arc<dyn Middleware>,
}

impl fmt::Debug for MiddlewareRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareRecord")
            .field("target", &self.target)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// An append-only collection of declarations.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = MetadataRegistry::new();
/// let mut chat = registry.controller("ChatController").namespace("/chat");
/// chat.method("save", save_message)
///     .on_message("save")
///     .connected_socket()
///     .message_body(Coercion::object())
///     .emit_on_success("saved");
/// ```
#[derive(Debug, Default)]
pub struct MetadataRegistry {
    controllers: Vec<ControllerRecord>,
    bindings: Vec<MethodBinding>,
    actions: Vec<ActionRecord>,
    params: Vec<ParamRecord>,
    results: Vec<ResultRecord>,
    middlewares: Vec<MiddlewareRecord>,
}

impl MetadataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start declaring a controller.
    pub fn controller(&mut self, target: impl Into<String>) -> ControllerDecl<'_> {
        let slot = self.controllers.len();
        self.add_controller(ControllerRecord {
            target: target.into(),
            namespace: None,
        });
        ControllerDecl::new(self, slot)
    }

    /// Declare a middleware.
    pub fn middleware<M: Middleware>(
        &mut self,
        target: impl Into<String>,
        instance: M,
    ) -> MiddlewareDecl<'_> {
        let slot = self.middlewares.len();
        self.add_middleware(MiddlewareRecord {
            target: target.into(),
            priority: None,
            instance: Arc::new(instance),
        });
        MiddlewareDecl::new(self, slot)
    }

    /// Bind a handler to a controller method.
    pub fn bind<H: ActionHandler>(
        &mut self,
        target: impl Into<String>,
        method: impl Into<String>,
        handler: H,
    ) {
        self.bindings.push(MethodBinding {
            target: target.into(),
            method: method.into(),
            handler: Arc::new(handler),
        });
    }

    /// Append a controller record.
    pub fn add_controller(&mut self, record: ControllerRecord) {
        self.controllers.push(record);
    }

    /// Append an action record.
    pub fn add_action(&mut self, record: ActionRecord) {
        self.actions.push(record);
    }

    /// Append a parameter record.
    pub fn add_param(&mut self, record: ParamRecord) {
        self.params.push(record);
    }

    /// Append a result record.
    pub fn add_result(&mut self, record: ResultRecord) {
        self.results.push(record);
    }

    /// Append a middleware record.
    pub fn add_middleware(&mut self, record: MiddlewareRecord) {
        self.middlewares.push(record);
    }

    /// Declared controllers.
    pub fn controllers(&self) -> &[ControllerRecord] {
        &self.controllers
    }

    /// Method bindings.
    pub fn bindings(&self) -> &[MethodBinding] {
        &self.bindings
    }

    /// Declared actions.
    pub fn actions(&self) -> &[ActionRecord] {
        &self.actions
    }

    /// Declared parameters.
    pub fn params(&self) -> &[ParamRecord] {
        &self.params
    }

    /// Declared result rules.
    pub fn results(&self) -> &[ResultRecord] {
        &self.results
    }

    /// Declared middlewares.
    pub fn middlewares(&self) -> &[MiddlewareRecord] {
        &self.middlewares
    }

    pub(crate) fn controller_mut(&mut self, slot: usize) -> Option<&mut ControllerRecord> {
        self.controllers.get_mut(slot)
    }

    pub(crate) fn middleware_mut(&mut self, slot: usize) -> Option<&mut MiddlewareRecord> {
        self.middlewares.get_mut(slot)
    }
}
