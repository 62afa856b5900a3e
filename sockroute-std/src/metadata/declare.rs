//! Fluent declaration API.
//!
//! These builders write records into a [`MetadataRegistry`] as they are
//! called, in the same order the calls are made.

use super::registry::{
    ActionRecord, MetadataRegistry, ParamRecord, ResultKind, ResultRecord,
};
use sockroute_core::{
    ActionHandler, ActionKind, Coercion, EmissionRule, MapOptions, ParamKind, ParamTransform,
};

/// Declares a controller and its methods.
pub struct ControllerDecl<'r> {
    registry: &'r mut MetadataRegistry,
    slot: usize,
}

impl<'r> ControllerDecl<'r> {
    pub(crate) fn new(registry: &'r mut MetadataRegistry, slot: usize) -> Self {
        Self { registry, slot }
    }

    /// Bind the controller to a namespace instead of the root.
    pub fn namespace(self, namespace: impl Into<String>) -> Self {
        if let Some(record) = self.registry.controller_mut(self.slot) {
            record.namespace = Some(namespace.into());
        }
        self
    }

    /// The controller's target name.
    pub fn target(&self) -> &str {
        self.registry
            .controllers()
            .get(self.slot)
            .map(|record| record.target.as_str())
            .unwrap_or_default()
    }

    /// Bind `handler` to `method` and start declaring it.
    pub fn method<H: ActionHandler>(
        &mut self,
        method: impl Into<String>,
        handler: H,
    ) -> MethodDecl<'_> {
        let target = self.target().to_owned();
        let method = method.into();
        self.registry.bind(target.clone(), method.clone(), handler);
        MethodDecl {
            registry: &mut *self.registry,
            target,
            method,
            next_index: 0,
        }
    }
}

/// Parameter declaration used by [`MethodDecl::param`] and
/// [`MethodDecl::param_at`].
#[derive(Debug, Clone)]
pub struct ParamSpec {
    kind: ParamKind,
    coercion: Coercion,
    transform: Option<ParamTransform>,
    options: Option<MapOptions>,
}

impl ParamSpec {
    /// A parameter of `kind` with raw coercion.
    pub fn new(kind: ParamKind) -> Self {
        Self {
            kind,
            coercion: Coercion::Raw,
            transform: None,
            options: None,
        }
    }

    /// Set the coercion.
    pub fn coercion(mut self, coercion: Coercion) -> Self {
        self.coercion = coercion;
        self
    }

    /// Set the transform.
    pub fn transform(mut self, transform: ParamTransform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Set mapping options.
    pub fn options(mut self, options: MapOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Declares the actions, parameters and result rules of one method.
///
/// Parameters declared through the shorthand methods take the next free
/// index; [`param_at`](Self::param_at) places one explicitly.
pub struct MethodDecl<'r> {
    registry: &'r mut MetadataRegistry,
    target: String,
    method: String,
    next_index: usize,
}

impl MethodDecl<'_> {
    fn action(self, kind: ActionKind) -> Self {
        self.registry.add_action(ActionRecord {
            target: self.target.clone(),
            method: self.method.clone(),
            kind,
        });
        self
    }

    fn result(self, kind: ResultKind) -> Self {
        self.registry.add_result(ResultRecord {
            target: self.target.clone(),
            method: self.method.clone(),
            kind,
        });
        self
    }

    /// Run when a message named `event` arrives.
    pub fn on_message(self, event: impl Into<String>) -> Self {
        self.action(ActionKind::Message(event.into()))
    }

    /// Run when a client connects.
    pub fn on_connect(self) -> Self {
        self.action(ActionKind::Connect)
    }

    /// Run when a client disconnects.
    pub fn on_disconnect(self) -> Self {
        self.action(ActionKind::Disconnect)
    }

    /// Declare a parameter at an explicit index.
    pub fn param_at(mut self, index: usize, spec: ParamSpec) -> Self {
        self.registry.add_param(ParamRecord {
            target: self.target.clone(),
            method: self.method.clone(),
            index,
            kind: spec.kind,
            coercion: spec.coercion,
            transform: spec.transform,
            options: spec.options,
        });
        self.next_index = self.next_index.max(index + 1);
        self
    }

    /// Declare a parameter at the next free index.
    pub fn param(self, spec: ParamSpec) -> Self {
        let index = self.next_index;
        self.param_at(index, spec)
    }

    /// Inject the connection handle.
    pub fn connected_socket(self) -> Self {
        self.param(ParamSpec::new(ParamKind::ConnectedSocket))
    }

    /// Inject the messaging root.
    pub fn socket_io(self) -> Self {
        self.param(ParamSpec::new(ParamKind::SocketIo))
    }

    /// Inject a handshake query parameter.
    pub fn query_param(self, name: impl Into<String>) -> Self {
        self.param(ParamSpec::new(ParamKind::QueryParam(name.into())))
    }

    /// Inject the connection id.
    pub fn socket_id(self) -> Self {
        self.param(ParamSpec::new(ParamKind::SocketId))
    }

    /// Inject the upgrade request.
    pub fn socket_request(self) -> Self {
        self.param(ParamSpec::new(ParamKind::SocketRequest))
    }

    /// Inject the joined rooms.
    pub fn socket_rooms(self) -> Self {
        self.param(ParamSpec::new(ParamKind::SocketRooms))
    }

    /// Inject the message body.
    pub fn message_body(self, coercion: Coercion) -> Self {
        self.param(ParamSpec::new(ParamKind::MessageBody).coercion(coercion))
    }

    /// Inject the message body, with mapping options for this parameter.
    pub fn message_body_with(self, coercion: Coercion, options: MapOptions) -> Self {
        self.param(
            ParamSpec::new(ParamKind::MessageBody)
                .coercion(coercion)
                .options(options),
        )
    }

    /// Inject a custom value derived from the message body.
    pub fn custom(self, coercion: Coercion, transform: ParamTransform) -> Self {
        self.param(
            ParamSpec::new(ParamKind::Custom)
                .coercion(coercion)
                .transform(transform),
        )
    }

    /// Emit `event` with the handler's result after success.
    pub fn emit_on_success(self, event: impl Into<String>) -> Self {
        self.result(ResultKind::EmitOnSuccess(EmissionRule::new(event)))
    }

    /// Emit `event` after success, mapping the result with `options`.
    pub fn emit_on_success_with(self, event: impl Into<String>, options: MapOptions) -> Self {
        self.result(ResultKind::EmitOnSuccess(
            EmissionRule::new(event).with_options(options),
        ))
    }

    /// Emit `event` with the error after failure.
    pub fn emit_on_fail(self, event: impl Into<String>) -> Self {
        self.result(ResultKind::EmitOnFail(EmissionRule::new(event)))
    }

    /// Emit `event` after failure, mapping the payload with `options`.
    pub fn emit_on_fail_with(self, event: impl Into<String>, options: MapOptions) -> Self {
        self.result(ResultKind::EmitOnFail(
            EmissionRule::new(event).with_options(options),
        ))
    }

    /// Don't emit anything for empty results.
    pub fn skip_emit_on_empty_result(self) -> Self {
        self.result(ResultKind::SkipEmitOnEmptyResult)
    }
}

/// Declares a middleware's ordering.
pub struct MiddlewareDecl<'r> {
    registry: &'r mut MetadataRegistry,
    slot: usize,
}

impl<'r> MiddlewareDecl<'r> {
    pub(crate) fn new(registry: &'r mut MetadataRegistry, slot: usize) -> Self {
        Self { registry, slot }
    }

    /// Set the priority. Lower runs first.
    pub fn priority(self, priority: i32) -> Self {
        if let Some(record) = self.registry.middleware_mut(self.slot) {
            record.priority = Some(priority);
        }
        self
    }
}
