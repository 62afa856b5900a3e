//! # Executor
//!
//! Wires built descriptors into live listeners on a [`MessagingRoot`].
//!
//! Registration happens once, in [`Executor::execute`]. After that every
//! connection gets its listeners attached by the connection handler, and
//! every inbound event runs one independent invocation:
//!
//! 1. resolve all parameters concurrently
//! 2. call the handler
//! 3. emit the success or failure event
//!
//! Invocations are never serialized. Two messages arriving back to back on
//! the same connection run side by side, and a failing one does not affect
//! the other.

mod emit;
mod middleware;
mod params;

use crate::{
    config::ExecutorOptions,
    metadata::{MetadataBuilder, MetadataRegistry},
};
use futures::{
    FutureExt,
    future::{self, BoxFuture, join_all},
};
use serde_json::Value;
use sockroute_core::{
    ActionDescriptor, ActionKind, ConfigError, ControllerDescriptor, DispatchError,
    MessagingRoot, RootRef, SocketRef,
};
use std::sync::{Arc, Weak};
use tracing::{Instrument, debug, debug_span, error, info, warn};

pub use params::{coerce_boolean, coerce_number, is_truthy};

/// Registers controllers and middlewares on a messaging root.
///
/// # Example
///
/// ```rust,ignore
/// let executor = Executor::new(root.clone(), ExecutorOptions::default());
/// executor.execute(&registry, None, None)?;
/// ```
#[derive(Clone)]
pub struct Executor {
    root: RootRef,
    dispatch: Arc<Dispatch>,
}

/// State shared by every listener the executor registers.
///
/// Listeners live inside the root, so they only hold a weak reference back
/// to it.
struct Dispatch {
    root: Weak<dyn MessagingRoot>,
    options: ExecutorOptions,
}

impl Executor {
    /// Create an executor bound to `root`.
    pub fn new(root: RootRef, options: ExecutorOptions) -> Self {
        let dispatch = Arc::new(Dispatch {
            root: Arc::downgrade(&root),
            options,
        });
        Self { root, dispatch }
    }

    /// The messaging root.
    pub fn root(&self) -> &RootRef {
        &self.root
    }

    /// The executor's options.
    pub fn options(&self) -> &ExecutorOptions {
        &self.dispatch.options
    }

    /// Build the selected declarations and register them on the root.
    ///
    /// `None` selects every declared controller (or middleware). Nothing is
    /// registered if any declaration fails to build.
    pub fn execute(
        &self,
        registry: &MetadataRegistry,
        controllers: Option<&[&str]>,
        middlewares: Option<&[&str]>,
    ) -> Result<(), ConfigError> {
        let builder = MetadataBuilder::new(registry);
        let controllers = builder.build_controllers(controllers)?;
        let middlewares = builder.build_middlewares(middlewares)?;

        self.register_controllers(controllers);
        self.register_middlewares(middlewares);
        Ok(())
    }

    fn register_controllers(&self, controllers: Vec<ControllerDescriptor>) {
        let (root_bound, namespaced): (Vec<_>, Vec<_>) = controllers
            .into_iter()
            .partition(|controller| controller.namespace.is_none());

        if !root_bound.is_empty() {
            let actions = root_bound
                .into_iter()
                .flat_map(|controller| controller.actions)
                .collect();
            self.bind(None, actions);
        }

        for controller in namespaced {
            self.bind(controller.namespace.as_deref(), controller.actions.into());
        }
    }

    fn bind(&self, namespace: Option<&str>, actions: Arc<[Arc<ActionDescriptor>]>) {
        info!(
            namespace = namespace.unwrap_or("/"),
            actions = actions.len(),
            "registering socket controllers"
        );

        let dispatch = self.dispatch.clone();
        self.root.on_connection(
            namespace,
            Arc::new(move |socket: SocketRef| dispatch.clone().handle_connection(&actions, socket)),
        );
    }
}

impl Dispatch {
    /// Attach listeners for `actions` to a new connection.
    ///
    /// The returned future runs the connect actions.
    fn handle_connection(
        self: Arc<Self>,
        actions: &[Arc<ActionDescriptor>],
        socket: SocketRef,
    ) -> BoxFuture<'static, ()> {
        debug!(socket = socket.id(), namespace = socket.namespace(), "connection accepted");

        let weak = Arc::downgrade(&socket);
        let mut connects = Vec::new();
        for action in actions {
            match &action.kind {
                ActionKind::Connect => connects.push(action.clone()),
                ActionKind::Disconnect => {
                    let (dispatch, action, weak) = (self.clone(), action.clone(), weak.clone());
                    socket.on_disconnect(Arc::new(move || match weak.upgrade() {
                        Some(socket) => dispatch.clone().invoke(action.clone(), socket, None).boxed(),
                        None => {
                            debug!(
                                controller = %action.target,
                                method = %action.method,
                                "socket dropped before disconnect, skipping action"
                            );
                            future::ready(()).boxed()
                        }
                    }));
                }
                ActionKind::Message(event) => {
                    let (dispatch, action, weak) = (self.clone(), action.clone(), weak.clone());
                    socket.on(
                        event,
                        Arc::new(move |payload: Option<Value>| match weak.upgrade() {
                            Some(socket) => {
                                dispatch.clone().invoke(action.clone(), socket, payload).boxed()
                            }
                            None => {
                                debug!(
                                    controller = %action.target,
                                    method = %action.method,
                                    event = event_name(&action.kind),
                                    "socket dropped before message, skipping action"
                                );
                                future::ready(()).boxed()
                            }
                        }),
                    );
                }
            }
        }

        async move {
            join_all(
                connects
                    .into_iter()
                    .map(|action| self.clone().invoke(action, socket.clone(), None)),
            )
            .await;
        }
        .boxed()
    }

    /// Run one action and emit its outcome.
    async fn invoke(
        self: Arc<Self>,
        action: Arc<ActionDescriptor>,
        socket: SocketRef,
        payload: Option<Value>,
    ) {
        let span = debug_span!(
            "socket_action",
            controller = %action.target,
            method = %action.method,
            event = event_name(&action.kind),
            socket = socket.id(),
        );

        async {
            let failure = match self.run(&action, &socket, payload).await {
                Ok(result) => match self.emit_success(&action, &*socket, result) {
                    Ok(()) => return,
                    Err(err) => {
                        warn!(error = %err, "failed to map action result");
                        DispatchError::Mapping(err)
                    }
                },
                Err(err) => err,
            };
            self.emit_failure(&action, &*socket, &failure);
        }
        .instrument(span)
        .await
    }

    async fn run(
        &self,
        action: &ActionDescriptor,
        socket: &SocketRef,
        payload: Option<Value>,
    ) -> Result<Option<Value>, DispatchError> {
        let args = match self.resolve_params(action, socket, payload).await {
            Ok(args) => args,
            Err(err) => {
                error!(error = %err, "failed to resolve socket action parameters");
                return Err(err.into());
            }
        };

        action.handler.call_dyn(args).await.map_err(|err| {
            warn!(error = %err, "socket action failed");
            DispatchError::Handler(err)
        })
    }
}

fn event_name(kind: &ActionKind) -> &str {
    match kind {
        ActionKind::Connect => "connect",
        ActionKind::Disconnect => "disconnect",
        ActionKind::Message(event) => event,
    }
}
