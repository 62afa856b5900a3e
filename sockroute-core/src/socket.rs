//! # Transport Seam
//!
//! Sockroute does not implement a transport. The real-time messaging library
//! is consumed only through the [`Socket`] and [`MessagingRoot`] traits:
//! listeners are registered with `on`, responses go out through `emit`.
//!
//! Callbacks hand back a [`BoxFuture`]. The host runtime decides how to
//! drive it (spawn it on its executor, or await it in place), so the
//! framework never picks a scheduler of its own.

use crate::{error::BoxError, middleware::Middleware};
use futures::future::BoxFuture;
use serde_json::Value;
use std::{
    collections::{BTreeSet, HashMap},
    sync::Arc,
};

/// Shared handle to a live connection.
pub type SocketRef = Arc<dyn Socket>;

/// Shared handle to the messaging root.
pub type RootRef = Arc<dyn MessagingRoot>;

/// Listener for a named message. Receives the payload, if any.
pub type EventListener = Arc<dyn Fn(Option<Value>) -> BoxFuture<'static, ()> + Send + Sync>;

/// Listener for the disconnect signal of one connection.
pub type DisconnectListener = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

/// Listener for new connections on a namespace.
pub type ConnectionHandler = Arc<dyn Fn(SocketRef) -> BoxFuture<'static, ()> + Send + Sync>;

/// The handshake a client performed when it connected.
#[derive(Debug, Clone, Default)]
pub struct Handshake {
    /// Query string parameters of the connection URL.
    pub query: HashMap<String, String>,
    /// Request headers, lower-cased names.
    pub headers: HashMap<String, String>,
    /// Remote address, when the transport knows it.
    pub address: Option<String>,
}

impl Handshake {
    /// Create an empty handshake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter.
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Add a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set the remote address.
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Look up a query parameter.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// One client's live link to the root or to one of its namespaces.
pub trait Socket: Send + Sync + 'static {
    /// Unique connection identifier.
    fn id(&self) -> &str;

    /// Namespace the connection belongs to (`/` for the root).
    fn namespace(&self) -> &str;

    /// The handshake data sent when connecting.
    fn handshake(&self) -> &Handshake;

    /// The underlying upgrade request.
    fn request(&self) -> Arc<http::Request<()>>;

    /// Rooms the connection currently belongs to.
    fn rooms(&self) -> BTreeSet<String>;

    /// Send a named event to this connection.
    fn emit(&self, event: &str, payload: Option<Value>) -> Result<(), BoxError>;

    /// Register a listener for a named message.
    fn on(&self, event: &str, listener: EventListener);

    /// Register a listener for the disconnect signal.
    fn on_disconnect(&self, listener: DisconnectListener);
}

/// The messaging library's root instance.
pub trait MessagingRoot: Send + Sync + 'static {
    /// Register a connection handler. `None` binds to the root namespace.
    fn on_connection(&self, namespace: Option<&str>, handler: ConnectionHandler);

    /// Register a connection-level interceptor. Interceptors run in
    /// registration order before any connection handler.
    fn use_middleware(&self, middleware: Arc<dyn Middleware>);
}
