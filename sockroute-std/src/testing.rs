//! Testing utilities for Sockroute.
//!
//! In-memory stand-ins for the messaging library, so controllers can be
//! exercised without a transport.
//!
//! # Features
//!
//! - [`MockRoot`]: records connection handlers and middlewares, and lets a
//!   test connect sockets through them
//! - [`MockSocket`]: records listeners and emissions, and lets a test send
//!   messages and disconnect
//! - [`Emission`]: one recorded `emit` call

use futures::future::join_all;
use serde_json::Value;
use sockroute_core::{
    BoxError, ConnectionHandler, DisconnectListener, EventListener, Handshake, MessagingRoot,
    Middleware, Socket, SocketRef,
};
use std::{
    collections::BTreeSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn normalize(namespace: &str) -> String {
    if namespace.starts_with('/') {
        namespace.to_owned()
    } else {
        format!("/{namespace}")
    }
}

// ============================================================================
// Mock Root
// ============================================================================

/// A messaging root that keeps everything registered on it.
///
/// # Example
///
/// ```rust,ignore
/// let root = MockRoot::new();
/// Executor::new(root.clone(), ExecutorOptions::default()).execute(&registry, None, None)?;
///
/// let socket = Arc::new(MockSocket::new("client-1"));
/// root.connect(socket.clone()).await?;
/// socket.receive("save", Some(json!({ "text": "hi" }))).await;
/// assert_eq!(socket.emitted_named("saved").len(), 1);
/// ```
#[derive(Default)]
pub struct MockRoot {
    handlers: Mutex<Vec<(String, ConnectionHandler)>>,
    middlewares: Mutex<Vec<Arc<dyn Middleware>>>,
}

impl MockRoot {
    /// Create an empty root.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Namespaces with a connection handler, in registration order.
    pub fn namespaces(&self) -> Vec<String> {
        lock(&self.handlers)
            .iter()
            .map(|(namespace, _)| namespace.clone())
            .collect()
    }

    /// Number of registered middlewares.
    pub fn middleware_count(&self) -> usize {
        lock(&self.middlewares).len()
    }

    /// Connect `socket` to its namespace.
    ///
    /// Connections to the root namespace pass through the middlewares first;
    /// the first one to fail rejects the connection and no handler runs.
    /// Handlers registered for the namespace then run in order.
    pub async fn connect(&self, socket: Arc<MockSocket>) -> Result<(), BoxError> {
        let socket_ref: SocketRef = socket.clone();

        if socket.namespace() == "/" {
            let middlewares = lock(&self.middlewares).clone();
            for middleware in middlewares {
                middleware.handle(&socket_ref).await?;
            }
        }

        let handlers: Vec<ConnectionHandler> = lock(&self.handlers)
            .iter()
            .filter(|(namespace, _)| namespace == socket.namespace())
            .map(|(_, handler)| handler.clone())
            .collect();
        for handler in handlers {
            handler(socket_ref.clone()).await;
        }
        Ok(())
    }
}

impl MessagingRoot for MockRoot {
    fn on_connection(&self, namespace: Option<&str>, handler: ConnectionHandler) {
        let namespace = normalize(namespace.unwrap_or("/"));
        lock(&self.handlers).push((namespace, handler));
    }

    fn use_middleware(&self, middleware: Arc<dyn Middleware>) {
        lock(&self.middlewares).push(middleware);
    }
}

// ============================================================================
// Mock Socket
// ============================================================================

/// One recorded emission.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Event name.
    pub event: String,
    /// Payload, `None` when emitted without one.
    pub payload: Option<Value>,
}

impl Emission {
    /// Create an emission record.
    pub fn new(event: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            event: event.into(),
            payload,
        }
    }
}

/// A connection that records listeners and emissions.
///
/// The socket starts in the root namespace, in a room named after its id.
pub struct MockSocket {
    id: String,
    namespace: String,
    handshake: Handshake,
    request: Arc<http::Request<()>>,
    rooms: Mutex<BTreeSet<String>>,
    listeners: Mutex<Vec<(String, EventListener)>>,
    disconnect_listeners: Mutex<Vec<DisconnectListener>>,
    emitted: Mutex<Vec<Emission>>,
}

impl MockSocket {
    /// Create a socket with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            rooms: Mutex::new(BTreeSet::from([id.clone()])),
            id,
            namespace: "/".to_owned(),
            handshake: Handshake::default(),
            request: Arc::new(http::Request::new(())),
            listeners: Mutex::default(),
            disconnect_listeners: Mutex::default(),
            emitted: Mutex::default(),
        }
    }

    /// Place the socket in a namespace.
    pub fn with_namespace(mut self, namespace: impl AsRef<str>) -> Self {
        self.namespace = normalize(namespace.as_ref());
        self
    }

    /// Set the handshake.
    pub fn with_handshake(mut self, handshake: Handshake) -> Self {
        self.handshake = handshake;
        self
    }

    /// Set the upgrade request.
    pub fn with_request(mut self, request: http::Request<()>) -> Self {
        self.request = Arc::new(request);
        self
    }

    /// Join a room before connecting.
    pub fn with_room(self, room: impl Into<String>) -> Self {
        self.join(room);
        self
    }

    /// Join a room.
    pub fn join(&self, room: impl Into<String>) {
        lock(&self.rooms).insert(room.into());
    }

    /// Deliver a message to every listener for `event`.
    ///
    /// The listeners run concurrently. Returns how many there were.
    pub async fn receive(&self, event: &str, payload: Option<Value>) -> usize {
        let listeners: Vec<EventListener> = lock(&self.listeners)
            .iter()
            .filter(|(name, _)| name == event)
            .map(|(_, listener)| listener.clone())
            .collect();

        join_all(listeners.iter().map(|listener| listener(payload.clone()))).await;
        listeners.len()
    }

    /// Fire the disconnect signal.
    pub async fn disconnect(&self) {
        let listeners = lock(&self.disconnect_listeners).clone();
        join_all(listeners.iter().map(|listener| listener())).await;
    }

    /// Remove and return the disconnect listeners, so a test can fire them
    /// after the socket itself is gone.
    pub fn take_disconnect_listeners(&self) -> Vec<DisconnectListener> {
        std::mem::take(&mut *lock(&self.disconnect_listeners))
    }

    /// Number of listeners registered for `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        lock(&self.listeners)
            .iter()
            .filter(|(name, _)| name == event)
            .count()
    }

    /// Every emission so far.
    pub fn emitted(&self) -> Vec<Emission> {
        lock(&self.emitted).clone()
    }

    /// Emissions of one event.
    pub fn emitted_named(&self, event: &str) -> Vec<Emission> {
        lock(&self.emitted)
            .iter()
            .filter(|emission| emission.event == event)
            .cloned()
            .collect()
    }

    /// Forget recorded emissions.
    pub fn clear_emitted(&self) {
        lock(&self.emitted).clear();
    }
}

impl Socket for MockSocket {
    fn id(&self) -> &str {
        &self.id
    }

    fn namespace(&self) -> &str {
        &self.namespace
    }

    fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    fn request(&self) -> Arc<http::Request<()>> {
        self.request.clone()
    }

    fn rooms(&self) -> BTreeSet<String> {
        lock(&self.rooms).clone()
    }

    fn emit(&self, event: &str, payload: Option<Value>) -> Result<(), BoxError> {
        lock(&self.emitted).push(Emission::new(event, payload));
        Ok(())
    }

    fn on(&self, event: &str, listener: EventListener) {
        lock(&self.listeners).push((event.to_owned(), listener));
    }

    fn on_disconnect(&self, listener: DisconnectListener) {
        lock(&self.disconnect_listeners).push(listener);
    }
}
