//! # sockroute-core
//!
//! Core traits and descriptors for the Sockroute socket controller framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! transport adapters and extensions that don't need the full `sockroute-std`
//! implementation.
//!
//! # Layers
//!
//! ## Transport ([`Socket`], [`MessagingRoot`])
//!
//! The real-time messaging library, seen only through its listener and
//! emission surface. Adapters implement these traits for a concrete
//! transport.
//!
//! ## Interceptors ([`Middleware`])
//!
//! Connection-level checks that run before any controller listener is
//! attached to a connection.
//!
//! ## Descriptors ([`ControllerDescriptor`], [`ActionDescriptor`], ...)
//!
//! Immutable records describing which events a controller listens to, how
//! each handler parameter is resolved, and which events are emitted
//! afterwards.
//!
//! ## Handlers ([`ActionHandler`])
//!
//! The terminal point where business logic runs. Handlers receive resolved
//! [`Args`] and return anything implementing [`IntoOutcome`].
//!
//! # Error Types
//!
//! - [`SockrouteError`] - Top-level error type
//! - [`ConfigError`] - Declaration linkage errors
//! - [`DispatchError`] - Invocation errors
//! - [`ResolveError`] - Parameter resolution errors

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod args;
mod descriptor;
mod error;
mod handler;
mod mapper;
mod middleware;
mod socket;

// Re-exports
pub use args::{Arg, Args};
pub use descriptor::{
    ActionDescriptor, ActionKind, Coercion, ControllerDescriptor, EmissionRule,
    MiddlewareDescriptor, ParamDescriptor, ParamKind, ParamTransform,
};
pub use error::{
    ArgError, BoxError, ConfigError, DispatchError, Fault, ResolveError, SockrouteError,
};
pub use handler::{ActionHandler, DynActionHandler, IntoOutcome, Json, Outcome, SyncHandler};
pub use mapper::{MapOptions, Shape, Strategy, ValueMapper};
pub use middleware::{Middleware, MiddlewareFn};
pub use socket::{
    ConnectionHandler, DisconnectListener, EventListener, Handshake, MessagingRoot, RootRef,
    Socket, SocketRef,
};
