//! # sockroute - Declarative Socket Controllers
//!
//! `sockroute` routes real-time socket events to plain async handlers.
//! Controllers, their actions, the parameters each handler receives and the
//! events emitted afterwards are declared on an explicit registry; an
//! [`Executor`] then wires them into listeners on a messaging root.
//!
//! The messaging library itself stays outside: it is reached only through
//! the [`Socket`] and [`MessagingRoot`] traits.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sockroute::prelude::*;
//!
//! let mut registry = MetadataRegistry::new();
//! let mut messages = registry.controller("MessageController").namespace("/messages");
//! messages
//!     .method("save", |args: Args| async move {
//!         let text: String = args.json(1)?;
//!         Ok::<_, BoxError>(json!({ "saved": text }))
//!     })
//!     .on_message("save")
//!     .connected_socket()
//!     .message_body(Coercion::Text)
//!     .emit_on_success("message_saved")
//!     .emit_on_fail("message_error");
//!
//! Executor::new(root, ExecutorOptions::default()).execute(&registry, None, None)?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use sockroute_core::{
    // Descriptors
    ActionDescriptor,
    ActionKind,
    // Handler
    ActionHandler,
    // Arguments
    Arg,
    ArgError,
    Args,
    // Error types
    BoxError,
    Coercion,
    ConfigError,
    // Transport
    ConnectionHandler,
    ControllerDescriptor,
    DisconnectListener,
    DispatchError,
    DynActionHandler,
    EmissionRule,
    EventListener,
    Fault,
    Handshake,
    IntoOutcome,
    Json,
    // Mapping
    MapOptions,
    MessagingRoot,
    // Middleware
    Middleware,
    MiddlewareDescriptor,
    MiddlewareFn,
    Outcome,
    ParamDescriptor,
    ParamKind,
    ParamTransform,
    ResolveError,
    RootRef,
    Shape,
    Socket,
    SocketRef,
    SockrouteError,
    Strategy,
    SyncHandler,
    ValueMapper,
};

pub use sockroute_std::{
    config::ExecutorOptions,
    executor::Executor,
    mapper::{IdentityMapper, PruneMapper},
    metadata::{
        ControllerDecl, MetadataBuilder, MetadataRegistry, MethodDecl, MiddlewareDecl, ParamSpec,
    },
};

pub use async_trait::async_trait;
pub use serde_json::{Value, json};

/// Declaration records, for code that builds registries by hand.
pub mod metadata {
    pub use sockroute_std::metadata::{
        ActionRecord, ControllerRecord, MethodBinding, MiddlewareRecord, ParamRecord, ResultKind,
        ResultRecord,
    };
}

/// Value coercion helpers used during parameter resolution.
pub mod coerce {
    pub use sockroute_std::executor::{coerce_boolean, coerce_number, is_truthy};
}

/// Testing utilities.
pub mod testing {
    pub use sockroute_std::testing::{Emission, MockRoot, MockSocket};
}

/// Prelude module - common imports for Sockroute.
///
/// # Usage
///
/// ```rust,ignore
/// use sockroute::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Handlers
        ActionHandler,
        Args,
        // Errors
        BoxError,
        // Declarations
        Coercion,
        ConfigError,
        // Runtime
        Executor,
        ExecutorOptions,
        Fault,
        IntoOutcome,
        Json,
        MapOptions,
        MessagingRoot,
        MetadataRegistry,
        Middleware,
        MiddlewareFn,
        ParamSpec,
        ParamTransform,
        Shape,
        Socket,
        SocketRef,
        SyncHandler,
        Value,
        async_trait,
        json,
    };
}
