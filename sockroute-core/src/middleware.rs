//! Connection-level interceptors.

use crate::{error::BoxError, socket::SocketRef};
use async_trait::async_trait;
use std::future::Future;

/// An interceptor that runs for every new connection before any controller
/// listener is attached.
///
/// Returning `Ok(())` lets the connection through; returning an error
/// rejects it, and the host transport reports the error to the client.
///
/// # Example
///
/// ```rust,ignore
/// struct RequireToken;
///
/// #[async_trait]
/// impl Middleware for RequireToken {
///     async fn handle(&self, socket: &SocketRef) -> Result<(), BoxError> {
///         match socket.handshake().query_param("token") {
///             Some(_) => Ok(()),
///             None => Err("missing token".into()),
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Middleware: Send + Sync + 'static {
    /// Inspect a new connection.
    async fn handle(&self, socket: &SocketRef) -> Result<(), BoxError>;
}

/// Closure adapter so `|socket| async { .. }` can be used as a middleware.
pub struct MiddlewareFn<F>(pub F);

#[async_trait]
impl<F, Fut> Middleware for MiddlewareFn<F>
where
    F: Fn(SocketRef) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), BoxError>> + Send,
{
    async fn handle(&self, socket: &SocketRef) -> Result<(), BoxError> {
        (self.0)(socket.clone()).await
    }
}
