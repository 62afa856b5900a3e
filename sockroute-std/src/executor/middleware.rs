//! Middleware registration.

use super::Executor;
use sockroute_core::MiddlewareDescriptor;
use tracing::debug;

impl Executor {
    /// Register middlewares on the root, lowest priority first.
    ///
    /// The sort is stable, so equal priorities keep declaration order, and
    /// middlewares without a priority come before all others.
    pub(super) fn register_middlewares(&self, mut middlewares: Vec<MiddlewareDescriptor>) {
        middlewares.sort_by_key(|middleware| middleware.priority);

        for middleware in middlewares {
            debug!(
                middleware = %middleware.target,
                priority = ?middleware.priority,
                "registering middleware"
            );
            self.root.use_middleware(middleware.instance);
        }
    }
}
