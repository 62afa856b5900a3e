#![allow(dead_code)]

use sockroute::{
    BoxError, Executor, ExecutorOptions, MetadataRegistry, Middleware, SocketRef, async_trait,
    testing::{MockRoot, MockSocket},
};
use std::sync::{Arc, Mutex};

// ============================================================================
// Setup
// ============================================================================

/// Register everything in `registry` on a fresh root.
pub fn serve(registry: &MetadataRegistry) -> Arc<MockRoot> {
    serve_with(registry, ExecutorOptions::default())
}

pub fn serve_with(registry: &MetadataRegistry, options: ExecutorOptions) -> Arc<MockRoot> {
    let root = MockRoot::new();
    Executor::new(root.clone(), options)
        .execute(registry, None, None)
        .unwrap();
    root
}

/// Connect a new root-namespace socket.
pub async fn connect(root: &MockRoot, id: &str) -> Arc<MockSocket> {
    let socket = Arc::new(MockSocket::new(id));
    root.connect(socket.clone()).await.unwrap();
    socket
}

// ============================================================================
// Recorders
// ============================================================================

/// Shared call log.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Middleware that records its name for every connection.
pub struct OrderRecordingMiddleware {
    pub name: &'static str,
    pub log: CallLog,
}

#[async_trait]
impl Middleware for OrderRecordingMiddleware {
    async fn handle(&self, _socket: &SocketRef) -> Result<(), BoxError> {
        self.log.push(self.name);
        Ok(())
    }
}
