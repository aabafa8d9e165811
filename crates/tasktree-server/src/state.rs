//! Shared application state.

use std::sync::Arc;

use tokio::sync::RwLock;

use tasktree_core::TaskStore;

/// Shared application state.
///
/// The store's algorithms assume single-writer access; the RwLock provides
/// that discipline on a multi-threaded runtime. Handlers take the lock once
/// per request.
pub struct AppState {
    /// The task dependency store.
    pub store: RwLock<TaskStore>,
}

impl AppState {
    /// Create a new AppState wrapped in Arc.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            store: RwLock::new(TaskStore::new()),
        })
    }

    /// Get the number of tasks.
    pub async fn task_count(&self) -> usize {
        self.store.read().await.len()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            store: RwLock::new(TaskStore::new()),
        }
    }
}
