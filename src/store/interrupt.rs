//! Cancellation token for lock acquisition
//!
//! A caller blocked on a store lock can be released by triggering its
//! interrupt. The waiting call then fails with SEGSTORE_INTERRUPTED and
//! changes nothing.

use std::sync::Arc;

use tokio::sync::watch;

/// Cloneable interrupt flag. All clones share one state.
#[derive(Debug, Clone)]
pub struct Interrupt {
    state: Arc<watch::Sender<bool>>,
}

impl Interrupt {
    /// A fresh, untriggered interrupt.
    pub fn new() -> Self {
        let (state, _) = watch::channel(false);
        Self {
            state: Arc::new(state),
        }
    }

    /// Raises the interrupt and wakes every waiter.
    pub fn trigger(&self) {
        self.state.send_replace(true);
    }

    /// Lowers the interrupt so later calls may acquire again.
    pub fn clear(&self) {
        self.state.send_replace(false);
    }

    pub fn is_triggered(&self) -> bool {
        *self.state.borrow()
    }

    /// Completes once the interrupt is raised. Returns immediately if it
    /// already is.
    pub async fn triggered(&self) {
        let mut rx = self.state.subscribe();
        if rx.wait_for(|raised| *raised).await.is_err() {
            // The sender lives in `self`, so this is unreachable in practice
            std::future::pending::<()>().await;
        }
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}
