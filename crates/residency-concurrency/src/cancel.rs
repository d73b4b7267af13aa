//! Cooperative cancellation token.
//!
//! Grounded on the teacher's `knhk-workflow-engine` cancel-token:
//! `Arc<Inner>` + `tokio::sync::Notify` + hierarchical child tokens,
//! reused directly here for the spec's "shared atomic flag polled at
//! step boundaries" (§5). The Pipeline and Loop poll `is_cancelled()`
//! between steps/iterations rather than awaiting `cancelled()` inline,
//! since both run single-threaded and synchronously per invocation.
//!
//! # Example
//! ```no_run
//! use residency_concurrency::CancelToken;
//!
//! let token = CancelToken::new();
//! let child = token.child_token();
//! token.cancel();
//! assert!(child.is_cancelled());
//! ```

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<CancelTokenInner>,
}

struct CancelTokenInner {
    cancelled: RwLock<bool>,
    notify: Notify,
    parent: Option<CancelToken>,
    children: RwLock<Vec<CancelToken>>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(CancelTokenInner {
                cancelled: RwLock::new(false),
                notify: Notify::new(),
                parent: None,
                children: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Create a child token. When the parent is cancelled, all children
    /// are cancelled too.
    pub fn child_token(&self) -> Self {
        let child = Self {
            inner: Arc::new(CancelTokenInner {
                cancelled: RwLock::new(false),
                notify: Notify::new(),
                parent: Some(self.clone()),
                children: RwLock::new(Vec::new()),
            }),
        };
        self.inner.children.write().push(child.clone());
        child
    }

    pub fn cancel(&self) {
        *self.inner.cancelled.write() = true;
        self.inner.notify.notify_waiters();
        let children = self.inner.children.read().clone();
        for child in children {
            child.cancel();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        if *self.inner.cancelled.read() {
            return true;
        }
        match &self.inner.parent {
            Some(parent) => parent.is_cancelled(),
            None => false,
        }
    }

    /// Resolves once this token (or an ancestor) is cancelled.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        let notified = self.inner.notify.notified();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelling_a_parent_propagates_to_children() {
        let parent = CancelToken::new();
        let child = parent.child_token();
        assert!(!child.is_cancelled());
        parent.cancel();
        assert!(child.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_resolves_immediately_if_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(50), token.cancelled())
            .await
            .expect("already-cancelled token resolves without waiting");
    }
}
