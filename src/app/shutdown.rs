//! Graceful shutdown handling.
//!
//! A cloneable flag shared between the Ctrl-C task and the frame loop. The
//! loop checks it before every physics step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct ShutdownManager {
    shutdown_requested: Arc<AtomicBool>,
}

impl Default for ShutdownManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self {
            shutdown_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Requests shutdown. Every clone observes it.
    pub fn request_shutdown(&self) {
        self.shutdown_requested.store(true, Ordering::SeqCst);
        tracing::info!("Shutdown requested");
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.shutdown_requested.load(Ordering::SeqCst)
    }

    /// Spawns a task that requests shutdown on Ctrl-C.
    /// Must be called from inside a tokio runtime.
    pub fn listen_for_ctrl_c(&self) {
        let manager = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Ctrl+C received, stopping after the current frame...");
                manager.request_shutdown();
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_manager_new() {
        let manager = ShutdownManager::new();
        assert!(!manager.is_shutdown_requested());
    }

    #[test]
    fn test_shutdown_request_reaches_clones() {
        let manager = ShutdownManager::new();
        let observer = manager.clone();
        manager.request_shutdown();
        assert!(observer.is_shutdown_requested());
    }

    #[tokio::test]
    async fn test_listener_does_not_fire_on_its_own() {
        let manager = ShutdownManager::new();
        manager.listen_for_ctrl_c();
        tokio::task::yield_now().await;
        assert!(!manager.is_shutdown_requested());
    }
}
