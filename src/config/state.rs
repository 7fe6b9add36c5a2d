// Application state module
// Immutable per-process state shared by every connection

use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::watch;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Whether a chart font was registered at startup
    pub chart_labels: bool,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
    /// Flipped to `true` once when the server starts shutting down
    shutdown: watch::Sender<bool>,
}

impl AppState {
    pub fn new(config: Config, chart_labels: bool) -> Self {
        Self {
            config,
            chart_labels,
            active_connections: AtomicUsize::new(0),
            shutdown: watch::Sender::new(false),
        }
    }

    /// Receiver that sees the next shutdown request
    pub fn subscribe_shutdown(&self) -> watch::Receiver<bool> {
        self.shutdown.subscribe()
    }

    /// Tell every subscribed connection to finish up
    pub fn begin_shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    /// Reserve a connection slot, honoring `performance.max_connections`
    ///
    /// Returns the number of connections that were active before this one.
    /// On rejection the counter is left unchanged.
    pub fn try_acquire_connection(&self) -> Result<usize, usize> {
        // Increment first, then check, so two racing accepts cannot both slip in
        let prev = self.active_connections.fetch_add(1, Ordering::SeqCst);
        if let Some(max_conn) = self.config.performance.max_connections {
            if prev >= usize::try_from(max_conn).unwrap_or(usize::MAX) {
                self.active_connections.fetch_sub(1, Ordering::SeqCst);
                return Err(prev);
            }
        }
        Ok(prev)
    }

    pub fn release_connection(&self) {
        self.active_connections.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_limit() {
        let mut config = Config::default();
        config.performance.max_connections = Some(2);
        let state = AppState::new(config, false);

        assert_eq!(state.try_acquire_connection(), Ok(0));
        assert_eq!(state.try_acquire_connection(), Ok(1));
        assert_eq!(state.try_acquire_connection(), Err(2));
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 2);

        state.release_connection();
        assert_eq!(state.try_acquire_connection(), Ok(1));
    }

    #[tokio::test]
    async fn test_shutdown_reaches_subscribers() {
        let state = AppState::new(Config::default(), false);
        let mut rx = state.subscribe_shutdown();
        assert!(!*rx.borrow());

        state.begin_shutdown();
        rx.changed().await.unwrap();
        assert!(*rx.borrow());
    }

    #[test]
    fn test_unlimited_by_default() {
        let state = AppState::new(Config::default(), false);
        for expected in 0..100 {
            assert_eq!(state.try_acquire_connection(), Ok(expected));
        }
    }
}
