// Server loop module
// Accepts connections until shutdown is requested

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use super::connection::accept_connection;
use crate::config::AppState;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Accept connections until `shutdown` is notified, then drain
///
/// Open connections are told to finish their current request and close.
/// Returns once none are left, or after the connection timeout.
#[allow(clippy::ignored_unit_patterns)]
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>, shutdown: Arc<Notify>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => accept_connection(stream, peer_addr, &state),
                    Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
                }
            }

            _ = shutdown.notified() => {
                logger::log_shutdown(state.active_connections.load(Ordering::SeqCst));
                break;
            }
        }
    }

    drop(listener);
    state.begin_shutdown();
    drain_connections(&state).await;
}

/// Wait for in-flight connections, bounded by the connection timeout
async fn drain_connections(state: &AppState) {
    let performance = &state.config.performance;
    let deadline = tokio::time::Instant::now()
        + Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 {
            return;
        }
        tokio::select! {
            () = tokio::time::sleep(DRAIN_POLL_INTERVAL) => {}
            () = tokio::time::sleep_until(deadline) => {
                logger::log_warning(&format!(
                    "Shutdown drain timed out with {active} connection(s) still open"
                ));
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::server::create_listener;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn test_serves_http_and_stops_on_shutdown() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = Config::default();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config, false));
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(start_server_loop(listener, state, Arc::clone(&shutdown)));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.ends_with("ok"));

        shutdown.notify_one();
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_closes_idle_keep_alive_connection() {
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();

        let mut config = Config::default();
        config.logging.access_log = false;
        let state = Arc::new(AppState::new(config, false));
        let shutdown = Arc::new(Notify::new());
        let server = tokio::spawn(start_server_loop(
            listener,
            Arc::clone(&state),
            Arc::clone(&shutdown),
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /healthz HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        let mut response = Vec::new();
        let mut buf = [0u8; 1024];
        while !response.ends_with(b"ok") {
            let n = stream.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before the response finished");
            response.extend_from_slice(&buf[..n]);
        }
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 1);

        shutdown.notify_one();
        tokio::time::timeout(Duration::from_secs(5), server)
            .await
            .expect("server did not drain")
            .unwrap();
        assert_eq!(state.active_connections.load(Ordering::SeqCst), 0);
        assert_eq!(stream.read(&mut buf).await.unwrap(), 0);
    }
}
