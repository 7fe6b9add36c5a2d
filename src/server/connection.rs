// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use std::net::SocketAddr;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept and process a connection, checking limits and logging.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
pub fn accept_connection(stream: TcpStream, peer_addr: SocketAddr, state: &Arc<AppState>) {
    if let Err(active) = state.try_acquire_connection() {
        logger::log_warning(&format!(
            "Max connections reached: {active}/{}. Connection from {peer_addr} rejected.",
            state.config.performance.max_connections.unwrap_or_default()
        ));
        drop(stream);
        return;
    }

    logger::log_connection_accepted(&peer_addr);
    handle_connection(stream, peer_addr, Arc::clone(state));
}

/// Serve one connection in a spawned task.
///
/// Keep-alive follows `performance.keep_alive_timeout`; the whole
/// connection is bounded by the larger of the read and write timeouts.
/// On shutdown the in-flight request is finished and the connection is
/// then closed. The connection slot is released when the task ends.
fn handle_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    // Subscribe before spawning so a shutdown sent right after accept is not missed
    let mut shutdown_rx = state.subscribe_shutdown();

    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let performance = &state.config.performance;
        let timeout_duration = Duration::from_secs(std::cmp::max(
            performance.read_timeout,
            performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(performance.keep_alive_timeout > 0);

        let service_state = Arc::clone(&state);
        let mut conn = pin!(builder.serve_connection(
            io,
            service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
        ));

        let serve = async {
            let mut draining = false;
            loop {
                tokio::select! {
                    result = conn.as_mut() => break result,
                    _ = shutdown_rx.changed(), if !draining => {
                        draining = true;
                        conn.as_mut().graceful_shutdown();
                    }
                }
            }
        };

        match tokio::time::timeout(timeout_duration, serve).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }

        state.release_connection();
    });
}
