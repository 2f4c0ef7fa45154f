// Server module entry
// Listener setup, accept loop and graceful shutdown

pub mod connection;
pub mod listener;
pub mod signal;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::logger::{self, LogWriter};

pub use listener::create_listener;

/// How often the shutdown drain re-checks the connection counter
const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Bind the configured address and serve until a shutdown signal arrives
pub async fn run(config: Config, log: Arc<LogWriter>) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config.get_socket_addr()?;
    let listener = create_listener(addr)?;
    logger::log_server_start(&log, &listener.local_addr()?, &config);

    let state = Arc::new(AppState::new(config, log));
    signal::start_signal_handler(Arc::clone(&state));

    serve(listener, Arc::clone(&state)).await;
    drain_connections(&state).await;
    Ok(())
}

/// Accept loop; returns once `state.shutdown` is notified
pub async fn serve(listener: TcpListener, state: Arc<AppState>) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        connection::accept_connection(stream, peer_addr, &state);
                    }
                    Err(e) => {
                        state.logger.error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = state.shutdown.notified() => {
                logger::log_shutdown(
                    &state.logger,
                    state.active_connections.load(Ordering::SeqCst),
                );
                return;
            }
        }
    }
}

/// Wait for in-flight connections, up to the configured grace period
async fn drain_connections(state: &AppState) {
    let grace = Duration::from_secs(state.config.performance.shutdown_timeout);
    let deadline = tokio::time::Instant::now() + grace;

    loop {
        let active = state.active_connections.load(Ordering::SeqCst);
        if active == 0 {
            state.logger.info("[Shutdown] All connections closed");
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            state.logger.warn(&format!(
                "[Shutdown] Grace period of {}s elapsed with {active} connections still open",
                grace.as_secs()
            ));
            return;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::LogWriter;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;

    fn test_state() -> (Arc<AppState>, Arc<LogWriter>) {
        let config = Config::load_from("does/not/exist", "does/not/exist.env").unwrap();
        let logger = Arc::new(LogWriter::in_memory());
        (Arc::new(AppState::new(config, Arc::clone(&logger))), logger)
    }

    #[tokio::test]
    async fn test_serve_until_shutdown() {
        let (state, logger) = test_state();
        let listener = create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve(listener, Arc::clone(&state)));

        let mut client = TcpStream::connect(addr).await.unwrap();
        let body = r#"{"City": "Paris"}"#;
        let raw = format!(
            "POST /cloudflare HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        client.write_all(raw.as_bytes()).await.unwrap();
        let mut response = String::new();
        client.read_to_string(&mut response).await.unwrap();
        assert!(response.starts_with("HTTP/1.1 200 OK"), "{response}");

        state.shutdown.notify_one();
        server.await.unwrap();
        drain_connections(&state).await;

        assert_eq!(state.active_connections.load(Ordering::SeqCst), 0);
        assert!(logger
            .captured_access()
            .iter()
            .any(|l| l.starts_with("[Shutdown]")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_gives_up_after_grace_period() {
        let (state, logger) = test_state();
        state.active_connections.store(1, Ordering::SeqCst);

        drain_connections(&state).await;

        assert!(logger
            .captured_errors()
            .iter()
            .any(|l| l.contains("Grace period of 10s elapsed with 1 connections still open")));
    }
}
