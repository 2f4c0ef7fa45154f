// Signal handling module
//
// Supported signals:
// - SIGTERM: Graceful shutdown
// - SIGINT:  Graceful shutdown (Ctrl+C)

use std::sync::Arc;

use crate::config::AppState;

/// Start signal handlers (Unix only)
///
/// Spawns a background task that waits for SIGTERM or SIGINT and then
/// notifies `state.shutdown`. Registration failures are logged; a missing
/// SIGTERM handler leaves Ctrl+C working.
#[cfg(unix)]
pub fn start_signal_handler(state: Arc<AppState>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(s) => Some(s),
            Err(e) => {
                state
                    .logger
                    .error(&format!("Failed to register SIGTERM handler: {e}"));
                None
            }
        };

        let terminate = async {
            match sigterm.as_mut() {
                Some(s) => {
                    s.recv().await;
                }
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = terminate => state.logger.info("[Signal] SIGTERM received, shutting down"),
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => state.logger.info("[Signal] SIGINT received, shutting down"),
                Err(e) => {
                    state.logger.error(&format!("Failed to listen for SIGINT: {e}"));
                    return;
                }
            },
        }

        state.shutdown.notify_one();
    });
}

/// Non-Unix fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(state: Arc<AppState>) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                state.logger.info("[Signal] Ctrl+C received, shutting down");
                state.shutdown.notify_one();
            }
            Err(e) => state
                .logger
                .error(&format!("Failed to listen for Ctrl+C: {e}")),
        }
    });
}
