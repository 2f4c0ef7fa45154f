// Application state module
// Everything a connection task needs, shared behind one Arc

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::logger::LogWriter;
use crate::validation::{RequestValidator, MAX_BODY_BYTES};

/// Application state
pub struct AppState {
    pub config: Config,
    pub logger: Arc<LogWriter>,
    pub validator: RequestValidator,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
    /// Fired once when the process should stop accepting connections
    pub shutdown: Notify,
}

impl AppState {
    pub fn new(config: Config, logger: Arc<LogWriter>) -> Self {
        let validator = RequestValidator::new(MAX_BODY_BYTES, Arc::clone(&logger));
        Self {
            config,
            logger,
            validator,
            active_connections: AtomicUsize::new(0),
            shutdown: Notify::new(),
        }
    }
}
