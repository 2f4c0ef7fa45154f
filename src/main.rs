use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod server;
mod validation;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let cfg = match std::env::args().nth(1) {
        Some(path) => config::Config::load_from(&path, config::DEFAULT_ENV_FILE)?,
        None => config::Config::load()?,
    };
    let log = Arc::new(logger::init(&cfg)?);

    // Worker threads follow `server.workers`, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
        log.debug(&format!("[Config] Using {workers} worker threads"));
    } else {
        log.debug("[Config] Using default worker threads (CPU cores)");
    }

    let runtime = runtime_builder.build()?;

    runtime.block_on(server::run(cfg, log))
}
