//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method/path matching, dispatch,
//! and one access log line per request.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response};

use super::location;
use crate::config::AppState;
use crate::http;
use crate::logger::AccessLogEntry;

/// The only registered route
pub const LOCATION_PATH: &str = "/cloudflare";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let started = Instant::now();
    let access_log = state.config.logging.access_log;
    let mut entry = access_log.then(|| AccessLogEntry::from_request(&req, peer_addr));

    let response = route_request(req, &state).await;

    if let Some(entry) = entry.as_mut() {
        let body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.finish(response.status().as_u16(), body_bytes, started.elapsed());
        state
            .logger
            .access(&entry.format(state.config.logging.access_log_format));
    }

    Ok(response)
}

/// Route request based on method and path
async fn route_request<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    if req.uri().path() != LOCATION_PATH {
        return http::build_404_response();
    }

    if req.method() == Method::POST {
        location::handle_location(req, state).await
    } else {
        state.logger.debug(&format!(
            "Method not allowed on {LOCATION_PATH}: {}",
            req.method()
        ));
        http::build_405_response("POST")
    }
}
