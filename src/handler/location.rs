//! `POST /cloudflare` handler
//!
//! Validates the body and answers; there is nothing to do with a valid
//! request beyond acknowledging it.

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Request, Response};

use crate::config::AppState;
use crate::http;

pub async fn handle_location<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = req.into_parts();

    match state.validator.validate(&parts.headers, body).await {
        Ok(location) => {
            state
                .logger
                .debug(&format!("[Location] Accepted city: {}", location.city));
            http::build_ok_response()
        }
        Err(err) => {
            state.logger.debug(&format!("[Location] Rejected: {err:?}"));
            http::build_validation_error_response(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::logger::LogWriter;
    use crate::validation::MAX_BODY_BYTES;
    use std::sync::Arc;

    fn state() -> (AppState, Arc<LogWriter>) {
        let config = Config::load_from("does/not/exist", "does/not/exist.env").unwrap();
        let logger = Arc::new(LogWriter::in_memory());
        (AppState::new(config, Arc::clone(&logger)), logger)
    }

    #[tokio::test]
    async fn test_declared_length_over_cap() {
        let (state, _) = state();
        let req = Request::builder()
            .method("POST")
            .uri("/cloudflare")
            .header("Content-Length", (MAX_BODY_BYTES + 1).to_string())
            .body(Full::new(Bytes::from_static(br#"{"City": "Paris"}"#)))
            .unwrap();

        let resp = handle_location(req, &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_read_failure_is_500_and_logged() {
        let (state, logger) = state();
        let req = Request::builder()
            .method("POST")
            .uri("/cloudflare")
            .body(crate::validation::tests_support::FailingBody)
            .unwrap();

        let resp = handle_location(req, &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::INTERNAL_SERVER_ERROR);
        assert!(logger
            .captured_errors()
            .iter()
            .any(|line| line.contains("connection reset by peer")));
    }

    #[tokio::test]
    async fn test_accepted_city_is_logged_at_debug() {
        let (state, logger) = state();
        let req = Request::builder()
            .method("POST")
            .uri("/cloudflare")
            .body(Full::new(Bytes::from_static(br#"{"City": "Kyoto"}"#)))
            .unwrap();

        let resp = handle_location(req, &state).await;
        assert_eq!(resp.status(), hyper::StatusCode::OK);
        assert!(logger
            .captured_access()
            .contains(&"[DEBUG] [Location] Accepted city: Kyoto".to_string()));
    }
}
