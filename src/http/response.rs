//! HTTP response building module
//!
//! Every body this server writes is JSON, including error bodies, so clients
//! can rely on `Content-Type: application/json` for all responses.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

use crate::validation::ValidationError;

const JSON: &str = "application/json";

/// Fixed body of the catch-all 404
pub const NOT_FOUND_BODY: &str = r#"{"message": "404"}"#;

/// Error body: `{"message": "..."}`
#[derive(Debug, Serialize)]
struct MessageBody<'a> {
    message: &'a str,
}

/// Build a JSON response from any serializable value
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => finish(json_builder(status), Bytes::from(json)),
        Err(_) => finish(
            json_builder(StatusCode::INTERNAL_SERVER_ERROR),
            Bytes::from_static(br#"{"message": "Internal Server Error"}"#),
        ),
    }
}

/// Build a `{"message": ...}` response
pub fn message_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &MessageBody { message })
}

/// Map a validation failure to its status and client-facing message
pub fn build_validation_error_response(err: &ValidationError) -> Response<Full<Bytes>> {
    message_response(err.status(), &err.to_string())
}

/// Successful validation: bare 200, no payload
pub fn build_ok_response() -> Response<Full<Bytes>> {
    finish(json_builder(StatusCode::OK), Bytes::new())
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    finish(
        json_builder(StatusCode::NOT_FOUND),
        Bytes::from_static(NOT_FOUND_BODY.as_bytes()),
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &'static str) -> Response<Full<Bytes>> {
    let mut resp = message_response(StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed");
    resp.headers_mut()
        .insert(ALLOW, HeaderValue::from_static(allow));
    resp
}

fn json_builder(status: StatusCode) -> Builder {
    Response::builder().status(status).header(CONTENT_TYPE, JSON)
}

/// Attach the body; an invalid builder degrades to a bare 500
fn finish(builder: Builder, body: Bytes) -> Response<Full<Bytes>> {
    builder.body(Full::new(body)).unwrap_or_else(|_| {
        let mut resp = Response::new(Full::new(Bytes::new()));
        *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        resp
    })
}
