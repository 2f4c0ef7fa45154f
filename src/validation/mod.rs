//! Request body validation
//!
//! Turns a raw request body into a [`LocationRequest`] or a classified
//! [`ValidationError`]. The size cap is enforced while buffering, before any
//! JSON is looked at.

mod body;
mod decode;
mod error;

use std::sync::Arc;

use hyper::body::Body;
use hyper::HeaderMap;

use crate::logger::LogWriter;

pub use decode::LocationRequest;
pub use error::ValidationError;

/// Largest accepted request body (1MB)
pub const MAX_BODY_BYTES: usize = 1_048_576;

/// Validates request bodies against the `LocationRequest` shape.
///
/// Unclassified failures are written to the injected log writer; the client
/// only ever sees a generic message for those.
pub struct RequestValidator {
    max_bytes: usize,
    diagnostics: Arc<LogWriter>,
}

impl RequestValidator {
    pub const fn new(max_bytes: usize, diagnostics: Arc<LogWriter>) -> Self {
        Self {
            max_bytes,
            diagnostics,
        }
    }

    /// Buffer `body` under the size cap and decode it
    pub async fn validate<B>(
        &self,
        headers: &HeaderMap,
        body: B,
    ) -> Result<LocationRequest, ValidationError>
    where
        B: Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let bytes = body::read_capped(headers, body, self.max_bytes)
            .await
            .map_err(|e| self.report(e))?;
        self.validate_bytes(&bytes)
    }

    /// Validate an already buffered body
    pub fn validate_bytes(&self, bytes: &[u8]) -> Result<LocationRequest, ValidationError> {
        if bytes.len() > self.max_bytes {
            return Err(ValidationError::TooLarge {
                limit: self.max_bytes,
            });
        }
        decode::decode_single(bytes).map_err(|e| self.report(e))
    }

    fn report(&self, err: ValidationError) -> ValidationError {
        if err.needs_diagnostic() {
            self.diagnostics
                .error(&format!("[Validation] Unclassified request body error: {err:?}"));
        }
        err
    }
}
