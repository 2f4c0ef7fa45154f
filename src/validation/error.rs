//! Validation error taxonomy
//!
//! Every way a request body can fail to become a [`LocationRequest`] maps to
//! exactly one variant. The `Display` output is the message shown to the
//! client; [`ValidationError::status`] gives the HTTP status.
//!
//! [`LocationRequest`]: super::LocationRequest

use hyper::StatusCode;

/// Classified reason a request body was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body is not well-formed JSON
    #[error("Request body contains badly formed JSON (at position {offset})")]
    MalformedSyntax { offset: usize },

    /// The body ended in the middle of a JSON value
    #[error("Request body contains badly-formed JSON")]
    TruncatedInput,

    /// A value does not have the expected type.
    /// `field` is empty when the top-level value is not an object.
    #[error("Request body contains an invalid value for the \"{field}\" field (at position {offset})")]
    TypeMismatch { field: String, offset: usize },

    #[error("Request body contains an unknown field \"{field}\"")]
    UnknownField { field: String },

    #[error("Request body is missing the \"{field}\" field")]
    MissingField { field: String },

    #[error("Request body must not be empty")]
    EmptyBody,

    #[error("Request body must not be larger than {}", human_size(.limit))]
    TooLarge { limit: usize },

    #[error("Request body must contain a single JSON object")]
    TrailingData,

    /// Anything else. `detail` goes to the error log, never to the client.
    #[error("Internal Server Error")]
    Unclassified { detail: String },
}

impl ValidationError {
    /// HTTP status code for this error kind
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Unclassified { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    /// Whether the cause must be recorded server-side
    pub const fn needs_diagnostic(&self) -> bool {
        matches!(self, Self::Unclassified { .. })
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn human_size(limit: &usize) -> String {
    const KIB: usize = 1024;
    const MIB: usize = 1024 * 1024;

    match *limit {
        n if n >= MIB && n % MIB == 0 => format!("{}MB", n / MIB),
        n if n >= KIB && n % KIB == 0 => format!("{}KB", n / KIB),
        n => format!("{n} bytes"),
    }
}
