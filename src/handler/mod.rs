//! Request handler module
//!
//! Routing dispatch plus the location endpoint itself.

mod location;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
