//! Request handler module
//!
//! Dispatches requests to health checks and the lead webhook.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
