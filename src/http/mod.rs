//! HTTP protocol layer module
//!
//! Response builders shared by the router and the webhook endpoint.

pub mod response;

pub use response::{build_404_response, build_413_response, build_health_response, json_response};
