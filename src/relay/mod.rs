//! Lead relay module
//!
//! Receives popup form leads, resolves the CRM listing id from the lookup
//! sheet and forwards the reshaped lead.

pub mod error;
pub mod handler;
pub mod lead;
pub mod mapping;
pub mod normalize;

pub use error::RelayError;
pub use handler::{Relay, RelayResponse};
