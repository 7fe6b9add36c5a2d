//! Request handler module
//!
//! Responsible for request routing dispatch and running the climate data
//! pipeline behind each route.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
