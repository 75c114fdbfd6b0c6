//! Request handler module
//!
//! Orchestrates one badge request: route, fetch the reaction count, render
//! the badge and write the response.

pub mod router;

// Re-export main entry point
pub use router::handle_request;
