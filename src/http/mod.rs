//! HTTP protocol layer module
//!
//! Response builders shared by the request handler, decoupled from routing
//! and the GitHub client.

pub mod response;

// Re-export commonly used builders
pub use response::{
    build_400_response, build_500_response, build_badge_response, build_health_response,
    build_text_response,
};
