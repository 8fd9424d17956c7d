//! HTTP protocol layer module
//!
//! Response builders shared by the route handlers, decoupled from what the handlers do.

pub mod response;

// Re-export commonly used types
pub use response::{build_404_response, build_500_response, build_body_response, build_json_response};
