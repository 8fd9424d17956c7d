//! Request handler module
//!
//! Route dispatch plus the two endpoint handlers: the JSON greeting and the blob proxy.

pub mod greeting;
pub mod proxy;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
