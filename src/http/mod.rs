//! HTTP protocol layer module
//!
//! Validators, HTTP dates, content types and response builders. Nothing here
//! knows which caching strategy is active.

pub mod cache;
pub mod date;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cache::{fingerprint, FingerprintAlgorithm, ValidationMode};
pub use date::LastModified;
pub use response::{
    build_304_response, build_404_response, build_fresh_response, build_json_response,
    build_not_found_document,
};
