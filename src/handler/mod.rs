//! Request handler module
//!
//! Dispatch plus the API, static file and not-found handlers. Handlers share
//! a [`slot::ResponseSlot`]; the first to fill it answers the request.

pub mod api;
pub mod not_found;
pub mod resolve;
pub mod router;
pub mod slot;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
