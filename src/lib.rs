//! cachelab: a static file server for comparing HTTP caching strategies.
//!
//! One [`strategy::CacheStrategy`] is selected by configuration and applied to
//! every static resource. Requests flow through the dispatcher in
//! [`handler::router`], which resolves the resource path, lets the strategy
//! decide between `200` and `304`, and falls back to the not-found document
//! when nothing else answered.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
pub mod strategy;
