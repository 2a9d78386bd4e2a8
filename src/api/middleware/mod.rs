//! HTTP middleware for request processing and protection.
//!
//! - [`auth`] - Bearer token gate for write routes
//! - [`tracing`] - Request/response logging

pub mod auth;
pub mod tracing;
