//! REST API layer for HTTP request/response handling.
//!
//! # Modules
//!
//! - [`dto`] - Data Transfer Objects for request/response serialization
//! - [`handlers`] - Controller actions and the health endpoint
//! - [`middleware`] - Auth gate and request tracing
//! - [`routes`] - The post route table

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod routes;
