//! HTTP API: routing, handlers, request/response mapping, middleware.

pub mod app;
pub mod middleware;
