//! HTTP middleware for entity resources

pub mod cors;
pub mod https;

pub use cors::{cors_layer, exposed_headers, PREFLIGHT_MAX_AGE};
pub use https::{https_redirect, FORWARDED_PROTO_HEADER};
