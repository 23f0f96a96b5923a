//! HTTP handlers for the sketch service.

pub mod health;
pub mod upload;

pub use health::{health_check, metrics_handler, readiness_check, root};
pub use upload::upload_sketch;
