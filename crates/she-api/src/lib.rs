//! HTTP surface of the exporter.
mod error;
pub use error::ApiError;

mod http;
pub use http::MetricsApi;
