// poolwatch-api: Async Rust client for the pool monitoring dashboard REST API

pub mod client;
pub mod endpoints;
pub mod error;
pub mod models;
pub mod normalize;
pub mod transport;

pub use client::{ApiClient, AuthHandle};
pub use endpoints::pools::PoolListQuery;
pub use error::Error;
pub use transport::TransportConfig;
