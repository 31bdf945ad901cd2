//! HTTP module
//!
//! The transport boundary and the resources that gate it.
//!
//! # Features
//!
//! - **Transport**: one request in, page body out; no retry at this layer
//! - **Concurrency Limiting**: shared permit pool bounding in-flight requests
//! - **Rate Limiting**: optional token bucket using governor

mod client;
mod limiter;
mod rate_limit;
mod types;

pub use client::{HttpTransport, HttpTransportConfig};
pub use limiter::{ConcurrencyLimiter, Permit};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use types::Transport;
