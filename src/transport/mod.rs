//! Pluggable HTTP transports.
//!
//! [`HttpClient`] is the seam every request goes through. [`BasicClient`]
//! talks to the network; [`ApiKey`] wraps any other transport and
//! authenticates each request with the `x-apikey` header.

mod api_key;
mod basic;
mod client;

pub use api_key::{API_KEY_HEADER, ApiKey};
pub use basic::BasicClient;
pub use client::HttpClient;
