//! Transport layer for serving the recommendation feed.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::HttpFeed;
