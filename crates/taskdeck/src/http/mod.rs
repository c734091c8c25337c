//! HTTP transport implementation.
//!
//! This module issues single API calls. Retry and refresh policy live in
//! [`crate::session`].

mod client;
pub(crate) mod endpoints;
mod request;

pub use client::HttpTransport;
pub use request::{ApiRequest, MultipartPayload, RequestBody};
