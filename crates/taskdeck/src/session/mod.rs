//! Resilient API access.
//!
//! [`SessionClient`] wraps the transport with the refresh-and-retry policy.

mod client;

pub use client::{SessionClient, SessionObserver};
