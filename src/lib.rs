//! cio-track: Async Rust client for the Customer.io Track API, with
//! integration hooks for push-notification opens and screen tracking.
//!
//! The [`TrackClient`] covers the four Track API operations (events, push
//! events, device add/delete) with Basic auth over the site:key combo. The
//! current customer is threaded explicitly through a [`Session`] handle.
//! The hooks in [`hooks`] observe host-app event sources over
//! `tokio::sync::watch` channels and call into the client.

pub mod client;
pub mod error;
pub mod hooks;
pub mod session;
pub mod transport;
pub mod types;

pub use client::{DEFAULT_BASE_URL, TrackClient};
pub use error::Error;
pub use session::Session;
pub use transport::TransportConfig;
