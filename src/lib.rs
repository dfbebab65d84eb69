//! `misty-http` is an async HTTP client for the Misty robot REST API.
//!
//! Every call made through [`MistyClient`] is:
//! - gated by a token bucket shared by the whole client ([`RateLimiter`]),
//! - bounded by a deadline carried in a [`CallContext`],
//! - retried with a flat delay when no response could be obtained.
//!
//! Requests are issued with [`MistyClient::get`], [`MistyClient::post`], or
//! [`MistyClient::new_request`] followed by [`MistyClient::send`].

mod client;
mod context;
mod display;
mod error;
mod limiter;
mod options;
mod request;

pub mod config;
pub mod deadline;
pub mod version;

pub use client::{addr_to_base_url, MistyClient};
pub use config::{Config, ConfigFile};
pub use context::CallContext;
pub use display::{DisplayService, LedColor};
pub use error::MistyError;
pub use limiter::RateLimiter;
pub use options::{ClientOptions, DEFAULT_CONNECT_TIMEOUT};
pub use request::{CallRequest, Credentials};
pub use version::VersionInfo;

pub use reqwest::{Method, Response, StatusCode};
pub use tokio_util::sync::CancellationToken;

pub type Result<T> = std::result::Result<T, MistyError>;
