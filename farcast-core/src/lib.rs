#![warn(missing_docs)]
//! # farcast-core
//!
//! Data model for the Farcast API client.
//!
//! This crate defines the three request-lifecycle types that the rest of
//! the workspace moves around:
//!
//! - [`ApiRequest`] — a logical request as the caller describes it
//! - [`PreparedRequest`] — one concrete, sendable request produced by expansion
//! - [`ApiResponse`] — a materialized response, plus its serializable
//!   [`CachedResponse`] twin used by the conditional response cache
//!
//! It also provides [`CacheValue`], the expiry-carrying wrapper that the
//! storage layer (`farcast-backend`) stores and returns.
//!
//! Types here are plain data: no I/O, no caching policy. The lifecycle
//! logic lives in the `farcast` crate.

pub mod request;
pub mod response;
pub mod value;

pub use request::{ApiRequest, PreparedRequest};
pub use response::{ApiResponse, CachedResponse};
pub use value::CacheValue;

#[doc(hidden)]
pub use smol_str::SmolStr;
