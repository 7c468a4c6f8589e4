//! mapsmith Fetch Library
//!
//! Fetches the dynamic content collections (posts, categories, events,
//! authors) from the content API.
//!
//! # Modules
//!
//! - [`client`] - HTTP client with per-collection failure isolation
//! - [`decode`] - Validated decoding of collection responses

pub mod client;
pub mod decode;

pub use client::{ContentFetcher, ContentSource, FetchError};
pub use decode::{DecodeError, decode_collection, parse_timestamp};
