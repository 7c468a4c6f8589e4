//! mapsmith Core Library
//!
//! Core types, route registry, configuration, and error handling for the
//! mapsmith sitemap generator.

pub mod config;
pub mod content;
pub mod error;
pub mod routes;

pub use config::{Config, PLACEHOLDER_ORIGIN};
pub use content::{ApiResultSet, ContentItem, ContentKind};
pub use error::{CoreError, Result};
pub use routes::{ChangeFreq, ExclusionPattern, RouteEntry, RouteRegistry};
