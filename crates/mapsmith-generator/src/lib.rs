//! mapsmith Generator Library
//!
//! Sitemap and robots.txt generation engine for mapsmith.
//!
//! # Modules
//!
//! - [`sitemap`] - XML sitemap generation
//! - [`robots`] - robots.txt generation
//! - [`build`] - Build orchestration with static-only fallback
//! - [`rewrite`] - Post-hoc domain rewrite of generated files
//! - [`output`] - Output file writing

pub mod build;
pub mod output;
pub mod rewrite;
pub mod robots;
pub mod sitemap;

pub use build::{BuildError, BuildStats, Builder, ROBOTS_FILE, SITEMAP_FILE};
pub use rewrite::{DomainRewriter, RewriteOutcome, RewriteReport};
pub use robots::RobotsGenerator;
pub use sitemap::{SitemapDocument, SitemapGenerator, SitemapUrl};
