//! Robots.txt generation.
//!
//! Generates the robots.txt file for search engine crawlers.

use std::fmt::Write;

use mapsmith_core::Config;
use tracing::debug;

/// Robots.txt generator.
#[derive(Debug)]
pub struct RobotsGenerator<'a> {
    config: &'a Config,
}

impl<'a> RobotsGenerator<'a> {
    /// Create a new robots generator.
    #[must_use]
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Generate robots.txt content.
    pub fn generate(&self) -> String {
        debug!("generating robots.txt");

        let mut out = String::from("User-agent: *\n");

        // writing into a String cannot fail
        for path in &self.config.robots.allow {
            let _ = writeln!(out, "Allow: {path}");
        }

        for path in &self.config.robots.disallow {
            let _ = writeln!(out, "Disallow: {path}");
        }

        out.push('\n');
        let _ = writeln!(out, "Sitemap: {}", self.config.sitemap_url());

        out
    }
}
