//! Domain rewrite for already generated output.
//!
//! Swaps the placeholder origin for the real one in `sitemap.xml` and points
//! the `Sitemap:` directive of `robots.txt` at the real sitemap URL, without
//! re-running the pipeline.

use std::{
    fs,
    path::{Path, PathBuf},
};

use mapsmith_core::PLACEHOLDER_ORIGIN;
use regex::{Captures, Regex};
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    build::{ROBOTS_FILE, SITEMAP_FILE},
    output::write_atomic,
};

/// Rewrite errors.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// Reading or writing a target file failed.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A rewrite pattern failed to compile.
    #[error("invalid rewrite pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Result type for rewrite operations.
pub type Result<T> = std::result::Result<T, RewriteError>;

/// What happened to one target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteOutcome {
    /// Content changed and was written back.
    Updated,
    /// Content already carried the configured domain.
    Unchanged,
    /// File does not exist.
    Missing,
}

/// Per-file outcomes of a rewrite run.
#[derive(Debug, Clone, Default)]
pub struct RewriteReport {
    pub files: Vec<(PathBuf, RewriteOutcome)>,
}

impl RewriteReport {
    /// Number of files written back.
    pub fn updated(&self) -> usize {
        self.files
            .iter()
            .filter(|(_, outcome)| *outcome == RewriteOutcome::Updated)
            .count()
    }
}

/// Rewrites generated files to a configured origin.
#[derive(Debug)]
pub struct DomainRewriter {
    origin: String,
    placeholder: Regex,
    sitemap_directive: Regex,
}

impl DomainRewriter {
    /// Create a rewriter replacing [`PLACEHOLDER_ORIGIN`] with `origin`.
    pub fn new(origin: &str) -> Result<Self> {
        Self::with_placeholder(origin, PLACEHOLDER_ORIGIN)
    }

    /// Create a rewriter replacing a custom placeholder origin.
    pub fn with_placeholder(origin: &str, placeholder: &str) -> Result<Self> {
        // the boundary keeps "https://a.com" from matching inside "https://a.com.au"
        let placeholder = Regex::new(&format!(
            r#"{}([/<"\s]|$)"#,
            regex::escape(placeholder.trim_end_matches('/'))
        ))?;
        let sitemap_directive = Regex::new(r"(?mi)^sitemap:[ \t]*\S*")?;

        Ok(Self {
            origin: origin.trim_end_matches('/').to_string(),
            placeholder,
            sitemap_directive,
        })
    }

    /// Replace every placeholder origin in sitemap XML.
    pub fn rewrite_sitemap(&self, xml: &str) -> String {
        self.placeholder
            .replace_all(xml, |caps: &Captures| format!("{}{}", self.origin, &caps[1]))
            .into_owned()
    }

    /// Point the `Sitemap:` directive at the configured origin.
    pub fn rewrite_robots(&self, robots: &str) -> String {
        let directive = format!("Sitemap: {}/{SITEMAP_FILE}", self.origin);
        self.sitemap_directive
            .replacen(robots, 1, regex::NoExpand(&directive))
            .into_owned()
    }

    /// Rewrite `sitemap.xml` and `robots.txt` inside `dir`.
    pub fn rewrite_dir(&self, dir: &Path) -> Result<RewriteReport> {
        let mut report = RewriteReport::default();

        let sitemap = dir.join(SITEMAP_FILE);
        let outcome = self.rewrite_file(&sitemap, |text| self.rewrite_sitemap(text))?;
        report.files.push((sitemap, outcome));

        let robots = dir.join(ROBOTS_FILE);
        let outcome = self.rewrite_file(&robots, |text| {
            if !self.sitemap_directive.is_match(text) {
                warn!("robots.txt has no Sitemap directive");
            }
            self.rewrite_robots(text)
        })?;
        report.files.push((robots, outcome));

        info!(updated = report.updated(), origin = %self.origin, "domain rewrite complete");
        Ok(report)
    }

    fn rewrite_file(
        &self,
        path: &Path,
        rewrite: impl FnOnce(&str) -> String,
    ) -> Result<RewriteOutcome> {
        if !path.exists() {
            warn!(path = %path.display(), "file not found, skipping");
            return Ok(RewriteOutcome::Missing);
        }

        let io_err = |source: std::io::Error| RewriteError::Io {
            path: path.to_path_buf(),
            source,
        };

        let original = fs::read_to_string(path).map_err(io_err)?;
        let rewritten = rewrite(&original);
        if rewritten == original {
            info!(path = %path.display(), "already up to date");
            return Ok(RewriteOutcome::Unchanged);
        }

        let (dir, name) = split_path(path);
        write_atomic(dir, name, &rewritten).map_err(io_err)?;
        info!(path = %path.display(), "updated domain");
        Ok(RewriteOutcome::Updated)
    }
}

fn split_path(path: &Path) -> (&Path, &str) {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    (dir, name)
}
