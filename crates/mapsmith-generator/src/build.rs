//! Build orchestration.
//!
//! Coordinates a generation run: fetch dynamic content, merge it with the
//! static route registry, and write `sitemap.xml` and `robots.txt`.

use std::{
    path::{Path, PathBuf},
    time::Instant,
};

use chrono::{NaiveDate, Utc};
use mapsmith_core::{ApiResultSet, Config, ContentKind, CoreError};
use mapsmith_fetch::ContentSource;
use thiserror::Error;
use tracing::{error, info};

use crate::{
    output::write_atomic,
    robots::RobotsGenerator,
    sitemap::{SitemapDocument, SitemapGenerator},
};

/// Sitemap file name.
pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Robots file name.
pub const ROBOTS_FILE: &str = "robots.txt";

/// Build errors.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Writing an output file failed.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration or route registry error.
    #[error("config error: {0}")]
    Config(#[from] CoreError),
}

/// Result type for build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Build statistics.
#[derive(Debug, Clone, Default)]
pub struct BuildStats {
    /// Static routes written.
    pub static_routes: usize,

    /// Static routes removed by exclusion patterns.
    pub excluded_routes: usize,

    /// Dynamic entries written per collection.
    pub dynamic: Vec<(ContentKind, usize)>,

    /// Dynamic items without a usable identifier.
    pub skipped_items: usize,

    /// Entries dropped because their location was already present.
    pub duplicates: usize,

    /// Whether dynamic content was unavailable and only static routes were
    /// written.
    pub fallback: bool,

    /// Written files.
    pub files: Vec<PathBuf>,

    /// Build duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildStats {
    /// Total number of `<url>` entries written.
    pub fn total_urls(&self) -> usize {
        self.static_routes + self.dynamic.iter().map(|(_, n)| n).sum::<usize>()
    }
}

/// Rendered output of a run, before it is written.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Sitemap XML.
    pub sitemap: String,

    /// robots.txt text.
    pub robots: String,
}

/// Sitemap builder that orchestrates a generation run.
#[derive(Debug)]
pub struct Builder {
    config: Config,
    output_dir: PathBuf,
    generation_date: NaiveDate,
}

impl Builder {
    /// Create a new builder writing into the configured output directory.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let output_dir = PathBuf::from(&config.site.output_dir);
        Self {
            config,
            output_dir,
            generation_date: Utc::now().date_naive(),
        }
    }

    /// Override the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Override the date stamped on entries without their own timestamp.
    #[must_use]
    pub fn with_generation_date(mut self, date: NaiveDate) -> Self {
        self.generation_date = date;
        self
    }

    /// Output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the full pipeline with dynamic content from `source`.
    ///
    /// A fetcher-level failure is logged and the run continues with static
    /// routes only.
    pub async fn build(&self, source: &dyn ContentSource) -> Result<BuildStats> {
        let start = Instant::now();
        info!(output = %self.output_dir.display(), "starting sitemap build");

        let dynamic = match source.fetch_all().await {
            Ok(results) => Some(results),
            Err(e) => {
                error!(error = %e, "dynamic content unavailable, falling back to static routes");
                None
            }
        };

        self.finish(dynamic.as_ref(), start)
    }

    /// Run the pipeline with static routes only.
    pub fn build_static(&self) -> Result<BuildStats> {
        let start = Instant::now();
        info!(output = %self.output_dir.display(), "starting static sitemap build");

        self.finish(None, start)
    }

    fn finish(&self, dynamic: Option<&ApiResultSet>, start: Instant) -> Result<BuildStats> {
        let mut stats = BuildStats::default();
        let rendered = self.render(dynamic, &mut stats)?;

        stats.files.push(self.write(SITEMAP_FILE, &rendered.sitemap)?);
        stats.files.push(self.write(ROBOTS_FILE, &rendered.robots)?);
        stats.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            static_routes = stats.static_routes,
            excluded = stats.excluded_routes,
            total_urls = stats.total_urls(),
            duplicates = stats.duplicates,
            fallback = stats.fallback,
            duration_ms = stats.duration_ms,
            "build complete"
        );

        Ok(stats)
    }

    /// Render sitemap and robots text without touching the filesystem.
    ///
    /// `None` means static-only mode.
    pub fn render(
        &self,
        dynamic: Option<&ApiResultSet>,
        stats: &mut BuildStats,
    ) -> Result<Rendered> {
        let registry = self.config.registry()?;
        let generator = SitemapGenerator::new(&self.config, self.generation_date);
        let mut doc = SitemapDocument::new();

        let counts = generator.add_static(&mut doc, &registry);
        stats.static_routes = counts.added;
        stats.excluded_routes = counts.skipped;

        match dynamic {
            Some(results) => {
                for kind in ContentKind::ALL {
                    let counts = generator.add_collection(&mut doc, results, kind);
                    stats.dynamic.push((kind, counts.added));
                    stats.skipped_items += counts.skipped;
                }
            }
            None => stats.fallback = true,
        }

        stats.duplicates = doc.duplicates();

        Ok(Rendered {
            sitemap: generator.generate(&doc),
            robots: RobotsGenerator::new(&self.config).generate(),
        })
    }

    fn write(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = write_atomic(&self.output_dir, name, contents).map_err(|source| {
            BuildError::Write {
                path: self.output_dir.join(name),
                source,
            }
        })?;

        info!(path = %path.display(), "generated {name}");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use async_trait::async_trait;
    use mapsmith_core::ContentItem;
    use mapsmith_fetch::FetchError;
    use tempfile::TempDir;

    use super::*;

    struct FixedSource(ApiResultSet);

    #[async_trait]
    impl ContentSource for FixedSource {
        async fn fetch_all(&self) -> mapsmith_fetch::client::Result<ApiResultSet> {
            Ok(self.0.clone())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl ContentSource for BrokenSource {
        async fn fetch_all(&self) -> mapsmith_fetch::client::Result<ApiResultSet> {
            Err(FetchError::Status {
                kind: ContentKind::Posts,
                status: 502,
            })
        }
    }

    fn test_config() -> Config {
        let mut config = Config::default();
        config.site.origin = Some("https://example.com".to_string());
        config
    }

    fn builder(output: &Path) -> Builder {
        Builder::new(test_config())
            .with_output_dir(output)
            .with_generation_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())
    }

    #[test]
    fn test_build_static() {
        let output_dir = TempDir::new().unwrap();
        let stats = builder(output_dir.path()).build_static().unwrap();

        assert!(stats.fallback);
        assert!(stats.dynamic.is_empty());
        assert!(stats.excluded_routes > 0);
        assert_eq!(stats.files.len(), 2);
        assert!(output_dir.path().join(SITEMAP_FILE).exists());
        assert!(output_dir.path().join(ROBOTS_FILE).exists());
    }

    #[tokio::test]
    async fn test_build_with_dynamic_content() {
        let output_dir = TempDir::new().unwrap();
        let source = FixedSource(ApiResultSet {
            posts: vec![ContentItem::new("hello", None)],
            events: vec![ContentItem::new("meetup", None), ContentItem::default()],
            ..Default::default()
        });

        let stats = builder(output_dir.path()).build(&source).await.unwrap();

        assert!(!stats.fallback);
        assert_eq!(stats.skipped_items, 1);
        assert_eq!(
            stats.dynamic,
            vec![
                (ContentKind::Posts, 1),
                (ContentKind::Categories, 0),
                (ContentKind::Events, 1),
                (ContentKind::Authors, 0),
            ]
        );

        let xml = fs::read_to_string(output_dir.path().join(SITEMAP_FILE)).unwrap();
        assert!(xml.contains("<loc>https://example.com/blog/hello</loc>"));
        assert!(xml.contains("<loc>https://example.com/events/meetup</loc>"));
        assert_eq!(xml.matches("<url>").count(), stats.total_urls());
    }

    #[tokio::test]
    async fn test_fetcher_failure_falls_back_to_static() {
        let output_dir = TempDir::new().unwrap();
        let b = builder(output_dir.path());

        let stats = b.build(&BrokenSource).await.unwrap();
        assert!(stats.fallback);

        let fallback_xml = fs::read_to_string(output_dir.path().join(SITEMAP_FILE)).unwrap();
        b.build_static().unwrap();
        let static_xml = fs::read_to_string(output_dir.path().join(SITEMAP_FILE)).unwrap();
        assert_eq!(fallback_xml, static_xml);
    }

    #[test]
    fn test_static_route_wins_over_dynamic_duplicate() {
        let mut config = test_config();
        config.routes.push(mapsmith_core::RouteEntry::new(
            "/blog/pinned",
            mapsmith_core::ChangeFreq::Monthly,
            0.9,
        ));
        let b = Builder::new(config)
            .with_generation_date(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        let results = ApiResultSet {
            posts: vec![ContentItem::new("pinned", None)],
            ..Default::default()
        };

        let mut stats = BuildStats::default();
        let rendered = b.render(Some(&results), &mut stats).unwrap();

        assert_eq!(stats.duplicates, 1);
        assert_eq!(rendered.sitemap.matches("/blog/pinned</loc>").count(), 1);
        assert!(rendered.sitemap.contains(
            "/blog/pinned</loc>\n    <lastmod>2026-01-02</lastmod>\n    <changefreq>monthly</changefreq>"
        ));
    }

    #[test]
    fn test_unwritable_output_is_an_error() {
        let root = TempDir::new().unwrap();
        let blocker = root.path().join("blocker");
        fs::write(&blocker, "file").unwrap();

        let result = builder(&blocker.join("out")).build_static();
        assert!(matches!(result, Err(BuildError::Write { .. })));
    }
}
