//! Sitemap generation.
//!
//! Generates Sitemap Protocol 0.9 XML from the static route registry and
//! the dynamic content collections.

use std::collections::HashSet;

use chrono::NaiveDate;
use mapsmith_core::{ApiResultSet, ChangeFreq, Config, ContentKind, RouteRegistry};
use tracing::debug;
use url::Url;

/// A sitemap URL entry.
#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    /// Absolute URL.
    pub loc: String,

    /// Last modification date.
    pub lastmod: NaiveDate,

    /// Change frequency.
    pub changefreq: ChangeFreq,

    /// Priority (0.0 to 1.0).
    pub priority: f32,
}

/// Ordered sitemap entries with unique locations.
///
/// The first entry pushed for a location wins; later duplicates are counted
/// and dropped.
#[derive(Debug, Default)]
pub struct SitemapDocument {
    urls: Vec<SitemapUrl>,
    seen: HashSet<String>,
    duplicates: usize,
}

impl SitemapDocument {
    /// Create an empty document.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry unless its location is already present.
    pub fn push(&mut self, url: SitemapUrl) -> bool {
        if !self.seen.insert(url.loc.clone()) {
            debug!(loc = %url.loc, "skipping duplicate sitemap location");
            self.duplicates += 1;
            return false;
        }
        self.urls.push(url);
        true
    }

    /// Entries in emission order.
    pub fn urls(&self) -> &[SitemapUrl] {
        &self.urls
    }

    /// Number of entries dropped as duplicates.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the document has no entries.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}

/// Counts gathered while adding entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntryCounts {
    /// Entries added.
    pub added: usize,

    /// Routes or items left out (exclusion match or blank identifier).
    pub skipped: usize,
}

/// Sitemap generator.
#[derive(Debug)]
pub struct SitemapGenerator<'a> {
    config: &'a Config,
    generation_date: NaiveDate,
}

impl<'a> SitemapGenerator<'a> {
    /// Create a new sitemap generator stamping undated entries with
    /// `generation_date`.
    #[must_use]
    pub fn new(config: &'a Config, generation_date: NaiveDate) -> Self {
        Self {
            config,
            generation_date,
        }
    }

    /// Add every non-excluded static route.
    pub fn add_static(&self, doc: &mut SitemapDocument, registry: &RouteRegistry) -> EntryCounts {
        let mut counts = EntryCounts::default();

        for route in registry.routes() {
            if let Some(pattern) = registry.excluded_by(&route.path) {
                debug!(path = %route.path, %pattern, "excluding route");
                counts.skipped += 1;
                continue;
            }

            let added = doc.push(SitemapUrl {
                loc: self.config.url_for(&route.path),
                lastmod: self.generation_date,
                changefreq: route.change_freq,
                priority: route.priority,
            });
            if added {
                counts.added += 1;
            }
        }

        counts
    }

    /// Add the items of one dynamic collection.
    pub fn add_collection(
        &self,
        doc: &mut SitemapDocument,
        results: &ApiResultSet,
        kind: ContentKind,
    ) -> EntryCounts {
        let mut counts = EntryCounts::default();

        for item in results.get(kind) {
            let Some(identifier) = item.usable_identifier() else {
                counts.skipped += 1;
                continue;
            };

            let added = doc.push(SitemapUrl {
                loc: self.item_loc(kind, identifier),
                lastmod: item.last_modified.unwrap_or(self.generation_date),
                changefreq: kind.change_freq(),
                priority: kind.priority(),
            });
            if added {
                counts.added += 1;
            }
        }

        counts
    }

    /// Absolute URL for a content item, with the identifier encoded as a
    /// single path segment.
    fn item_loc(&self, kind: ContentKind, identifier: &str) -> String {
        let collection = self.config.url_for(kind.url_prefix().trim_end_matches('/'));

        match Url::parse(&collection) {
            Ok(mut url) => {
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments.push(identifier);
                }
                url.into()
            }
            Err(_) => format!("{collection}/{identifier}"),
        }
    }

    /// Render a document as sitemap XML.
    pub fn generate(&self, doc: &SitemapDocument) -> String {
        debug!(count = doc.len(), "generating sitemap");

        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push('\n');
        xml.push_str(r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">"#);
        xml.push('\n');

        for url in doc.urls() {
            xml.push_str(&url_to_xml(url));
        }

        xml.push_str("</urlset>\n");
        xml
    }
}

/// Convert a URL entry to XML.
fn url_to_xml(url: &SitemapUrl) -> String {
    let mut xml = String::from("  <url>\n");

    xml.push_str(&format!("    <loc>{}</loc>\n", escape_xml(&url.loc)));
    xml.push_str(&format!(
        "    <lastmod>{}</lastmod>\n",
        url.lastmod.format("%Y-%m-%d")
    ));
    xml.push_str(&format!("    <changefreq>{}</changefreq>\n", url.changefreq));
    xml.push_str(&format!(
        "    <priority>{}</priority>\n",
        format_priority(url.priority)
    ));

    xml.push_str("  </url>\n");
    xml
}

/// Shortest decimal form of a priority, keeping at least one fractional
/// digit (`1.0`, `0.8`, `0.25`).
fn format_priority(priority: f32) -> String {
    let text = priority.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

/// Escape special XML characters.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
