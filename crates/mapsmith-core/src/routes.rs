//! Static route registry.
//!
//! The registry is the hand-maintained list of site paths that always belong
//! in the sitemap, together with the exclusion patterns that keep private
//! areas (admin, auth) out of it.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Change frequency hint for sitemap entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeFreq {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl ChangeFreq {
    /// The value written into `<changefreq>`.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ChangeFreq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single static route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Site-relative path, always starting with `/`.
    pub path: String,

    /// Expected update frequency.
    #[serde(rename = "changefreq")]
    pub change_freq: ChangeFreq,

    /// Relative crawl priority in `[0, 1]`.
    pub priority: f32,
}

impl RouteEntry {
    /// Create a new route entry.
    pub fn new(path: impl Into<String>, change_freq: ChangeFreq, priority: f32) -> Self {
        Self {
            path: path.into(),
            change_freq,
            priority,
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.path.starts_with('/') {
            return Err(CoreError::route(&self.path, "path must start with '/'"));
        }

        if !self.priority.is_finite() || !(0.0..=1.0).contains(&self.priority) {
            return Err(CoreError::route(
                &self.path,
                format!("priority {} is outside [0, 1]", self.priority),
            ));
        }

        Ok(())
    }
}

/// Pattern that removes matching routes from the sitemap.
///
/// Written as plain strings: `/admin` matches anywhere in the path,
/// `/auth/*` matches by prefix and `*/edit` matches by suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExclusionPattern {
    /// Substring match.
    Contains(String),
    /// Prefix match (trailing `*`).
    Prefix(String),
    /// Suffix match (leading `*`).
    Suffix(String),
}

impl ExclusionPattern {
    /// Whether this pattern matches the given path.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        match self {
            Self::Contains(needle) => path.contains(needle.as_str()),
            Self::Prefix(prefix) => path.starts_with(prefix.as_str()),
            Self::Suffix(suffix) => path.ends_with(suffix.as_str()),
        }
    }
}

impl From<&str> for ExclusionPattern {
    fn from(raw: &str) -> Self {
        let leading = raw.starts_with('*');
        let trailing = raw.len() > 1 && raw.ends_with('*');
        let inner = raw.trim_start_matches('*').trim_end_matches('*');

        match (leading, trailing) {
            (true, false) => Self::Suffix(inner.to_string()),
            (false, true) => Self::Prefix(inner.to_string()),
            _ => Self::Contains(inner.to_string()),
        }
    }
}

impl From<String> for ExclusionPattern {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl FromStr for ExclusionPattern {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for ExclusionPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(s) => write!(f, "{s}"),
            Self::Prefix(s) => write!(f, "{s}*"),
            Self::Suffix(s) => write!(f, "*{s}"),
        }
    }
}

impl From<ExclusionPattern> for String {
    fn from(pattern: ExclusionPattern) -> Self {
        pattern.to_string()
    }
}

/// Validated static routes plus exclusion patterns.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRegistry {
    routes: Vec<RouteEntry>,
    exclusions: Vec<ExclusionPattern>,
}

impl RouteRegistry {
    /// Build a registry, rejecting routes that break the path or priority
    /// invariants.
    pub fn new(routes: Vec<RouteEntry>, exclusions: Vec<ExclusionPattern>) -> Result<Self> {
        for route in &routes {
            route.validate()?;
        }

        Ok(Self { routes, exclusions })
    }

    /// All routes, including excluded ones, in registry order.
    pub fn routes(&self) -> &[RouteEntry] {
        &self.routes
    }

    /// Exclusion patterns in evaluation order.
    pub fn exclusions(&self) -> &[ExclusionPattern] {
        &self.exclusions
    }

    /// First exclusion pattern matching `path`, if any.
    pub fn excluded_by(&self, path: &str) -> Option<&ExclusionPattern> {
        self.exclusions.iter().find(|p| p.matches(path))
    }

    /// Routes that survive exclusion filtering, in registry order.
    pub fn included(&self) -> impl Iterator<Item = &RouteEntry> {
        self.routes
            .iter()
            .filter(|route| self.excluded_by(&route.path).is_none())
    }
}

impl Default for RouteRegistry {
    fn default() -> Self {
        Self {
            routes: default_routes(),
            exclusions: default_exclusions(),
        }
    }
}

/// Built-in site routes.
pub fn default_routes() -> Vec<RouteEntry> {
    use ChangeFreq::*;

    vec![
        RouteEntry::new("/", Daily, 1.0),
        RouteEntry::new("/about", Monthly, 0.8),
        RouteEntry::new("/services", Monthly, 0.8),
        RouteEntry::new("/blog", Daily, 0.9),
        RouteEntry::new("/events", Weekly, 0.8),
        RouteEntry::new("/categories", Weekly, 0.6),
        RouteEntry::new("/authors", Monthly, 0.5),
        RouteEntry::new("/contact", Monthly, 0.7),
        RouteEntry::new("/privacy", Yearly, 0.3),
        RouteEntry::new("/terms", Yearly, 0.3),
        RouteEntry::new("/admin", Daily, 0.5),
        RouteEntry::new("/admin/posts", Daily, 0.5),
        RouteEntry::new("/login", Monthly, 0.3),
        RouteEntry::new("/register", Monthly, 0.3),
        RouteEntry::new("/auth/reset-password", Monthly, 0.3),
    ]
}

/// Built-in exclusion patterns.
pub fn default_exclusions() -> Vec<ExclusionPattern> {
    ["/admin", "/login", "/register", "/auth/*"]
        .into_iter()
        .map(ExclusionPattern::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_parsing() {
        assert_eq!(
            ExclusionPattern::from("/admin"),
            ExclusionPattern::Contains("/admin".to_string())
        );
        assert_eq!(
            ExclusionPattern::from("/auth/*"),
            ExclusionPattern::Prefix("/auth/".to_string())
        );
        assert_eq!(
            ExclusionPattern::from("*/edit"),
            ExclusionPattern::Suffix("/edit".to_string())
        );
        assert_eq!(
            ExclusionPattern::from("*draft*"),
            ExclusionPattern::Contains("draft".to_string())
        );
    }

    #[test]
    fn test_pattern_matching() {
        let contains = ExclusionPattern::from("/admin");
        assert!(contains.matches("/admin"));
        assert!(contains.matches("/admin/posts"));
        assert!(!contains.matches("/about"));

        let prefix = ExclusionPattern::from("/auth/*");
        assert!(prefix.matches("/auth/reset"));
        assert!(!prefix.matches("/blog/auth/"));

        let suffix = ExclusionPattern::from("*/edit");
        assert!(suffix.matches("/blog/post/edit"));
        assert!(!suffix.matches("/edit/blog"));
    }

    #[test]
    fn test_pattern_display_roundtrips_source() {
        for raw in ["/admin", "/auth/*", "*/edit"] {
            assert_eq!(ExclusionPattern::from(raw).to_string(), raw);
        }
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let registry = RouteRegistry::new(
            vec![RouteEntry::new("/admin/edit", ChangeFreq::Daily, 0.5)],
            vec!["*/edit".into(), "/admin".into()],
        )
        .unwrap();

        assert_eq!(
            registry.excluded_by("/admin/edit"),
            Some(&ExclusionPattern::Suffix("/edit".to_string()))
        );
    }

    #[test]
    fn test_included_drops_excluded_routes() {
        let registry = RouteRegistry::new(
            vec![
                RouteEntry::new("/", ChangeFreq::Daily, 1.0),
                RouteEntry::new("/admin", ChangeFreq::Daily, 0.5),
            ],
            vec!["/admin".into()],
        )
        .unwrap();

        let paths: Vec<_> = registry.included().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/"]);
        assert_eq!(registry.routes().len(), 2);
    }

    #[test]
    fn test_priority_out_of_range_rejected() {
        let result = RouteRegistry::new(
            vec![RouteEntry::new("/blog", ChangeFreq::Daily, 1.5)],
            vec![],
        );
        let err = result.unwrap_err().to_string();
        assert!(err.contains("/blog"));
        assert!(err.contains("outside [0, 1]"));

        let nan = RouteRegistry::new(
            vec![RouteEntry::new("/blog", ChangeFreq::Daily, f32::NAN)],
            vec![],
        );
        assert!(nan.is_err());
    }

    #[test]
    fn test_relative_path_rejected() {
        let result = RouteRegistry::new(
            vec![RouteEntry::new("blog", ChangeFreq::Daily, 0.5)],
            vec![],
        );
        assert!(result.unwrap_err().to_string().contains("must start with '/'"));
    }

    #[test]
    fn test_default_registry_is_valid() {
        let registry = RouteRegistry::default();
        let rebuilt =
            RouteRegistry::new(registry.routes().to_vec(), registry.exclusions().to_vec());
        assert!(rebuilt.is_ok());

        let included: Vec<_> = registry.included().map(|r| r.path.as_str()).collect();
        assert!(included.contains(&"/"));
        assert!(!included.iter().any(|p| p.starts_with("/admin")));
        assert!(!included.contains(&"/login"));
        assert!(!included.contains(&"/auth/reset-password"));
    }

    #[test]
    fn test_changefreq_serde() {
        let entry: RouteEntry =
            toml::from_str("path = \"/\"\nchangefreq = \"weekly\"\npriority = 0.5").unwrap();
        assert_eq!(entry.change_freq, ChangeFreq::Weekly);
        assert_eq!(ChangeFreq::Weekly.to_string(), "weekly");
    }
}
