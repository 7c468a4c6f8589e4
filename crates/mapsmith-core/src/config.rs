//! Run configuration.
//!
//! A [`Config`] is built once at process start from defaults, an optional
//! TOML file and the environment, then passed by reference to every stage.

use std::{collections::BTreeMap, path::Path, time::Duration};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    content::ContentKind,
    error::{CoreError, Result},
    routes::{ExclusionPattern, RouteEntry, RouteRegistry, default_exclusions, default_routes},
};

/// Origin written when no site URL is configured. The domain rewrite
/// utility replaces it after the fact.
pub const PLACEHOLDER_ORIGIN: &str = "https://your-domain.com";

/// Content API used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

/// Environment variable holding the site origin.
pub const ENV_SITE_URL: &str = "SITE_URL";

/// Environment variable holding the content API base URL.
pub const ENV_API_URL: &str = "API_URL";

/// Environment variable holding the output directory.
pub const ENV_OUTPUT_DIR: &str = "SITEMAP_OUTPUT_DIR";

/// Main configuration structure for mapsmith.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Site settings.
    #[serde(default)]
    pub site: SiteConfig,

    /// Content API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Static routes.
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteEntry>,

    /// Exclusion patterns applied to static routes.
    #[serde(default = "default_exclusions")]
    pub exclude: Vec<ExclusionPattern>,

    /// robots.txt settings.
    #[serde(default)]
    pub robots: RobotsConfig,
}

/// Site configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Site origin (e.g., "https://example.com"). Unset means placeholder.
    #[serde(default)]
    pub origin: Option<String>,

    /// Directory receiving `sitemap.xml` and `robots.txt`.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

/// Content API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL the endpoint paths are appended to.
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Extra attempts after a failed collection fetch.
    #[serde(default)]
    pub retries: u32,

    /// Endpoint per collection.
    #[serde(default)]
    pub endpoints: EndpointsConfig,
}

/// Endpoints of the four collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_posts_endpoint")]
    pub posts: EndpointConfig,
    #[serde(default = "default_categories_endpoint")]
    pub categories: EndpointConfig,
    #[serde(default = "default_events_endpoint")]
    pub events: EndpointConfig,
    #[serde(default = "default_authors_endpoint")]
    pub authors: EndpointConfig,
}

/// A single collection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Path relative to the API base URL.
    pub path: String,

    /// Query parameters (field selection, limit).
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// robots.txt configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotsConfig {
    /// Paths listed under `Allow:`.
    #[serde(default = "default_allow")]
    pub allow: Vec<String>,

    /// Paths listed under `Disallow:`.
    #[serde(default = "default_disallow")]
    pub disallow: Vec<String>,
}

// Default value functions
fn default_output_dir() -> String {
    "public".to_string()
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn endpoint(path: &str, query: &[(&str, &str)]) -> EndpointConfig {
    EndpointConfig {
        path: path.to_string(),
        query: query
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect(),
    }
}

fn default_posts_endpoint() -> EndpointConfig {
    endpoint(
        "posts",
        &[
            ("fields", "slug,updatedAt"),
            ("status", "published"),
            ("limit", "1000"),
        ],
    )
}

fn default_categories_endpoint() -> EndpointConfig {
    endpoint("categories", &[("fields", "slug,updatedAt")])
}

fn default_events_endpoint() -> EndpointConfig {
    endpoint("events", &[("fields", "slug,updatedAt"), ("limit", "500")])
}

fn default_authors_endpoint() -> EndpointConfig {
    endpoint("authors", &[("fields", "id,updatedAt")])
}

fn default_allow() -> Vec<String> {
    vec!["/".to_string()]
}

fn default_disallow() -> Vec<String> {
    ["/admin/", "/login", "/register", "/auth/", "/api/"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            retries: 0,
            endpoints: EndpointsConfig::default(),
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            posts: default_posts_endpoint(),
            categories: default_categories_endpoint(),
            events: default_events_endpoint(),
            authors: default_authors_endpoint(),
        }
    }
}

impl EndpointsConfig {
    /// Endpoint for one collection.
    pub fn get(&self, kind: ContentKind) -> &EndpointConfig {
        match kind {
            ContentKind::Posts => &self.posts,
            ContentKind::Categories => &self.categories,
            ContentKind::Events => &self.events,
            ContentKind::Authors => &self.authors,
        }
    }
}

impl Default for RobotsConfig {
    fn default() -> Self {
        Self {
            allow: default_allow(),
            disallow: default_disallow(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig::default(),
            api: ApiConfig::default(),
            routes: default_routes(),
            exclude: default_exclusions(),
            robots: RobotsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from an optional TOML file layered with
    /// `MAPSMITH__*` variables and the plain `SITE_URL`, `API_URL` and
    /// `SITEMAP_OUTPUT_DIR` variables.
    ///
    /// A missing file is not an error; every setting has a default.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Same layering as [`Config::load`], without validation, so callers
    /// can apply their own overrides first.
    ///
    /// The file is always parsed as TOML, whatever its extension.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            if path.exists() {
                tracing::debug!(path = %path.display(), "reading configuration file");
                builder = builder
                    .add_source(config::File::from(path).format(config::FileFormat::Toml));
            } else {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("MAPSMITH").separator("__"))
            .build()?;

        let mut config: Config = settings.try_deserialize()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| CoreError::config_with_source("Failed to parse configuration", e))?;

        config.validate()?;
        Ok(config)
    }

    /// Apply the plain environment variables through `lookup`.
    ///
    /// Empty values are ignored so an exported-but-blank variable keeps the
    /// configured value.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(origin) = get(ENV_SITE_URL) {
            self.site.origin = Some(origin);
        }
        if let Some(api) = get(ENV_API_URL) {
            self.api.base_url = api;
        }
        if let Some(dir) = get(ENV_OUTPUT_DIR) {
            self.site.output_dir = dir;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(origin) = self.configured_origin() {
            check_origin(origin)?;
        } else {
            tracing::warn!(
                placeholder = PLACEHOLDER_ORIGIN,
                "site origin not configured, using placeholder"
            );
        }

        check_http_url("api.base_url", self.api_base_url())?;

        if self.site.output_dir.trim().is_empty() {
            return Err(CoreError::config("site.output_dir cannot be empty"));
        }

        if self.api.timeout_secs == 0 {
            return Err(CoreError::config("api.timeout_secs must be at least 1"));
        }

        for kind in ContentKind::ALL {
            if self.api.endpoints.get(kind).path.trim().is_empty() {
                return Err(CoreError::config(format!(
                    "api.endpoints.{kind}.path cannot be empty"
                )));
            }
        }

        for path in self.robots.disallow.iter().chain(&self.robots.allow) {
            if !path.starts_with('/') {
                tracing::warn!(path, "robots path should start with '/'");
            }
        }

        self.registry()?;
        Ok(())
    }

    /// Origin set by the user, trimmed, or `None` if unset or blank.
    fn configured_origin(&self) -> Option<&str> {
        self.site
            .origin
            .as_deref()
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
    }

    /// Site origin without trailing slash, falling back to the placeholder.
    pub fn origin(&self) -> &str {
        self.configured_origin().unwrap_or(PLACEHOLDER_ORIGIN)
    }

    /// Whether output will carry the placeholder origin.
    pub fn uses_placeholder_origin(&self) -> bool {
        self.origin() == PLACEHOLDER_ORIGIN
    }

    /// Content API base URL without trailing slash.
    pub fn api_base_url(&self) -> &str {
        self.api.base_url.trim().trim_end_matches('/')
    }

    /// Per-request timeout for content API calls.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_secs)
    }

    /// Validated route registry.
    pub fn registry(&self) -> Result<RouteRegistry> {
        RouteRegistry::new(self.routes.clone(), self.exclude.clone())
    }

    /// Get the full URL for a site path.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_start_matches('/');
        format!("{}/{path}", self.origin())
    }

    /// Absolute URL of the generated sitemap.
    pub fn sitemap_url(&self) -> String {
        self.url_for("sitemap.xml")
    }
}

fn check_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).map_err(|e| {
        CoreError::config_with_source(format!("{field} is not a valid URL: {value}"), e)
    })?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(CoreError::config(format!(
            "{field} must be an absolute http(s) URL: {value}"
        )));
    }

    Ok(url)
}

/// An origin is scheme, host and port only. A path would be prepended to
/// every location again on each domain rewrite.
fn check_origin(value: &str) -> Result<()> {
    let url = check_http_url("site.origin", value)?;

    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(CoreError::config(format!(
            "site.origin must not carry a path, query or fragment: {value}"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::routes::ChangeFreq;

    fn create_test_config() -> String {
        r#"
exclude = ["/admin", "/auth/*"]

[site]
origin = "https://example.com/"
output_dir = "dist"

[api]
base_url = "https://cms.example.com/api/"
timeout_secs = 3
retries = 1

[api.endpoints.posts]
path = "v2/posts"
query = { limit = "50" }

[[routes]]
path = "/"
changefreq = "daily"
priority = 1.0

[[routes]]
path = "/admin"
changefreq = "daily"
priority = 0.5

[robots]
disallow = ["/admin/"]
"#
        .to_string()
    }

    #[test]
    fn test_load_config() {
        let config = Config::from_toml_str(&create_test_config()).expect("parse config");

        assert_eq!(config.origin(), "https://example.com");
        assert_eq!(config.site.output_dir, "dist");
        assert_eq!(config.api_base_url(), "https://cms.example.com/api");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
        assert_eq!(config.api.retries, 1);
        assert_eq!(config.api.endpoints.posts.path, "v2/posts");
        assert_eq!(config.api.endpoints.posts.query.get("limit").unwrap(), "50");
        // untouched endpoints keep their defaults
        assert_eq!(config.api.endpoints.authors, default_authors_endpoint());
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].change_freq, ChangeFreq::Daily);
        assert_eq!(config.exclude.len(), 2);
        assert_eq!(config.robots.disallow, vec!["/admin/"]);
        assert_eq!(config.robots.allow, vec!["/"]);
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_toml_str("").expect("parse empty config");

        assert!(config.uses_placeholder_origin());
        assert_eq!(config.origin(), PLACEHOLDER_ORIGIN);
        assert_eq!(config.api_base_url(), DEFAULT_API_URL);
        assert_eq!(config.site.output_dir, "public");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.retries, 0);
        assert_eq!(config.routes, default_routes());
        assert_eq!(config.exclude, default_exclusions());
    }

    #[test]
    fn test_load_file_and_missing_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("mapsmith.toml");
        std::fs::write(&config_path, "[site]\noutput_dir = \"out\"\n").expect("write");

        let config = Config::load(Some(&config_path)).expect("load config");
        assert_eq!(config.site.output_dir, "out");

        let missing = Config::load(Some(&dir.path().join("absent.toml")));
        assert!(missing.is_ok());
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            (ENV_SITE_URL, "https://blog.example.org"),
            (ENV_API_URL, "https://api.example.org"),
            (ENV_OUTPUT_DIR, "  "),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.origin(), "https://blog.example.org");
        assert_eq!(config.api_base_url(), "https://api.example.org");
        // blank value ignored
        assert_eq!(config.site.output_dir, "public");
    }

    #[test]
    fn test_blank_origin_falls_back_to_placeholder() {
        let mut config = Config::default();
        config.site.origin = Some("   ".to_string());
        assert!(config.validate().is_ok());
        assert!(config.uses_placeholder_origin());
    }

    #[test]
    fn test_malformed_origin_rejected() {
        let mut config = Config::default();
        config.site.origin = Some("not a url".to_string());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("site.origin"));

        config.site.origin = Some("ftp://example.com".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_origin_with_path_rejected() {
        let mut config = Config::default();
        config.site.origin = Some("https://your-domain.com/site".to_string());
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("must not carry a path"));

        config.site.origin = Some("https://example.com/?ref=x".to_string());
        assert!(config.validate().is_err());

        config.site.origin = Some("https://example.com:8080/".to_string());
        assert!(config.validate().is_ok());
        assert_eq!(config.origin(), "https://example.com:8080");
    }

    #[test]
    fn test_config_file_extension_is_not_significant() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("site.conf");
        std::fs::write(&config_path, "[site]\noutput_dir = \"conf-out\"\n").expect("write");

        let config = Config::load(Some(&config_path)).expect("load config");
        assert_eq!(config.site.output_dir, "conf-out");
    }

    #[test]
    fn test_read_skips_validation() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_path = dir.path().join("mapsmith.toml");
        std::fs::write(&config_path, "[api]\ntimeout_secs = 0\n").expect("write");

        let config = Config::read(Some(&config_path)).expect("read config");
        assert_eq!(config.api.timeout_secs, 0);
        assert!(Config::load(Some(&config_path)).is_err());
    }

    #[test]
    fn test_invalid_route_priority_rejected() {
        let result = Config::from_toml_str(
            r#"
[[routes]]
path = "/"
changefreq = "daily"
priority = 2.0
"#,
        );
        assert!(result.unwrap_err().to_string().contains("outside [0, 1]"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let result = Config::from_toml_str("[api]\ntimeout_secs = 0\n");
        assert!(result.unwrap_err().to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_url_for() {
        let mut config = Config::default();
        config.site.origin = Some("https://example.com/".to_string());

        assert_eq!(config.url_for("/blog/hello"), "https://example.com/blog/hello");
        assert_eq!(config.url_for("blog/hello"), "https://example.com/blog/hello");
        assert_eq!(config.url_for("/"), "https://example.com/");
        assert_eq!(config.sitemap_url(), "https://example.com/sitemap.xml");
    }
}
