//! Check command - validate configuration and route registry

use std::path::Path;

use color_eyre::eyre::{Result, bail};
use mapsmith_core::{Config, RouteRegistry};

use super::{Overrides, load_config};

/// Validation result.
#[derive(Debug, Default)]
struct ValidationResult {
    errors: Vec<String>,
    warnings: Vec<String>,
}

impl ValidationResult {
    fn add_error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    fn add_warning(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Run the check command.
///
/// Validates configuration and the route registry without fetching content
/// or writing files.
pub fn run(config_path: &Path, strict: bool) -> Result<()> {
    tracing::info!(?config_path, strict, "Checking configuration");

    let mut result = ValidationResult::default();

    println!("Checking configuration...");
    let config = match load_config(config_path, &Overrides::default()) {
        Ok(c) => {
            println!("  ✓ Configuration valid");
            Some(c)
        }
        Err(e) => {
            result.add_error(format!("{e:#}"));
            println!("  ✗ Configuration invalid: {e:#}");
            None
        }
    };

    if let Some(ref cfg) = config {
        println!("\nChecking configuration values...");
        check_config_values(cfg, &mut result);

        if let Ok(registry) = cfg.registry() {
            println!("\nChecking route registry...");
            check_registry(cfg, &registry, &mut result);
        }
    }

    println!();
    println!("Summary:");
    println!("  Errors:   {}", result.errors.len());
    println!("  Warnings: {}", result.warnings.len());

    if result.has_errors() {
        println!();
        println!("Errors:");
        for err in &result.errors {
            println!("  ✗ {err}");
        }
    }

    if result.has_warnings() {
        println!();
        println!("Warnings:");
        for warn in &result.warnings {
            println!("  ⚠ {warn}");
        }
    }

    if result.has_errors() {
        bail!("Validation failed with {} error(s)", result.errors.len());
    }

    if strict && result.has_warnings() {
        bail!(
            "Validation failed with {} warning(s) (strict mode)",
            result.warnings.len()
        );
    }

    println!();
    println!("✓ All checks passed");

    Ok(())
}

/// Check configuration values for common issues.
fn check_config_values(config: &Config, result: &mut ValidationResult) {
    if config.uses_placeholder_origin() {
        result.add_warning(format!(
            "SITE_URL is not set, output will use the placeholder {}",
            config.origin()
        ));
    } else {
        println!("  ✓ Site origin: {}", config.origin());
    }

    println!("  ✓ Content API: {}", config.api_base_url());

    let output = Path::new(&config.site.output_dir);
    if output.exists() && !output.is_dir() {
        result.add_error(format!(
            "Output path exists but is not a directory: {}",
            config.site.output_dir
        ));
    }

    if config.api.timeout_secs > 30 {
        result.add_warning(format!(
            "api.timeout_secs is {}s, a slow API will stall generation",
            config.api.timeout_secs
        ));
    }
}

/// Check the registry against the exclusion and robots settings.
fn check_registry(config: &Config, registry: &RouteRegistry, result: &mut ValidationResult) {
    let included = registry.included().count();
    let excluded = registry.routes().len() - included;
    println!("  ✓ {included} route(s) included, {excluded} excluded");

    if included == 0 {
        result.add_warning("Every static route is excluded, the sitemap only lists dynamic content");
    }

    for pattern in registry.exclusions() {
        if !registry.routes().iter().any(|r| pattern.matches(&r.path)) {
            result.add_warning(format!("Exclusion pattern '{pattern}' matches no route"));
        }
    }

    for route in registry.routes() {
        if registry.excluded_by(&route.path).is_none() {
            continue;
        }
        let disallowed = config
            .robots
            .disallow
            .iter()
            .any(|d| route.path.starts_with(d.trim_end_matches('/')));
        if !disallowed {
            result.add_warning(format!(
                "Route {} is excluded from the sitemap but not disallowed in robots.txt",
                route.path
            ));
        }
    }

    let mut seen = std::collections::HashSet::new();
    for route in registry.routes() {
        if !seen.insert(route.path.as_str()) {
            result.add_warning(format!("Route {} is listed more than once", route.path));
        }
    }
}
