//! Rewrite-domain command - fixes the origin of generated files

use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use mapsmith_generator::{DomainRewriter, RewriteOutcome};

use super::{Overrides, load_config};

/// Run the rewrite-domain command.
///
/// Replaces the placeholder origin in the output directory's sitemap.xml and
/// robots.txt with the configured site origin.
pub fn run(config_path: &Path, overrides: &Overrides) -> Result<()> {
    tracing::info!(?config_path, ?overrides, "Rewriting domain");

    let config = load_config(config_path, overrides)?;
    if config.uses_placeholder_origin() {
        tracing::warn!("No site origin configured, nothing to rewrite");
        println!("  ⚠ Set SITE_URL (or --site-url) to the real domain first");
        return Ok(());
    }

    let rewriter =
        DomainRewriter::new(config.origin()).wrap_err("Failed to prepare domain rewrite")?;
    let output = Path::new(&config.site.output_dir);
    let report = rewriter
        .rewrite_dir(output)
        .wrap_err("Domain rewrite failed")?;

    println!();
    for (path, outcome) in &report.files {
        let status = match outcome {
            RewriteOutcome::Updated => "✓ updated",
            RewriteOutcome::Unchanged => "✓ unchanged",
            RewriteOutcome::Missing => "⚠ missing",
        };
        println!("  {status:<12} {}", path.display());
    }
    println!();
    println!("  Domain:  {}", config.origin());
    println!();

    Ok(())
}
