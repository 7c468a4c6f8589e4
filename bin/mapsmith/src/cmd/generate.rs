//! Generate command - writes sitemap.xml and robots.txt

use std::{path::Path, time::Instant};

use color_eyre::eyre::{Result, WrapErr};
use mapsmith_fetch::ContentFetcher;
use mapsmith_generator::{BuildStats, Builder};

use super::{Overrides, load_config};

/// Run the generate command.
///
/// Fetches dynamic content unless `static_only` is set, merges it with the
/// static routes and writes both files to the output directory.
pub async fn run(config_path: &Path, overrides: &Overrides, static_only: bool) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?config_path, ?overrides, static_only, "Starting generation");

    let config = load_config(config_path, overrides)?;
    if config.uses_placeholder_origin() {
        println!();
        println!("  ⚠ SITE_URL is not set, output uses {}", config.origin());
        println!("    run `mapsmith rewrite-domain` once the domain is known");
    }

    let builder = Builder::new(config.clone());

    let stats = if static_only {
        builder.build_static()
    } else {
        match ContentFetcher::new(&config) {
            Ok(fetcher) => builder.build(&fetcher).await,
            Err(e) => {
                tracing::error!(error = %e, "Content fetcher unavailable, generating static routes only");
                builder.build_static()
            }
        }
    }
    .wrap_err("Generation failed")?;

    print_summary(&stats, static_only, start.elapsed().as_secs_f64());
    tracing::info!(?stats, "Generation completed successfully");

    Ok(())
}

fn print_summary(stats: &BuildStats, static_only: bool, seconds: f64) {
    println!();
    if static_only {
        println!("  Static sitemap generated!");
    } else if stats.fallback {
        println!("  Sitemap generated from static routes (content API unavailable)");
    } else {
        println!("  Sitemap generated successfully!");
    }
    println!();
    println!("  Static routes: {}", stats.static_routes);
    println!("  Excluded:      {}", stats.excluded_routes);
    for (kind, count) in &stats.dynamic {
        println!("  {:<14} {count}", format!("{}:", capitalize(kind.name())));
    }
    if stats.skipped_items > 0 {
        println!("  Skipped items: {}", stats.skipped_items);
    }
    if stats.duplicates > 0 {
        println!("  Duplicates:    {}", stats.duplicates);
    }
    println!("  Total URLs:    {}", stats.total_urls());
    println!();
    for file in &stats.files {
        println!("  Wrote:         {}", file.display());
    }
    println!("  Duration:      {seconds:.2}s");
    println!();
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
