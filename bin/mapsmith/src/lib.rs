//! mapsmith CLI Library
//!
//! This library provides the command implementations for the mapsmith CLI.
//! It is designed to be used by the binary entry point while also exposing
//! public APIs for documentation and integration purposes.
//!
//! # Modules
//!
//! - [`cmd`] - Command implementations (generate, rewrite-domain, check)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! use mapsmith::cmd::{self, Overrides};
//!
//! # async fn demo() -> color_eyre::eyre::Result<()> {
//! // Generate sitemap.xml and robots.txt with static routes only
//! cmd::generate::run(Path::new("mapsmith.toml"), &Overrides::default(), true).await?;
//! # Ok(())
//! # }
//! ```

pub mod cmd;

// Re-export core types for convenience
pub use mapsmith_core::Config;
pub use mapsmith_generator::{BuildStats, Builder, DomainRewriter};

/// Initialize tracing with the specified verbosity level.
///
/// # Arguments
///
/// * `verbose` - Verbosity level (0 = WARN, 1 = INFO, 2 = DEBUG, 3+ = TRACE)
///
/// # Example
///
/// ```no_run
/// mapsmith::init_tracing(1); // Enable INFO level logging
/// ```
pub fn init_tracing(verbose: u8) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}
