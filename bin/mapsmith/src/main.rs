//! mapsmith CLI
//!
//! Generates sitemap.xml and robots.txt for a content-driven site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;
use mapsmith::cmd::{self, Overrides};

/// Command-line interface for mapsmith.
///
/// Every option falls back to the environment (`SITE_URL`, `API_URL`,
/// `SITEMAP_OUTPUT_DIR`, `MAPSMITH__*`), so the commands run without flags.
#[derive(Parser)]
#[command(
    name = "mapsmith",
    version,
    about = "Sitemap and robots.txt generator for content-driven sites"
)]
struct Cli {
    /// Path to configuration file (optional)
    #[arg(short, long, default_value = "mapsmith.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Fetch dynamic content and write sitemap.xml and robots.txt
    Generate {
        /// Output directory
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Site origin (e.g., https://example.com)
        #[arg(long)]
        site_url: Option<String>,
        /// Content API base URL
        #[arg(long)]
        api_url: Option<String>,
        /// Skip the content API and write static routes only
        #[arg(long)]
        static_only: bool,
    },
    /// Write sitemap.xml and robots.txt from static routes only
    Static {
        /// Output directory
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Site origin (e.g., https://example.com)
        #[arg(long)]
        site_url: Option<String>,
    },
    /// Replace the placeholder domain in already generated files
    RewriteDomain {
        /// Output directory holding the generated files
        #[arg(short, long)]
        output: Option<std::path::PathBuf>,
        /// Site origin to write (e.g., https://example.com)
        #[arg(long)]
        site_url: Option<String>,
    },
    /// Validate configuration and route registry
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    mapsmith::init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            output,
            site_url,
            api_url,
            static_only,
        } => {
            let overrides = Overrides {
                output,
                site_url,
                api_url,
            };
            cmd::generate::run(&cli.config, &overrides, static_only).await?;
        }
        Commands::Static { output, site_url } => {
            let overrides = Overrides {
                output,
                site_url,
                api_url: None,
            };
            cmd::generate::run(&cli.config, &overrides, true).await?;
        }
        Commands::RewriteDomain { output, site_url } => {
            let overrides = Overrides {
                output,
                site_url,
                api_url: None,
            };
            cmd::rewrite::run(&cli.config, &overrides)?;
        }
        Commands::Check { strict } => {
            cmd::check::run(&cli.config, strict)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_generate_command_parsing() {
        let args = ["mapsmith", "generate", "--output", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("mapsmith.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Generate {
                output,
                site_url,
                api_url,
                static_only,
            } => {
                assert_eq!(output, Some(std::path::PathBuf::from("dist")));
                assert!(site_url.is_none());
                assert!(api_url.is_none());
                assert!(!static_only);
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_without_flags() {
        let args = ["mapsmith", "generate"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Generate { output, .. } => assert!(output.is_none()),
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_generate_static_only() {
        let args = [
            "mapsmith",
            "generate",
            "--static-only",
            "--site-url",
            "https://example.com",
            "--api-url",
            "https://cms.example.com/api",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Generate {
                site_url,
                api_url,
                static_only,
                ..
            } => {
                assert!(static_only);
                assert_eq!(site_url.as_deref(), Some("https://example.com"));
                assert_eq!(api_url.as_deref(), Some("https://cms.example.com/api"));
            }
            _ => panic!("Expected Generate command"),
        }
    }

    #[test]
    fn test_cli_static_command_parsing() {
        let args = ["mapsmith", "static", "-o", "public"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Static { output, site_url } => {
                assert_eq!(output, Some(std::path::PathBuf::from("public")));
                assert!(site_url.is_none());
            }
            _ => panic!("Expected Static command"),
        }
    }

    #[test]
    fn test_cli_rewrite_domain_command_parsing() {
        let args = [
            "mapsmith",
            "rewrite-domain",
            "--site-url",
            "https://example.com",
        ];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::RewriteDomain { site_url, .. } => {
                assert_eq!(site_url.as_deref(), Some("https://example.com"));
            }
            _ => panic!("Expected RewriteDomain command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["mapsmith", "check", "--strict"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Check { strict } => {
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["mapsmith", "-vv", "generate"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let args = ["mapsmith", "--config", "site.toml", "check"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
