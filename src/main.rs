use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use std::path::{Path, PathBuf};

use feissari_rss::config::Config;
use feissari_rss::output::OutputFormat;
use feissari_rss::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "feissari-rss",
    version,
    about = "Rebuild the Feissarimokat feed with post images embedded"
)]
struct Args {
    /// Directory where the feed file will be saved
    #[arg(long, value_name = "PATH", default_value = ".")]
    outdir: PathBuf,

    /// Output feed format
    #[arg(long, value_enum, default_value_t = OutputFormat::Atom)]
    format: OutputFormat,

    /// TOML configuration file overriding the built-in settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Loads `--config` if given. Failures are logged before they end the run.
fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    match Config::load(path) {
        Ok(config) => Ok(config),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to load config file");
            Err(e).with_context(|| format!("Failed to load config file '{}'", path.display()))
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; RUST_LOG overrides the default level.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = load_config(args.config.as_deref())?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        feed_url = %config.feed_url,
        format = %args.format,
        outdir = %args.outdir.display(),
        "Starting feed rebuild"
    );

    match pipeline::generate(&config, &args.outdir, args.format, Utc::now()).await {
        Ok(path) => {
            tracing::info!(path = %path.display(), "Feed generated");
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %e, "Feed generation failed");
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_config_flag_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.feed_url, feissari_rss::config::DEFAULT_FEED_URL);
    }

    #[test]
    fn test_config_failure_is_reported_with_path() {
        let path = Path::new("/tmp/feissari_rss_main_test_missing.toml");
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("feissari_rss_main_test_missing.toml"));
        assert!(err
            .chain()
            .any(|cause| cause.to_string().contains("Failed to read config file")));
    }
}
