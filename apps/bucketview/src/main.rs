//! bucketview - terminal file browser over an object-storage bucket listing.
//!
//! Lists one folder level at a time through the bucket's `list` endpoint,
//! with breadcrumb navigation, 50-row pages and a client-side name filter.
//!
//! # Usage
//!
//! ```text
//! bucketview --endpoint https://s3.example.com --bucket photos --path 2024/
//! bucketview --bucket photos --once --json
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `BUCKETVIEW_BUCKET` | *(unset)* | Bucket to open; unset lists all buckets |
//! | `BUCKETVIEW_ENDPOINT` | `https://localhost` | Listing endpoint |
//! | `BUCKETVIEW_ITEMS_PER_PAGE` | `50` | Rows per page |
//! | `BUCKETVIEW_RESERVED_KEYS` | `index.html,s3.js,dark-mode.css` | Keys never listed |
//! | `BUCKETVIEW_REQUEST_TIMEOUT_SECS` | `30` | HTTP timeout, `0` disables |
//! | `BUCKETVIEW_PREFERENCES_PATH` | `~/.bucketview/preferences.json` | Theme preference file |
//! | `LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | *(unset)* | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod render;
mod shell;

use std::io::{IsTerminal, Write};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bucketview_core::preferences::PreferenceStore;
use bucketview_core::{BrowserConfig, BrowserController, HttpListingSource, Outcome};
use bucketview_model::Location;

use crate::render::{Palette, render};
use crate::shell::Shell;

/// Version reported at startup.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Command-line arguments.
#[derive(Debug, Clone, Parser)]
#[command(name = "bucketview")]
#[command(about = "Browse an object-storage bucket listing from the terminal")]
#[command(version)]
struct Cli {
    /// Bucket to open. Omit to list the buckets at the storage root.
    #[arg(short, long, env = "BUCKETVIEW_BUCKET")]
    bucket: Option<String>,

    /// Folder inside the bucket to start in.
    #[arg(short, long, default_value = "")]
    path: String,

    /// Listing endpoint (scheme and host). Overrides `BUCKETVIEW_ENDPOINT`.
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Page to show first.
    #[arg(long, default_value_t = 1)]
    page: usize,

    /// Print one page and exit instead of starting the shell.
    #[arg(long)]
    once: bool,

    /// With `--once`, print the view as JSON.
    #[arg(long, requires = "once")]
    json: bool,
}

impl Cli {
    fn location(&self) -> Location {
        match self.bucket.as_deref() {
            Some(bucket) if !bucket.is_empty() => Location::new(bucket, &self.path),
            _ => Location::default(),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config
/// value. Logs go to stderr so they never mix with rendered output.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Apply command-line overrides on top of the environment configuration.
fn build_config(cli: &Cli) -> BrowserConfig {
    let mut config = BrowserConfig::from_env();
    if let Some(endpoint) = &cli.endpoint {
        config.endpoint.clone_from(endpoint);
    }
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);

    init_tracing(&config.log_level)?;

    let location = cli.location();
    info!(
        endpoint = %config.endpoint_base(),
        location = %location,
        items_per_page = config.items_per_page,
        version = VERSION,
        "starting bucketview",
    );

    let source = HttpListingSource::new(&config).context("failed to build HTTP client")?;
    let preferences = match PreferenceStore::from_config(&config) {
        Ok(store) => Some(store),
        Err(e) => {
            warn!(error = %e, "theme preference will not be saved");
            None
        }
    };

    let mut controller = BrowserController::new(&config, location);
    let mut outcome = controller.refresh(&source).await;
    while outcome == Outcome::Applied && controller.view().page.current_page < cli.page {
        match controller.next_page(&source).await {
            Some(next) => outcome = next,
            None => break,
        }
    }

    if cli.once {
        return print_once(&controller, &cli, preferences.as_ref());
    }

    Shell::new(controller, &source, preferences).run().await
}

/// Print the current page once, failing when the listing could not be loaded.
fn print_once(
    controller: &BrowserController,
    cli: &Cli,
    preferences: Option<&PreferenceStore>,
) -> Result<()> {
    let view = controller.view();
    let mut out = std::io::stdout().lock();

    if cli.json {
        serde_json::to_writer_pretty(&mut out, view).context("failed to encode view")?;
        writeln!(out)?;
    } else {
        let palette = if out.is_terminal() {
            Palette::for_theme(preferences.is_some_and(PreferenceStore::dark_mode))
        } else {
            Palette::PLAIN
        };
        render(&mut out, view, palette)?;
    }
    out.flush()?;

    match &view.error {
        Some(error) => anyhow::bail!("{error}"),
        None => Ok(()),
    }
}
