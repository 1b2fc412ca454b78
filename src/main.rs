//! Sumi-Formfill main entry point
//!
//! Command-line front end for the crawl client and the form fill engine.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sumi_formfill::client::{build_client, CrawlRequest, RedirectObserver, SystemDialer};
use sumi_formfill::config::{load_config, Config};
use sumi_formfill::forms::{discover_forms, encode_suggestions, fill_suggestions};
use tracing_subscriber::EnvFilter;
use url::Url;

/// Sumi-Formfill: crawl client and form fill suggestions
#[derive(Parser, Debug)]
#[command(name = "sumi-formfill")]
#[command(version = "1.0.0")]
#[command(about = "Crawl client and form fill suggestions", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print suggested submissions for every form in an HTML file
    Fill {
        /// HTML file to read
        #[arg(value_name = "HTML")]
        html: PathBuf,

        /// URL the page was served from, used to resolve form actions
        #[arg(long, value_name = "URL")]
        base_url: Option<Url>,
    },

    /// Fetch a URL through the crawl client and report redirects
    Fetch {
        /// URL to fetch
        #[arg(value_name = "URL")]
        url: Url,

        /// Crawl depth of the page the request originates from
        #[arg(long)]
        depth: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?
        }
        None => Config::default(),
    };

    match cli.command {
        Command::Fill { html, base_url } => handle_fill(&config, &html, base_url.as_ref()),
        Command::Fetch { url, depth } => handle_fetch(&config, url, depth).await,
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sumi_formfill=info,warn"),
            1 => EnvFilter::new("sumi_formfill=debug,info"),
            2 => EnvFilter::new("sumi_formfill=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the `fill` command: prints one line per discovered form
fn handle_fill(config: &Config, html: &Path, base_url: Option<&Url>) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(html)
        .with_context(|| format!("Failed to read {}", html.display()))?;
    let profile = config.form_fill.to_profile();

    let forms = discover_forms(&content);
    tracing::info!("Found {} forms in {}", forms.len(), html.display());

    for form in &forms {
        let suggestions = fill_suggestions(&form.fields, &profile);
        let encoded = encode_suggestions(&suggestions);
        let action = match base_url {
            Some(base) => base.join(&form.action)?.to_string(),
            None => form.action.clone(),
        };
        println!("{} {} {}", form.method, action, encoded);
    }

    Ok(())
}

/// Handles the `fetch` command
async fn handle_fetch(config: &Config, url: Url, depth: Option<u32>) -> anyhow::Result<()> {
    let observer: RedirectObserver = Arc::new(|response: &reqwest::Response, depth: u32| {
        tracing::info!(
            "Redirect {} from {} (depth {})",
            response.status(),
            response.url(),
            depth
        );
    });

    let (client, _dialer) =
        build_client(Arc::new(SystemDialer), &config.client, Some(observer)).await?;

    let request = client.get(url.clone()).build()?;
    let mut request = CrawlRequest::new(request);
    if let Some(depth) = depth {
        request = request.with_depth(depth);
    }

    match client.execute(request).await {
        Ok(response) => {
            println!("{} {}", response.status(), response.url());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Fetch of {} failed: {}", url, e);
            Err(e.into())
        }
    }
}
