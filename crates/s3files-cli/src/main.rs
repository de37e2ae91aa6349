//! 🚀 s3files-cli: the front door, the bouncer, the maitre d' of s3files.
//!
//! 🎬 *[narrator voice]* "It all started with a simple main() function..."
//! 📦 This binary is the thin wrapper that loads config, sets up logging, wires ctrl-c,
//! and then lets the library do the heavy lifting. Like a manager. 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use s3files::AppConfig;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// 🪣 Fetch objects from an S3 bucket into memory, a few at a time, and report how it went.
#[derive(Debug, Parser)]
#[command(name = "s3files", version)]
struct Cli {
    /// 🔧 TOML config file. Skipped if it doesn't exist; env vars (S3F_*) still apply.
    #[arg(default_value = "s3files.toml")]
    config: PathBuf,

    /// 🪣 Bucket to fetch from (overrides [storage].bucket)
    #[arg(long)]
    bucket: Option<String>,

    /// 🔀 Endpoint for S3-compatible stores (overrides [storage].endpoint_url)
    #[arg(long)]
    endpoint_url: Option<String>,

    /// 📁 Folder prefix for every key (overrides [fetch].folder)
    #[arg(long)]
    folder: Option<String>,

    /// 🗝️ Key to fetch; repeat for more. Replaces [fetch].keys when given.
    #[arg(long = "key", value_name = "KEY")]
    keys: Vec<String>,

    /// 🏷️ Keep the full key as the output path
    #[arg(long)]
    preserve_folder_path: bool,

    /// 🚦 Fetches in flight before back-pressure kicks in (overrides [runtime].throttle_threshold)
    #[arg(long)]
    throttle_threshold: Option<usize>,

    /// 📜 Print the summary as JSON instead of a table
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// 🔧 Command-line flags win over whatever the file and env said.
    fn apply_overrides(&self, mut app_config: AppConfig) -> AppConfig {
        if let Some(bucket) = &self.bucket {
            app_config.storage.bucket = bucket.clone();
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            app_config.storage.endpoint_url = Some(endpoint_url.clone());
            // -- 🛣️ custom endpoints are nearly always MinIO-ish, and MinIO wants path-style
            app_config.storage.force_path_style = true;
        }
        if let Some(folder) = &self.folder {
            app_config.fetch.folder = Some(folder.clone());
        }
        if !self.keys.is_empty() {
            app_config.fetch.keys = Some(self.keys.clone());
        }
        if self.preserve_folder_path {
            app_config.fetch.preserve_folder_path = true;
        }
        if let Some(threshold) = self.throttle_threshold {
            app_config.runtime.throttle_threshold = threshold;
        }
        app_config
    }
}

/// 🚀 main(): where it all begins. The "I pressed F5 and held my breath" moment.
///
/// 🔧 Steps:
/// 1. Init tracing
/// 2. Parse args
/// 3. Load config, apply overrides
/// 4. Run the thing, ctrl-c stops it politely
/// 5. Print the summary, exit non-zero if anything failed
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    // 🔒 Validate the config file exists before we get too emotionally attached
    let config_file = cli.config.as_path();
    let config_file_that_exists = match config_file.try_exists().with_context(|| {
        format!(
            "💀 Couldn't check whether the configuration file exists. If it's a pwd/cwd thing, \
             use an absolute path. Was checking here: '{}'",
            config_file.display()
        )
    })? {
        true => Some(config_file),
        false => None,
    };

    let app_config = s3files::app_config::load_config(config_file_that_exists).context(
        "💀 In s3files-cli, main, we couldn't load the config. Take a look at the file and the S3F_* \
         environment variables, and make sure you didn't forget something obvious.",
    )?;
    let app_config = cli.apply_overrides(app_config);

    // 🛑 ctrl-c: stop pulling new keys, let in-flight fetches land, still print a summary
    let cancel = CancellationToken::new();
    let ctrl_c_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 ctrl-c received: finishing in-flight fetches, starting no new ones");
            ctrl_c_cancel.cancel();
        }
    });

    let result = s3files::run_with_cancel(app_config, cancel).await;

    let summary = match result {
        Ok(summary) => summary,
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion of sadness, one layer at a time
            let mut the_vibes_are_giving_connection_issues = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                let cause_str = cause.to_string();
                if cause_str.contains("dispatch failure")
                    || cause_str.contains("connection refused")
                    || cause_str.contains("Connection refused")
                    || cause_str.contains("dns error")
                {
                    the_vibes_are_giving_connection_issues = true;
                }
            }
            if the_vibes_are_giving_connection_issues {
                error!(
                    "🔧 hint: looks like the storage endpoint isn't reachable. \
                     Double-check the region / endpoint_url, and if you're pointing at MinIO \
                     in Docker, try `docker ps` to see whether it is actually up. ☕"
                );
            }
            std::process::exit(1);
        }
    };

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("💀 couldn't serialize the run summary")?
        );
    } else {
        println!("{}", s3files::progress::summary_table(&summary));
    }

    if summary.has_failures() {
        error!(
            "💀 {} of {} objects failed to fetch",
            summary.failed.len(),
            summary.failed.len() + summary.fetched.len()
        );
        std::process::exit(1);
    }

    // ✅ Everything worked. Pop the champagne. 🍾
    Ok(())
}
