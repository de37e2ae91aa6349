//! 🪣 s3files: pull a list of objects out of a bucket, a few at a time, into memory.
//!
//! 🎬 *[narrator voice]* "It all started with a folder name and a list of keys..."
//!
//! 🧠 Knowledge graph:
//! - [`keys`]: folder + names → [`KeyStream`] of fully-qualified keys
//! - [`storage`]: the [`ObjectStore`] contract, [`S3Store`] and [`InMemoryStore`]
//! - [`pipeline`]: [`S3Files`] and [`FileStream`], the throttled fetch engine
//! - [`app_config`]: figment-loaded TOML + `S3F_*` env
//! - [`progress`]: indicatif bar while running, comfy-table when done
//! - [`run`]: config in, [`RunSummary`] out. What the CLI calls.

use std::time::Instant;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub mod app_config;
pub mod common;
pub mod keys;
pub mod pipeline;
pub mod progress;
pub mod storage;

pub use app_config::{AppConfig, FetchConfig, RuntimeConfig};
pub use common::{
    FailedEntry, FetchEvent, FetchFailure, FetchReport, FetchedEntry, FetchedFile, RunSummary,
};
pub use keys::{KeyStream, create_key_stream};
pub use pipeline::{ConnectOptions, DEFAULT_THROTTLE_THRESHOLD, FileStream, S3Files};
pub use storage::{InMemoryStore, ObjectBody, ObjectStore, S3Store, StorageConfig};

use progress::FetchProgress;

/// 🚀 Load it, do it: connect from config, fetch every configured key, summarize.
pub async fn run(app_config: AppConfig) -> Result<RunSummary> {
    run_with_cancel(app_config, CancellationToken::new()).await
}

/// 🛑 [`run`], but stoppable. The CLI wires ctrl-c into `cancel`.
///
/// A cancelled run still returns `Ok`: whatever settled before the stop is in the summary.
pub async fn run_with_cancel(app_config: AppConfig, cancel: CancellationToken) -> Result<RunSummary> {
    let the_files = S3Files::connect(ConnectOptions::from_config(
        &app_config.storage,
        &app_config.runtime,
    ))
    .await;
    run_with(&the_files, &app_config.fetch, cancel).await
}

/// 🔄 Drain one pipeline run on an already-connected handle into a [`RunSummary`].
///
/// Fetched bytes are counted and dropped; the summary keeps paths and sizes only.
pub async fn run_with(
    files: &S3Files,
    fetch: &FetchConfig,
    cancel: CancellationToken,
) -> Result<RunSummary> {
    let start_time = Instant::now();

    let keys = fetch.key_stream().unwrap_or_else(|| {
        warn!("⚠️ no keys configured under [fetch]; nothing to do");
        KeyStream::default()
    });
    let total_keys = keys.remaining() as u64;

    let the_stream = files
        .create_file_stream_with_cancel(keys, fetch.preserve_folder_path, cancel)
        .context(
            "💀 No bucket configured, so there is nowhere to fetch from. \
             Set `bucket` under [storage] in the config file, or S3F_STORAGE__BUCKET in the environment.",
        )?;

    let mut progress = FetchProgress::new(files.bucket(), total_keys);
    let mut summary = RunSummary {
        bucket: files.bucket().to_string(),
        ..RunSummary::default()
    };

    while let Some(event) = the_stream.recv().await {
        progress.record(&event);
        match event {
            FetchEvent::Data(file) => {
                let bytes = file.content.len() as u64;
                summary.total_bytes += bytes;
                summary.fetched.push(FetchedEntry {
                    path: file.path,
                    bytes,
                });
            }
            FetchEvent::Error(failure) => {
                warn!("💀 {}", failure);
                summary.failed.push(FailedEntry {
                    message: failure.message(),
                    file: failure.file,
                });
            }
            FetchEvent::End => break,
        }
    }
    progress.finish();

    summary.elapsed_ms = start_time.elapsed().as_millis();
    info!(
        "🏁 run complete: {} fetched, {} failed, {} bytes in {} ms",
        summary.fetched.len(),
        summary.failed.len(),
        summary.total_bytes,
        summary.elapsed_ms
    );
    Ok(summary)
}
