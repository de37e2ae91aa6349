//! 🔧 App Configuration: the sacred TOML-to-struct pipeline, now with buckets.
//!
//! 📡 "Config not found: We looked everywhere. Under the couch. Behind the fridge.
//! In the junk drawer. In us-east-1. Nothing." said every developer at 3am 🦆
//!
//! 🏗️ Powered by Figment, because manually parsing env vars is a form of
//! self-harm that even the borrow checker wouldn't approve of.
//!
//! Three tables, all optional, all defaulted:
//! ```toml
//! [storage]            # where the bucket is (StorageConfig, lives next to S3Store)
//! bucket = "my-bucket"
//! region = "us-east-1"
//!
//! [fetch]              # what to fetch
//! folder = "reports/2024"
//! keys = ["a.json", "b.json"]
//! preserve_folder_path = false
//!
//! [runtime]            # how hard to pull
//! throttle_threshold = 5
//! ```

use anyhow::Context;
use figment::{
    Figment,
    providers::{Env, Format, Toml},
};
use serde::Deserialize;
use std::path::Path;
use tracing::info;

use crate::keys::{KeyStream, create_key_stream};
use crate::pipeline::DEFAULT_THROTTLE_THRESHOLD;
use crate::storage::StorageConfig;

/// 📦 The AppConfig: one struct to rule them all, one struct to find them,
/// one struct to bring them all, and in the Figment bind them.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

/// 🗝️ Which objects to fetch and what to call them once they land.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct FetchConfig {
    /// 📁 Prefix joined onto every key with exactly one `/`. Empty or absent means none.
    #[serde(default)]
    pub folder: Option<String>,
    /// 🗝️ Key names, relative to `folder`. Absent means there is nothing to fetch.
    #[serde(default)]
    pub keys: Option<Vec<String>>,
    /// 🏷️ `true` keeps the full key as the output path; `false` keeps only the last segment.
    #[serde(default)]
    pub preserve_folder_path: bool,
}

impl FetchConfig {
    /// 🗝️ The key sequence this config describes. `None` if no keys were configured.
    pub fn key_stream(&self) -> Option<KeyStream> {
        create_key_stream(self.folder.as_deref(), self.keys.clone())
    }
}

/// ⚙️ Knobs for the pipeline itself.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RuntimeConfig {
    /// 🚦 Fetches allowed in flight before the key stream is paused. The one after this many
    /// still goes out, then the brakes engage.
    #[serde(default = "default_throttle_threshold")]
    pub throttle_threshold: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            throttle_threshold: default_throttle_threshold(),
        }
    }
}

fn default_throttle_threshold() -> usize {
    DEFAULT_THROTTLE_THRESHOLD
}

/// 🚀 Load the config from a file, from env vars, or from the sheer power of hoping.
///
/// 🔧 Merges environment variables (`S3F_*`, nested with `__`, e.g.
/// `S3F_STORAGE__BUCKET=my-bucket`) with an optional TOML file.
///
/// 📐 DESIGN NOTE:
///   - If `config_file_name` is None  → env vars only. No file. No assumptions.
///   - If `config_file_name` is Some  → env vars + TOML file, merged. TOML wins on conflicts.
///
/// 💀 Returns an error if config is unparseable. The message says which sources were involved.
pub fn load_config(config_file_name: Option<&Path>) -> anyhow::Result<AppConfig> {
    info!(
        "🔧 Loading configuration: {:#?}",
        config_file_name.unwrap_or(Path::new(""))
    );

    let config = Figment::new().merge(Env::prefixed("S3F_").split("__"));

    // -- 🎯 conditionally layer in TOML only if a file was actually provided
    let config = match config_file_name {
        Some(file_name) => config.merge(Toml::file(file_name)),
        None => config,
    };

    let context_msg = match config_file_name {
        Some(path) => format!(
            "💀 Failed to parse configuration from file '{}' and environment variables (S3F_*). \
             The file exists in our hearts, but apparently not in valid TOML.",
            path.display()
        ),
        None => "💀 Failed to parse configuration from environment variables (S3F_*). \
                 No file was provided, so this one's all on the environment. Classic."
            .to_string(),
    };

    config.extract().context(context_msg)
}
