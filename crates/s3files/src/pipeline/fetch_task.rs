//! 📥 One key, one fetch, one event. The atomic unit of this whole operation.
//!
//! `fetch_object` opens the object, drains it into a `Vec<u8>`, and turns the outcome
//! into a [`FetchEvent`]. It never returns an error to its caller: failure is just
//! another kind of event, tagged with the key it belongs to.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::AsyncReadExt;
use tracing::{debug, trace};

use crate::common::{FetchEvent, FetchFailure, FetchedFile};
use crate::keys::file_name_of;
use crate::storage::ObjectStore;

/// 📥 Fetch `key` from `bucket` in full and report how it went.
///
/// - success → `FetchEvent::Data` with `path` = `key` or its last segment
/// - request rejected, or the body errors mid-read → `FetchEvent::Error` carrying `key`
pub(crate) async fn fetch_object(
    store: Arc<dyn ObjectStore>,
    bucket: Arc<str>,
    key: String,
    preserve_folder_path: bool,
) -> FetchEvent {
    match read_whole_object(store.as_ref(), &bucket, &key).await {
        Ok(content) => {
            trace!("🪣 hauled {} bytes from s3://{}/{}", content.len(), bucket, key);
            let path = if preserve_folder_path {
                key
            } else {
                file_name_of(&key).to_string()
            };
            FetchEvent::Data(FetchedFile { content, path })
        }
        Err(error) => {
            debug!("💀 fetch failed for s3://{}/{}: {:#}", bucket, key, error);
            FetchEvent::Error(FetchFailure::new(key, error))
        }
    }
}

async fn read_whole_object(store: &dyn ObjectStore, bucket: &str, key: &str) -> Result<Vec<u8>> {
    let mut body = store.get_object(bucket, key).await?;
    let mut content = Vec::new();
    body.read_to_end(&mut content)
        .await
        .with_context(|| format!("💀 stream broke mid-transfer for s3://{bucket}/{key}"))?;
    Ok(content)
}
