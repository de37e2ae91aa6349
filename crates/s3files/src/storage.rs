//! 🔌 Storage: the narrow doorway between the pipeline and wherever the bytes actually live.
//!
//! 🪣 The pipeline asks one question: "give me the object at `(bucket, key)`".
//! The store answers with a readable byte source, or with an error. That's the whole contract.
//! Create, delete, list, lifecycle rules? Not our department. Try the front desk.
//!
//! 🎭 Casting call:
//! - [`S3Store`]: the real deal. aws-sdk-s3 `GetObject` → `ByteStream::into_async_read()`.
//! - [`InMemoryStore`]: a bucket that lives in a `HashMap`. For tests, demos and trust issues.
//! - Anything else: implement [`ObjectStore`], hand it to `ConnectOptions::store`, done.
//!
//! 🦆 The duck has read-only access. It did not ask for more.

use anyhow::Result;
use async_trait::async_trait;
use tokio::io::AsyncRead;

mod in_mem;
mod s3;

pub use in_mem::InMemoryStore;
pub use s3::{S3Store, StorageConfig};
pub(crate) use s3::default_s3_region;

/// 🧠 Type-erased body reader. Same trick the S3 backend has always used: box the
/// opaque `impl AsyncRead` so it fits in a struct field or a trait return type.
pub type ObjectBody = Box<dyn AsyncRead + Send + Unpin>;

/// 🪣 A thing that can hand over an object's bytes, given a bucket and a key.
///
/// # Contract 📜
/// - `Ok(body)`: the object exists and its bytes can be read from `body` until EOF.
/// - `Err(...)`: the request was rejected (missing key, no permission, network on fire).
/// - A read error from `body` mid-transfer is *also* a failure of that key. The pipeline
///   treats both kinds the same way, so implementors don't need to pre-read anything.
#[async_trait]
pub trait ObjectStore: std::fmt::Debug + Send + Sync {
    /// 📥 Open the object at `(bucket, key)` for reading.
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody>;
}
