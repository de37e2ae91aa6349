//! # Previously, on s3files...
//!
//! 🎬 The bucket was on the other side of the internet. The test suite was on this side.
//! Neither wanted to make the trip. So we built a bucket that lives entirely in RAM,
//! gone the moment you blink.
//!
//! [`InMemoryStore`] keeps objects in a `HashMap` keyed by `(bucket, key)` behind an
//! `Arc<RwLock<...>>`, so clones share the same objects. Great for assertions, great for
//! demos, great for trust issues.
//!
//! ⚠️ This is NOT S3. It has no latency, no throttling, no bill. Enjoy it while it lasts.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use super::{ObjectBody, ObjectStore};

/// 📦 A bucket-shaped `HashMap`. Clone-able; every clone sees the same objects.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    objects: Arc<RwLock<HashMap<(String, String), Vec<u8>>>>,
}

impl InMemoryStore {
    /// 🚀 An empty store. No objects, no config, no prayers required.
    pub fn new() -> Self {
        Self::default()
    }

    /// 🏗️ Builder-style seeding for tests: `InMemoryStore::new().with_object("b", "k", "hi")`.
    ///
    /// Clones share the map, so seeding one clone seeds them all.
    pub fn with_object(self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) -> Self {
        self.insert(bucket, key, content);
        self
    }

    /// 📥 Put (or overwrite) an object.
    pub fn insert(&self, bucket: &str, key: &str, content: impl Into<Vec<u8>>) {
        self.write()
            .insert((bucket.to_string(), key.to_string()), content.into());
    }

    /// 🔢 How many objects are stored across all buckets.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // -- 🔒 the lock is never held across an await and no code under it panics,
    // -- so a poisoned map is still a perfectly good map
    fn read(&self) -> RwLockReadGuard<'_, HashMap<(String, String), Vec<u8>>> {
        self.objects.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<(String, String), Vec<u8>>> {
        self.objects.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl ObjectStore for InMemoryStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<ObjectBody> {
        // -- 🧠 copy out of the map: the body must outlive the read guard
        let content = self
            .read()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| anyhow!("💀 NoSuchKey: s3://{bucket}/{key} does not exist in memory"))?;
        Ok(Box::new(Cursor::new(content)))
    }
}
