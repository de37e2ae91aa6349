// ai
//! 🚦 THE PIPELINE: keys go in, files come out, five-ish at a time.
//!
//! 🎬 *[camera pans across a bucket holding ten thousand objects]*
//! 🎬 "In a world where every object must be fetched..."
//! 🎬 "One pipeline dared to fetch them all. But not all at once."
//! 🎬 *[record scratch]* 🦆
//!
//! 🧠 Knowledge graph:
//! - [`S3Files::connect`]: bucket + store (injected, or built from region/endpoint) + throttle
//! - [`S3Files::create_file_stream`]: spawns one `FetchDriver`, hands back a [`FileStream`]
//! - `FetchDriver` (driver.rs): pulls keys, runs fetches concurrently, owns the `InFlight` counter
//! - `fetch_object` (fetch_task.rs): one key → one `Data` or one `Error`
//! - `InFlight` (throttle.rs): pause when in-flight > threshold, resume on any settlement
//! - [`FileStream`]: the receiving end; `Data`/`Error` in any order, then exactly one `End`
//!
//! ⚠️ The event channel is unbounded on purpose. The throttle bounds open transfers, not how
//! many finished files a slow consumer lets pile up. That part is on you.

mod driver;
mod fetch_task;
mod throttle;

use std::sync::Arc;

use futures::Stream;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::app_config::RuntimeConfig;
use crate::common::{FetchEvent, FetchReport};
use crate::keys::{KeyStream, create_key_stream};
use crate::storage::{ObjectStore, S3Store, StorageConfig, default_s3_region};
use driver::FetchDriver;

/// 🚦 Fetches in flight before the key stream gets paused. The 6th fetch hits the brakes.
pub const DEFAULT_THROTTLE_THRESHOLD: usize = 5;

/// 🔧 Everything [`S3Files::connect`] needs to know.
///
/// If `store` is set it is used as-is (tests, MinIO wrappers, your own exotic backend).
/// Otherwise an [`S3Store`] is built from `region`, `endpoint_url` and `force_path_style`.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub bucket: String,
    pub store: Option<Arc<dyn ObjectStore>>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
    pub throttle_threshold: usize,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            store: None,
            region: None,
            endpoint_url: None,
            force_path_style: false,
            throttle_threshold: DEFAULT_THROTTLE_THRESHOLD,
        }
    }
}

impl ConnectOptions {
    /// 🔌 Options for a bucket served by an injected store.
    pub fn with_store(bucket: impl Into<String>, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            bucket: bucket.into(),
            store: Some(store),
            ..Self::default()
        }
    }

    /// 🔧 Options straight from loaded config. No injected store; S3 it is.
    pub fn from_config(storage: &StorageConfig, runtime: &RuntimeConfig) -> Self {
        Self {
            bucket: storage.bucket.clone(),
            store: None,
            region: Some(storage.region.clone()),
            endpoint_url: storage.endpoint_url.clone(),
            force_path_style: storage.force_path_style,
            throttle_threshold: runtime.throttle_threshold,
        }
    }
}

/// 🪣 A connected handle: one bucket, one store, one throttle setting.
///
/// Cheap to clone. Every `create_file_stream` call gets its own driver and its own counter,
/// so concurrent runs on the same handle never step on each other.
#[derive(Debug, Clone)]
pub struct S3Files {
    bucket: String,
    store: Arc<dyn ObjectStore>,
    throttle_threshold: usize,
}

impl S3Files {
    /// 🚀 Connect. Uses the injected store if there is one, otherwise builds an S3 client.
    ///
    /// Doesn't validate the bucket: a missing bucket is reported when you try to fetch.
    pub async fn connect(options: ConnectOptions) -> Self {
        let store: Arc<dyn ObjectStore> = match options.store {
            Some(store) => store,
            None => {
                let storage_config = StorageConfig {
                    bucket: options.bucket.clone(),
                    region: options
                        .region
                        .unwrap_or_else(default_s3_region),
                    endpoint_url: options.endpoint_url,
                    force_path_style: options.force_path_style,
                };
                Arc::new(S3Store::from_config(&storage_config).await)
            }
        };

        Self {
            bucket: options.bucket,
            store,
            throttle_threshold: options.throttle_threshold,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn throttle_threshold(&self) -> usize {
        self.throttle_threshold
    }

    /// 🗝️ Same as [`create_key_stream`], here so callers can chain off the handle.
    pub fn create_key_stream(&self, folder: Option<&str>, keys: Option<Vec<String>>) -> Option<KeyStream> {
        create_key_stream(folder, keys)
    }

    /// 📡 Start fetching every key from `keys`. Returns `None` if no bucket is configured.
    ///
    /// Must be called inside a tokio runtime: the driver is spawned right away.
    pub fn create_file_stream<S>(&self, keys: S, preserve_folder_path: bool) -> Option<FileStream>
    where
        S: Stream<Item = String> + Send + Unpin + 'static,
    {
        self.create_file_stream_with_cancel(keys, preserve_folder_path, CancellationToken::new())
    }

    /// 🛑 Like [`Self::create_file_stream`], but stoppable.
    ///
    /// Once `cancel` fires no new keys are pulled; fetches already in flight run to completion
    /// and are reported as usual, then `End` arrives. Exactly once, as always.
    pub fn create_file_stream_with_cancel<S>(
        &self,
        keys: S,
        preserve_folder_path: bool,
        cancel: CancellationToken,
    ) -> Option<FileStream>
    where
        S: Stream<Item = String> + Send + Unpin + 'static,
    {
        if self.bucket.is_empty() {
            warn!("💀 no bucket configured; refusing to create a file stream");
            return None;
        }

        let (tx, rx) = async_channel::unbounded();
        let driver = FetchDriver::new(
            keys,
            Arc::clone(&self.store),
            Arc::from(self.bucket.as_str()),
            preserve_folder_path,
            self.throttle_threshold,
            tx,
            cancel,
        );
        // -- 🚀 detached on purpose: the driver reports through the channel, fetch panics
        // -- included, and dropping the FileStream is how a consumer says "stop starting new fetches"
        driver.spawn();

        Some(FileStream { rx })
    }
}

/// 📡 The receiving end of one pipeline run.
///
/// Yields `Data` / `Error` events in completion order, then one `End`, then nothing
/// (`recv` returns `None` once the driver has hung up).
#[derive(Debug)]
pub struct FileStream {
    rx: async_channel::Receiver<FetchEvent>,
}

impl FileStream {
    /// 📥 Next event, or `None` after `End` has been delivered and the channel closed.
    pub async fn recv(&self) -> Option<FetchEvent> {
        self.rx.recv().await.ok()
    }

    /// 🧱 Blocking flavour of [`Self::recv`] for synchronous callers.
    ///
    /// ⚠️ Do not call this from inside an async task. It blocks the thread, and the runtime
    /// thread it blocks might be the one that was supposed to drive the fetches.
    pub fn recv_blocking(&self) -> Option<FetchEvent> {
        self.rx.recv_blocking().ok()
    }

    /// 🔄 Consume as a `futures::Stream` of events.
    pub fn into_stream(self) -> impl Stream<Item = FetchEvent> + Send {
        self.rx
    }

    /// 📋 Drain everything into a [`FetchReport`]. Resolves after `End`.
    pub async fn collect_all(self) -> FetchReport {
        let mut report = FetchReport::default();
        while let Some(event) = self.recv().await {
            match event {
                FetchEvent::Data(file) => report.files.push(file),
                FetchEvent::Error(failure) => report.failures.push(failure),
                FetchEvent::End => report.ended = true,
            }
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryStore, ObjectBody};
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::io::Cursor;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use std::time::Duration;
    use tokio::io::{AsyncRead, ReadBuf};
    use tokio::sync::Semaphore;

    // ============================================================
    //  🎭 Stunt doubles for the storage backend
    // ============================================================

    /// 🚧 Every fetch waits at a gate until the test lets it through.
    /// Counts how many are waiting right now and the most that ever waited at once.
    #[derive(Debug)]
    struct GatedStore {
        gate: Semaphore,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl GatedStore {
        fn closed() -> Arc<Self> {
            Arc::new(Self {
                gate: Semaphore::new(0),
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
            })
        }

        fn in_flight(&self) -> usize {
            self.in_flight.load(Ordering::SeqCst)
        }

        fn peak(&self) -> usize {
            self.peak.load(Ordering::SeqCst)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ObjectStore for GatedStore {
        async fn get_object(&self, _bucket: &str, _key: &str) -> anyhow::Result<ObjectBody> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.gate.acquire().await?.forget();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Box::new(Cursor::new(b"hi".to_vec())))
        }
    }

    /// 🙅 Says no to everything. Consistent, at least.
    #[derive(Debug)]
    struct RejectingStore;

    #[async_trait]
    impl ObjectStore for RejectingStore {
        async fn get_object(&self, _bucket: &str, _key: &str) -> anyhow::Result<ObjectBody> {
            Err(anyhow!("fail"))
        }
    }

    /// 💥 Says yes, then the connection drops halfway through the body.
    #[derive(Debug)]
    struct SnappingStore;

    struct SnappingBody;

    impl AsyncRead for SnappingBody {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "connection reset mid-transfer",
            )))
        }
    }

    #[async_trait]
    impl ObjectStore for SnappingStore {
        async fn get_object(&self, _bucket: &str, _key: &str) -> anyhow::Result<ObjectBody> {
            Ok(Box::new(SnappingBody))
        }
    }

    /// 💥 Fine with everyone except keys ending in `b`, which make it panic outright.
    #[derive(Debug)]
    struct TantrumStore;

    #[async_trait]
    impl ObjectStore for TantrumStore {
        async fn get_object(&self, _bucket: &str, key: &str) -> anyhow::Result<ObjectBody> {
            if key.ends_with('b') {
                panic!("💥 the store threw a tantrum over {key}");
            }
            Ok(Box::new(Cursor::new(b"hi".to_vec())))
        }
    }

    async fn connect_with(store: Arc<dyn ObjectStore>, throttle_threshold: usize) -> S3Files {
        S3Files::connect(ConnectOptions {
            throttle_threshold,
            ..ConnectOptions::with_store("bucket", store)
        })
        .await
    }

    fn keys(folder: &str, names: &[&str]) -> KeyStream {
        create_key_stream(
            Some(folder),
            Some(names.iter().map(|s| s.to_string()).collect()),
        )
        .expect("💀 keys were given")
    }

    fn numbered(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("k{i}")).collect()
    }

    /// ⏳ Poll a condition until it holds, or fail loudly after a few seconds.
    async fn wait_until(what: &str, condition: impl Fn() -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("💀 timed out waiting for: {what}"));
    }

    // ============================================================
    //  🧪 The tests
    // ============================================================

    #[tokio::test]
    async fn the_one_where_no_bucket_means_no_stream() {
        let the_files = S3Files::connect(ConnectOptions::with_store(
            "",
            Arc::new(InMemoryStore::new()),
        ))
        .await;

        assert!(the_files.create_file_stream(keys("f", &["a"]), false).is_none());
        assert!(
            the_files
                .create_file_stream(futures::stream::empty(), true)
                .is_none()
        );
    }

    #[tokio::test]
    async fn the_one_where_three_his_come_back_named_after_their_keys() {
        let the_store = InMemoryStore::new()
            .with_object("bucket", "folder/a", "hi")
            .with_object("bucket", "folder/b", "hi")
            .with_object("bucket", "folder/c", "hi");
        let the_files = connect_with(Arc::new(the_store), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_report = the_files
            .create_file_stream(keys("folder/", &["a", "b", "c"]), false)
            .expect("💀 bucket is set")
            .collect_all()
            .await;

        assert!(the_report.ended);
        assert!(the_report.failures.is_empty());
        let mut the_paths: Vec<&str> = the_report.files.iter().map(|f| f.path.as_str()).collect();
        the_paths.sort();
        assert_eq!(the_paths, vec!["a", "b", "c"]);
        assert!(the_report.files.iter().all(|f| f.content == b"hi"));
    }

    #[tokio::test]
    async fn the_one_where_preserve_folder_path_keeps_the_full_key() {
        let the_store = InMemoryStore::new().with_object("bucket", "folder/sub/a.txt", "x");
        let the_files = connect_with(Arc::new(the_store), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_report = the_files
            .create_file_stream(keys("folder", &["sub/a.txt"]), true)
            .expect("💀 bucket is set")
            .collect_all()
            .await;

        assert_eq!(the_report.files.len(), 1);
        assert_eq!(the_report.files[0].path, "folder/sub/a.txt");
    }

    #[tokio::test]
    async fn the_one_where_every_key_settles_exactly_once_despite_the_chaos() {
        let mut the_store = InMemoryStore::new();
        let the_names = numbered(20);
        // -- 🎲 only even keys exist; odd ones will 404 in spirit
        for (i, name) in the_names.iter().enumerate() {
            if i % 2 == 0 {
                the_store = the_store.with_object("bucket", name, name.as_bytes().to_vec());
            }
        }
        let the_files = connect_with(Arc::new(the_store), 3).await;

        let the_stream = the_files
            .create_file_stream(create_key_stream(None, Some(the_names)).expect("keys"), true)
            .expect("💀 bucket is set");

        let mut the_ends = 0;
        let mut the_settled = Vec::new();
        while let Some(event) = the_stream.recv().await {
            match event {
                FetchEvent::Data(file) => {
                    assert_eq!(file.content, file.path.as_bytes());
                    the_settled.push(file.path);
                }
                FetchEvent::Error(failure) => the_settled.push(failure.file),
                FetchEvent::End => {
                    the_ends += 1;
                    // -- 🏁 End is last: everything must have settled before it
                    assert_eq!(the_settled.len(), 20);
                }
            }
        }

        assert_eq!(the_ends, 1, "exactly one terminal event");
        the_settled.sort();
        let mut the_expected = numbered(20);
        the_expected.sort();
        assert_eq!(the_settled, the_expected, "each key settles exactly once");
    }

    #[tokio::test]
    async fn the_one_where_everything_fails_and_end_still_shows_up_once() {
        let the_files = connect_with(Arc::new(RejectingStore), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_stream = the_files
            .create_file_stream(keys("folder", &["a", "b", "c", "d", "e", "f", "g"]), false)
            .expect("💀 bucket is set");

        let mut the_failures = Vec::new();
        let mut the_ends = 0;
        while let Some(event) = the_stream.recv().await {
            match event {
                FetchEvent::Data(file) => panic!("💀 nothing should succeed, got {}", file.path),
                FetchEvent::Error(failure) => {
                    assert_eq!(failure.message(), "fail");
                    the_failures.push(failure.file);
                }
                FetchEvent::End => the_ends += 1,
            }
        }

        assert_eq!(the_ends, 1);
        the_failures.sort();
        assert_eq!(
            the_failures,
            vec!["folder/a", "folder/b", "folder/c", "folder/d", "folder/e", "folder/f", "folder/g"]
        );
    }

    #[tokio::test]
    async fn the_one_where_the_stream_snaps_mid_transfer() {
        let the_files = connect_with(Arc::new(SnappingStore), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_report = the_files
            .create_file_stream(keys("folder", &["a", "b"]), false)
            .expect("💀 bucket is set")
            .collect_all()
            .await;

        assert!(the_report.ended);
        assert!(the_report.files.is_empty());
        assert_eq!(the_report.failures.len(), 2);
        for failure in &the_report.failures {
            assert!(failure.file.starts_with("folder/"));
            assert!(failure.message().contains("stream broke mid-transfer"));
            assert!(failure.message().contains("connection reset mid-transfer"));
        }
    }

    #[tokio::test]
    async fn the_one_where_one_fetch_panics_and_its_siblings_carry_on() {
        let the_files = connect_with(Arc::new(TantrumStore), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_report = the_files
            .create_file_stream(keys("folder", &["a", "b", "c"]), false)
            .expect("💀 bucket is set")
            .collect_all()
            .await;

        assert!(the_report.ended, "End still arrives after a panicked fetch");
        let mut the_paths: Vec<&str> = the_report.files.iter().map(|f| f.path.as_str()).collect();
        the_paths.sort();
        assert_eq!(the_paths, vec!["a", "c"]);
        assert_eq!(the_report.failures.len(), 1);
        assert_eq!(the_report.failures[0].file, "folder/b");
        assert!(the_report.failures[0].message().contains("died before reporting"));
    }

    #[tokio::test]
    async fn the_one_where_the_sixth_fetch_engages_back_pressure() {
        let the_store = GatedStore::closed();
        let the_files = connect_with(the_store.clone(), 5).await;

        let the_stream = the_files
            .create_file_stream(keys("f", &["1", "2", "3", "4", "5", "6"]), false)
            .expect("💀 bucket is set");

        // -- 🚧 gate is shut: nothing can complete, so whatever is in flight is truly concurrent
        wait_until("six fetches in flight", || the_store.in_flight() == 6).await;
        assert!(the_store.peak() >= 5);

        the_store.gate.add_permits(6);
        let the_report = the_stream.collect_all().await;

        assert!(the_report.ended);
        assert_eq!(the_report.files.len(), 6);
        assert_eq!(the_store.peak(), 6);
    }

    #[tokio::test]
    async fn the_one_where_the_throttle_holds_the_line_for_long_key_lists() {
        let the_store = GatedStore::closed();
        let the_files = connect_with(the_store.clone(), 3).await;

        let the_stream = the_files
            .create_file_stream(create_key_stream(None, Some(numbered(20))).expect("keys"), false)
            .expect("💀 bucket is set");

        wait_until("threshold + 1 in flight", || the_store.in_flight() == 4).await;
        // -- ⏸️ paused: give the driver every chance to misbehave, then check it didn't
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(the_store.calls(), 4, "no keys pulled while paused");

        the_store.gate.add_permits(20);
        let the_report = the_stream.collect_all().await;

        assert!(the_report.ended);
        assert_eq!(the_report.files.len(), 20);
        assert_eq!(the_store.peak(), 4, "never more than threshold + 1 in flight");
    }

    #[tokio::test]
    async fn the_one_where_cancellation_drains_in_flight_and_starts_nothing_new() {
        let the_store = GatedStore::closed();
        let the_files = connect_with(the_store.clone(), 2).await;
        let the_cancel = CancellationToken::new();

        let the_stream = the_files
            .create_file_stream_with_cancel(
                create_key_stream(None, Some(numbered(10))).expect("keys"),
                false,
                the_cancel.clone(),
            )
            .expect("💀 bucket is set");

        wait_until("three fetches in flight", || the_store.in_flight() == 3).await;
        the_cancel.cancel();
        the_store.gate.add_permits(10);

        let the_report = the_stream.collect_all().await;

        assert!(the_report.ended, "End fires even when cancelled");
        assert_eq!(the_report.files.len(), 3, "in-flight fetches finish");
        assert_eq!(the_store.calls(), 3, "nothing new starts after cancel");
    }

    #[tokio::test]
    async fn the_one_where_an_empty_key_list_goes_straight_to_end() {
        let the_files = connect_with(Arc::new(InMemoryStore::new()), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_stream = the_files
            .create_file_stream(keys("folder", &[]), false)
            .expect("💀 bucket is set");

        assert!(matches!(the_stream.recv().await, Some(FetchEvent::End)));
        assert!(the_stream.recv().await.is_none(), "channel closes after End");
    }

    #[tokio::test]
    async fn the_one_where_duplicates_are_fetched_twice_and_any_stream_will_do() {
        let the_store = InMemoryStore::new().with_object("bucket", "a", "hi");
        let the_files = connect_with(Arc::new(the_store), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_keys = futures::stream::iter(vec!["a".to_string(), "a".to_string()]);
        let the_report = the_files
            .create_file_stream(the_keys, false)
            .expect("💀 bucket is set")
            .collect_all()
            .await;

        assert_eq!(the_report.files.len(), 2);
        assert!(the_report.ended);
    }

    #[tokio::test]
    async fn the_one_where_two_runs_share_a_handle_but_not_a_counter() {
        let the_store = InMemoryStore::new()
            .with_object("bucket", "a", "1")
            .with_object("bucket", "b", "22");
        let the_files = connect_with(Arc::new(the_store), 0).await;

        let first = the_files
            .create_file_stream(keys("", &["a", "b", "a"]), false)
            .expect("💀 bucket is set");
        let second = the_files
            .create_file_stream(keys("", &["b"]), false)
            .expect("💀 bucket is set");

        let (first, second) = tokio::join!(first.collect_all(), second.collect_all());

        assert!(first.ended && second.ended);
        assert_eq!(first.files.len(), 3);
        assert_eq!(second.files.len(), 1);
        assert_eq!(second.total_bytes(), 2);
    }

    #[tokio::test]
    async fn the_one_where_the_stream_interface_ends_with_end() {
        use futures::StreamExt;

        let the_store = InMemoryStore::new().with_object("bucket", "x/a", "hi");
        let the_files = connect_with(Arc::new(the_store), DEFAULT_THROTTLE_THRESHOLD).await;

        let the_events: Vec<FetchEvent> = the_files
            .create_file_stream(keys("x", &["a", "missing"]), false)
            .expect("💀 bucket is set")
            .into_stream()
            .collect()
            .await;

        assert_eq!(the_events.len(), 3);
        assert!(the_events.last().is_some_and(FetchEvent::is_end));
        assert_eq!(the_events.iter().filter(|e| e.is_end()).count(), 1);
    }

    #[test]
    fn the_one_where_a_synchronous_caller_blocks_its_way_through() {
        let the_runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()
            .expect("💀 could not build a runtime. The runtime could not build us either.");

        let the_store = InMemoryStore::new()
            .with_object("bucket", "folder/a", "hi")
            .with_object("bucket", "folder/b", "hi");
        let the_files =
            the_runtime.block_on(connect_with(Arc::new(the_store), DEFAULT_THROTTLE_THRESHOLD));

        let _guard = the_runtime.enter();
        let the_stream = the_files
            .create_file_stream(keys("folder", &["a", "b"]), false)
            .expect("💀 bucket is set");

        let mut the_data = 0;
        let mut the_ends = 0;
        while let Some(event) = the_stream.recv_blocking() {
            match event {
                FetchEvent::Data(_) => the_data += 1,
                FetchEvent::Error(failure) => panic!("💀 unexpected failure: {failure}"),
                FetchEvent::End => the_ends += 1,
            }
        }

        assert_eq!(the_data, 2);
        assert_eq!(the_ends, 1);
    }

    #[tokio::test]
    async fn the_one_where_options_follow_the_config() {
        let the_storage = StorageConfig {
            bucket: "b".into(),
            region: "eu-west-1".into(),
            endpoint_url: Some("http://localhost:9000".into()),
            force_path_style: true,
        };
        let the_runtime = RuntimeConfig {
            throttle_threshold: 9,
        };

        let the_options = ConnectOptions::from_config(&the_storage, &the_runtime);

        assert_eq!(the_options.bucket, "b");
        assert_eq!(the_options.region.as_deref(), Some("eu-west-1"));
        assert_eq!(the_options.endpoint_url.as_deref(), Some("http://localhost:9000"));
        assert!(the_options.force_path_style);
        assert_eq!(the_options.throttle_threshold, 9);
        assert!(the_options.store.is_none());
        assert_eq!(ConnectOptions::default().throttle_threshold, 5);
    }
}
