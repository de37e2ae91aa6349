//! 🎬 *[a key stream fills with names. somewhere, a bucket waits.]*
//! *[the clock on the wall reads 2:47am.]*
//! *[six fetches are in flight. the seventh key will have to wait its turn.]*
//!
//! 🚦 The FetchDriver: the one task per run that pulls keys, launches fetches, counts them,
//! stops pulling when too many are out, and says `End` exactly once when it's all over.
//!
//! 🧠 Knowledge graph:
//! - Keys: any `Stream<Item = String>`; not polled at all while paused. That IS the back-pressure.
//! - Fetches: one tokio task per key in a `JoinSet`, so a fetch that panics takes down
//!   only itself. Its key comes back as an `Error` like any other failure.
//! - Counter + pause flag: `InFlight`, owned here, nowhere else
//! - Per key: event sent → settle → counter down → maybe resume → maybe `End`
//! - Cancellation: stop pulling keys, let in-flight fetches drain, still send `End`
//! - Receiver dropped: same as cancellation, minus anyone to tell about it

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::anyhow;
use async_channel::Sender;
use futures::{Stream, StreamExt};
use tokio::task::{self, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::fetch_task::fetch_object;
use super::throttle::InFlight;
use crate::common::{FetchEvent, FetchFailure};
use crate::storage::ObjectStore;

/// 🚦 Drives one pipeline run from first key to `End`.
pub(crate) struct FetchDriver<S> {
    keys: S,
    store: Arc<dyn ObjectStore>,
    bucket: Arc<str>,
    preserve_folder_path: bool,
    in_flight: InFlight,
    tx: Sender<FetchEvent>,
    // -- 🛑 a child of the caller's token: we may cancel ourselves without cancelling them
    cancel: CancellationToken,
}

impl<S> FetchDriver<S>
where
    S: Stream<Item = String> + Send + Unpin + 'static,
{
    pub(crate) fn new(
        keys: S,
        store: Arc<dyn ObjectStore>,
        bucket: Arc<str>,
        preserve_folder_path: bool,
        throttle_threshold: usize,
        tx: Sender<FetchEvent>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            keys,
            store,
            bucket,
            preserve_folder_path,
            in_flight: InFlight::new(throttle_threshold),
            tx,
            cancel: cancel.child_token(),
        }
    }

    /// 🚀 Start the run on its own task and walk away. Everything the run has to say,
    /// `End` included, comes through the channel.
    pub(crate) fn spawn(self) {
        tokio::spawn(self.run());
    }

    async fn run(mut self) {
        info!("🚀 fetching from bucket '{}'", self.bucket);

        let mut fetches: JoinSet<FetchEvent> = JoinSet::new();
        // -- 🗝️ which key each task is fetching, so a panicked task can still be named
        let mut keys_by_task: HashMap<task::Id, String> = HashMap::new();
        let mut exhausted = false;
        let (mut fetched, mut failed) = (0usize, 0usize);

        loop {
            if exhausted && self.in_flight.is_idle() {
                break;
            }
            let can_pull = !exhausted && !self.in_flight.is_paused();

            tokio::select! {
                // -- 🧠 settlements first: draining is always more urgent than starting
                biased;

                Some(joined) = fetches.join_next_with_id(), if !fetches.is_empty() => {
                    let event = match joined {
                        Ok((id, event)) => {
                            keys_by_task.remove(&id);
                            event
                        }
                        Err(join_error) => {
                            let key = keys_by_task.remove(&join_error.id()).unwrap_or_default();
                            self.died(key, join_error)
                        }
                    };
                    match &event {
                        FetchEvent::Data(_) => fetched += 1,
                        FetchEvent::Error(_) => failed += 1,
                        FetchEvent::End => {}
                    }
                    if self.tx.send(event).await.is_err() && !self.cancel.is_cancelled() {
                        debug!("📪 file stream dropped by its consumer; no new fetches will start");
                        self.cancel.cancel();
                    }
                    if self.in_flight.settle() {
                        trace!("▶️ resumed key stream at {} in flight", self.in_flight.count());
                    }
                }

                _ = self.cancel.cancelled(), if !exhausted => {
                    info!(
                        "🛑 cancelled: no new keys, draining {} in-flight fetches",
                        self.in_flight.count()
                    );
                    exhausted = true;
                }

                next_key = self.keys.next(), if can_pull => {
                    match next_key {
                        Some(key) => {
                            if self.in_flight.start() {
                                trace!("⏸️ paused key stream at {} in flight", self.in_flight.count());
                            }
                            let the_task = fetches.spawn(fetch_object(
                                Arc::clone(&self.store),
                                Arc::clone(&self.bucket),
                                key.clone(),
                                self.preserve_folder_path,
                            ));
                            keys_by_task.insert(the_task.id(), key);
                        }
                        None => {
                            debug!("🏁 key stream exhausted with {} in flight", self.in_flight.count());
                            exhausted = true;
                        }
                    }
                }

                // -- 🐛 every branch disabled: nothing left to wait on
                else => break,
            }
        }

        info!(
            "🏁 all fetches settled for bucket '{}': {} fetched, {} failed",
            self.bucket, fetched, failed
        );
        // -- 📪 nobody listening is fine; the terminal event is sent exactly once either way
        let _ = self.tx.send(FetchEvent::End).await;
    }

    /// 💀 A fetch task panicked (or was aborted). Report it against its key like any other failure.
    fn died(&self, key: String, join_error: JoinError) -> FetchEvent {
        warn!("💀 fetch task for s3://{}/{} died: {}", self.bucket, key, join_error);
        let the_error = anyhow!(
            "💀 fetch task for s3://{}/{} died before reporting: {}",
            self.bucket,
            key,
            join_error
        );
        FetchEvent::Error(FetchFailure::new(key, the_error))
    }
}
