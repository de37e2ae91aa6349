//! 🚦 In-flight accounting: one counter, one flag, one very strict bouncer.
//!
//! Owned by exactly one driver for exactly one run. No globals, no atomics, no sharing.
//! Two runs side by side each get their own bouncer and never gossip.

/// 🚦 Counts fetches in flight and decides when the key stream should stop being pulled.
///
/// Policy, preserved exactly:
/// - `start()`: count += 1; if count > threshold, pause.
/// - `settle()`: count -= 1; if paused, resume.
///
/// Which means the fetch that tips the count over the threshold still goes out, and the peak
/// is `threshold + 1`. With the default threshold of 5, the 6th fetch engages the brakes.
#[derive(Debug)]
pub(crate) struct InFlight {
    count: usize,
    threshold: usize,
    paused: bool,
}

impl InFlight {
    pub(crate) fn new(threshold: usize) -> Self {
        Self {
            count: 0,
            threshold,
            paused: false,
        }
    }

    /// 🚀 A fetch just started. Returns `true` if this start engaged back-pressure.
    pub(crate) fn start(&mut self) -> bool {
        self.count += 1;
        if self.count > self.threshold && !self.paused {
            self.paused = true;
            return true;
        }
        false
    }

    /// 🏁 A fetch just settled (either way). Returns `true` if this released back-pressure.
    pub(crate) fn settle(&mut self) -> bool {
        // -- 🐛 settling more than we started is a driver bug, not a runtime condition
        debug_assert!(self.count > 0, "settled a fetch that never started");
        self.count = self.count.saturating_sub(1);
        if self.paused {
            self.paused = false;
            return true;
        }
        false
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.paused
    }

    pub(crate) fn is_idle(&self) -> bool {
        self.count == 0
    }
}
