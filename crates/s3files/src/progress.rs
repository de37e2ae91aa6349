// AI
//! 📊 progress.rs: "Are we there yet?" asked every pipeline, every time, forever.
//!
//! 🚀 Two jobs:
//! - [`FetchProgress`]: a live indicatif bar while a run drains its [`FileStream`](crate::FileStream),
//!   one tick per settled key, with a comfy-table of rates hanging underneath.
//! - [`summary_table`]: the after-party. What came down, what didn't, how big, how long.
//!
//! ⚠️ Watching this progress bar will not make it go faster. Science says no.

use std::time::{Duration, Instant};

use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::NOTHING, presets::UTF8_FULL};
use indicatif::{ProgressBar, ProgressStyle};

use crate::common::{FetchEvent, RunSummary};

// -- 📏 one mebibyte. not a megabyte, pedants.
const MIB: u64 = 1024 * 1024;
const KIB: u64 = 1024;

/// 📦 Bytes, scaled to whatever unit keeps the number readable.
fn format_bytes(bytes: u64) -> String {
    if bytes >= MIB {
        format!("{:.2} MiB", bytes as f64 / MIB as f64)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes as f64 / KIB as f64)
    } else {
        // -- 🐛 raw bytes mode. small files need love too.
        format!("{} bytes", bytes)
    }
}

/// 🔢 "1000000" → "1,000,000". You're welcome, eyes.
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// ⏱️ MM:SS, or HH:MM:SS if you should probably call your mom.
fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// 📊 Live progress for one run: keys settled out of keys expected.
///
/// The bar length is the number of keys (known up front from the key stream), not bytes:
/// object sizes are a surprise until each one lands.
pub(crate) struct FetchProgress {
    bucket: String,
    total_keys: u64,
    fetched: u64,
    failed: u64,
    total_bytes: u64,
    progress_bar: ProgressBar,
    start_time: Instant,
}

impl std::fmt::Debug for FetchProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // -- 🎭 ProgressBar is a diva and doesn't derive Debug
        f.debug_struct("FetchProgress")
            .field("bucket", &self.bucket)
            .field("total_keys", &self.total_keys)
            .field("fetched", &self.fetched)
            .field("failed", &self.failed)
            .field("total_bytes", &self.total_bytes)
            .finish()
    }
}

impl FetchProgress {
    pub(crate) fn new(bucket: &str, total_keys: u64) -> Self {
        let progress_bar = ProgressBar::new(total_keys);
        // -- 🎨 a bad template only costs us the pretty bar, never the run
        if let Ok(style) = ProgressStyle::default_bar().template("{msg}\n| [{bar:40.cyan/blue}] {pos}/{len}") {
            progress_bar.set_style(style.progress_chars("=>-"));
        }

        Self {
            bucket: bucket.to_string(),
            total_keys,
            fetched: 0,
            failed: 0,
            total_bytes: 0,
            progress_bar,
            start_time: Instant::now(),
        }
    }

    /// 🔄 Count one event. `End` doesn't move the bar; it just means stop asking.
    pub(crate) fn record(&mut self, event: &FetchEvent) {
        match event {
            FetchEvent::Data(file) => {
                self.fetched += 1;
                self.total_bytes += file.content.len() as u64;
            }
            FetchEvent::Error(_) => self.failed += 1,
            FetchEvent::End => return,
        }
        self.progress_bar.set_position(self.settled());
        self.render();
    }

    pub(crate) fn settled(&self) -> u64 {
        self.fetched + self.failed
    }

    /// ✅ Mark the bar done. Ring the bell.
    pub(crate) fn finish(&self) {
        self.progress_bar.finish();
    }

    /// 🎨 The numbers under the bar:
    /// ```text
    ///   <files/s>    <n> fetched
    ///   <MiB/s>      <n> failed
    ///   <elapsed>    <bytes so far>
    /// ```
    fn render(&self) {
        let elapsed = self.start_time.elapsed();
        let secs = elapsed.as_secs_f64();
        let (files_per_sec, mib_per_sec) = if secs > 0.0 {
            (
                self.settled() as f64 / secs,
                (self.total_bytes as f64 / secs) / MIB as f64,
            )
        } else {
            // -- 💤 no time has passed. return zeros and maintain composure.
            (0.0, 0.0)
        };

        let mut table = Table::new();
        table.load_preset(NOTHING);
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.add_row(vec![
            Cell::new(format!("{:.1} files/s", files_per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} fetched", format_number(self.fetched)))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{:.2} MiB/s", mib_per_sec)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{} failed", format_number(self.failed)))
                .set_alignment(CellAlignment::Right),
        ]);
        table.add_row(vec![
            Cell::new(format!("{} elapsed", format_duration(elapsed)))
                .set_alignment(CellAlignment::Right),
            Cell::new(format_bytes(self.total_bytes)).set_alignment(CellAlignment::Right),
        ]);

        self.progress_bar
            .set_message(format!("bucket: {}\n{}", self.bucket, table));
    }
}

/// 🧾 The end-of-run table: one row per key, then a totals row.
///
/// Failures list their message in the last column; successes list their size.
pub fn summary_table(summary: &RunSummary) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["status", "path", "size / error"]);

    for entry in &summary.fetched {
        table.add_row(vec![
            Cell::new("✅ fetched"),
            Cell::new(&entry.path),
            Cell::new(format_bytes(entry.bytes)).set_alignment(CellAlignment::Right),
        ]);
    }
    for entry in &summary.failed {
        table.add_row(vec![
            Cell::new("💀 failed"),
            Cell::new(&entry.file),
            Cell::new(&entry.message),
        ]);
    }

    table.add_row(vec![
        Cell::new("total"),
        Cell::new(format!(
            "{} fetched, {} failed in {}",
            format_number(summary.fetched.len() as u64),
            format_number(summary.failed.len() as u64),
            format_duration(Duration::from_millis(
                u64::try_from(summary.elapsed_ms).unwrap_or(u64::MAX)
            ))
        )),
        Cell::new(format_bytes(summary.total_bytes)).set_alignment(CellAlignment::Right),
    ]);
    table
}
