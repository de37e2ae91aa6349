// ai
//! 📦 Common data structures: the things that come out the other end of the pipe.
//!
//! 🎬 COLD OPEN: INT. DATA CENTER, 3:47 AM
//!
//! A bucket holds ten thousand objects. Somebody needs all of them. In memory.
//! By morning. The pipeline hums, keys go in, and out the other side come
//! `FetchEvent`s: a `Data` for every object that made it, an `Error` for every
//! object that didn't, and one single, solitary `End`. Exactly one. We checked.
//!
//! 🦆
//!
//! These structs don't fetch anything. They carry what was fetched.
//! They are the postal workers of this codebase. Please tip your postal workers.

use std::fmt;

use serde::Serialize;

/// 📦 One successfully fetched object: every byte of it, plus the name it goes by.
///
/// `path` is either the full key (`folder/sub/a.txt`) or just the last segment
/// (`a.txt`), depending on whether the caller asked to preserve folder paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// 🧱 The full object content. Buffered in RAM. All of it. No streaming-to-disk here.
    pub content: Vec<u8>,
    /// 🏷️ Output path for this object.
    pub path: String,
}

/// 💀 One object that did not make it.
///
/// Carries the originating key in `file` and the underlying cause in `error`.
/// The pipeline never retries. If you want retries, you hold the key, you hold the power.
#[derive(Debug)]
pub struct FetchFailure {
    /// 🗝️ The fully-qualified key whose fetch failed.
    pub file: String,
    pub error: anyhow::Error,
}

impl FetchFailure {
    pub(crate) fn new(file: impl Into<String>, error: anyhow::Error) -> Self {
        Self {
            file: file.into(),
            error,
        }
    }

    /// 📜 The failure message with its full cause chain flattened onto one line.
    ///
    /// anyhow's `{:#}` formatting does the heavy lifting: `outer: inner: innermost`.
    pub fn message(&self) -> String {
        format!("{:#}", self.error)
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // -- 🎭 key first, cause second. The key is the "who", the error is the "what happened to them".
        write!(f, "{}: {:#}", self.file, self.error)
    }
}

impl std::error::Error for FetchFailure {}

/// 📡 The three things a file stream can ever tell you.
///
/// `Data` and `Error` arrive in whatever order the network feels like.
/// `End` arrives once, last, after every fetch has settled. Then the channel closes.
#[derive(Debug)]
pub enum FetchEvent {
    /// ✅ An object arrived in full.
    Data(FetchedFile),
    /// 💀 An object failed. Siblings are unaffected.
    Error(FetchFailure),
    /// 🏁 No more in-flight or pending work. Fin.
    End,
}

impl FetchEvent {
    pub fn is_end(&self) -> bool {
        matches!(self, FetchEvent::End)
    }
}

/// 📋 Everything a drained `FileStream` produced, sorted into piles.
///
/// `ended` is the receipt: `true` iff the terminal `End` event was observed.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub files: Vec<FetchedFile>,
    pub failures: Vec<FetchFailure>,
    pub ended: bool,
}

impl FetchReport {
    /// 🔢 How many keys settled, success or not.
    pub fn settled(&self) -> usize {
        self.files.len() + self.failures.len()
    }

    /// 📊 Total bytes across every fetched file.
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|file| file.content.len()).sum()
    }
}

/// 🧾 Serializable, content-free summary of one run.
///
/// Built by [`crate::run`] for the CLI: it keeps sizes and messages but drops
/// the bytes, because nobody wants 4 GiB of JSON in their terminal.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub bucket: String,
    pub fetched: Vec<FetchedEntry>,
    pub failed: Vec<FailedEntry>,
    pub total_bytes: u64,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchedEntry {
    pub path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedEntry {
    pub file: String,
    pub message: String,
}

impl RunSummary {
    pub fn has_failures(&self) -> bool {
        !self.failed.is_empty()
    }
}
