// ai
//! 🗝️ Key Sequencer: folder + names in, fully-qualified keys out.
//!
//! 🎬 *[a folder walks into a bar. it already has a trailing slash.]*
//! *[the bartender adds another one anyway.]*
//! *["folder//a", says the bucket. "never heard of it."]*
//!
//! This module exists so that never happens. One separator. Exactly one.
//! Whether the caller wrote `"folder"` or `"folder/"`, the key comes out `folder/a`.
//!
//! 🧠 Knowledge graph:
//! - `create_key_stream(folder, keys)` → `Option<KeyStream>`; `None` means "no keys given", not an error
//! - `KeyStream` is lazy: names are joined as they're pulled, not up front
//! - `KeyStream` is both an `Iterator` and a `futures::Stream`, so the pipeline can pull from it
//!   without caring that it never actually has to wait
//! - `file_name_of(key)` is the "strip the folder" helper used when folder paths aren't preserved

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;

/// 🚦 The one true separator. S3 doesn't have folders. S3 has slashes and opinions.
pub const KEY_SEPARATOR: char = '/';

/// 🗝️ A lazily-joined, ordered, consume-once sequence of object keys.
///
/// Produced by [`create_key_stream`]. Implements [`Iterator`] for synchronous callers and
/// [`Stream`] for the fetch pipeline. It never blocks and never errors; it just runs out.
#[derive(Debug, Default)]
pub struct KeyStream {
    folder: Option<String>,
    names: std::vec::IntoIter<String>,
}

impl KeyStream {
    fn new(folder: Option<&str>, names: Vec<String>) -> Self {
        // -- 🧹 empty folder is the same as no folder. Decide once, not per key.
        let folder = folder.filter(|f| !f.is_empty()).map(str::to_owned);
        Self {
            folder,
            names: names.into_iter(),
        }
    }

    /// 🔢 Keys not yet pulled. Handy for sizing a progress bar before the race starts.
    pub fn remaining(&self) -> usize {
        self.names.len()
    }
}

impl Iterator for KeyStream {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let name = self.names.next()?;
        Some(match &self.folder {
            Some(folder) => join_key(folder, &name),
            None => name,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

impl ExactSizeIterator for KeyStream {}

impl Stream for KeyStream {
    type Item = String;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<String>> {
        // -- ⚡ always ready. The keys are already here, we're just gift-wrapping them.
        Poll::Ready(self.get_mut().next())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.names.size_hint()
    }
}

/// 🏗️ Build the key sequence for a folder and a list of key names.
///
/// - `keys == None` → `None`. No keys is a normal Tuesday, not an error.
/// - non-empty `folder` → each key is `folder/name`, with exactly one separator
/// - empty or absent `folder` → each key is `name`, untouched
///
/// Order out == order in. Duplicates survive; each one gets fetched on its own.
pub fn create_key_stream(folder: Option<&str>, keys: Option<Vec<String>>) -> Option<KeyStream> {
    keys.map(|names| KeyStream::new(folder, names))
}

/// 🔗 Join a folder and a name with exactly one separator between them.
///
/// `("folder", "a")`, `("folder/", "a")` and `("folder/", "/a")` all give `folder/a`.
/// A folder made only of slashes is the root: `("/", "a")` gives `/a`.
pub fn join_key(folder: &str, name: &str) -> String {
    let trimmed_folder = folder.trim_end_matches(KEY_SEPARATOR);
    let trimmed_name = name.trim_start_matches(KEY_SEPARATOR);
    if trimmed_folder.is_empty() {
        // -- 🌳 "/" (or "///") is the root. Keep one slash, lose the rest.
        return format!("{KEY_SEPARATOR}{trimmed_name}");
    }
    format!("{trimmed_folder}{KEY_SEPARATOR}{trimmed_name}")
}

/// ✂️ Everything after the last `/` or `\` in a key. No separator? The whole key.
pub fn file_name_of(key: &str) -> &str {
    match key.rfind(['/', '\\']) {
        Some(idx) => &key[idx + 1..],
        None => key,
    }
}
