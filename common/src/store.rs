//! # Persistent deduplication sets
//!
//! A [`DedupSet`] remembers every item it has ever accepted, both for the
//! lifetime of the process (an in-memory hash set) and across restarts (an
//! append-only, newline-delimited log read back in full at load time).
//!
//! Membership decisions and durable writes are separate steps:
//! [`DedupSet::try_insert`] decides synchronously whether an item is new, and
//! the caller later hands the batch of new items to
//! [`DedupSet::append_durable`]. Only items that were reported new should be
//! appended; that keeps the log free of duplicates.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::error::StoreError;

pub struct DedupSet<T> {
    seen: Mutex<HashSet<T>>,
    log: Option<DurableLog>,
}

struct DurableLog {
    path: PathBuf,
    // Serializes appends; opened lazily on the first write.
    file: tokio::sync::Mutex<Option<File>>,
}

impl<T> DedupSet<T>
where
    T: Eq + Hash + Clone + Display,
{
    /// A set without a backing file.
    pub fn in_memory() -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            log: None,
        }
    }

    /// A non-durable set seeded with `items`.
    pub fn from_items(items: impl IntoIterator<Item = T>) -> Self {
        Self {
            seen: Mutex::new(items.into_iter().collect()),
            log: None,
        }
    }

    /// Reads every non-empty line of `path` into a new set that appends to
    /// the same file. A missing file is an empty set.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError>
    where
        T: FromStr,
    {
        let path: PathBuf = path.into();
        let contents = match fs::read(&path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(StoreError::Read { path, source }),
        };

        let mut seen = HashSet::new();
        for (index, raw) in contents.split(|b| *b == b'\n').enumerate() {
            // A torn write can leave a partial multi-byte character behind.
            let Ok(line) = std::str::from_utf8(raw) else {
                tracing::warn!(path = %path.display(), line = index + 1, "skipping record that is not UTF-8");
                continue;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match line.parse::<T>() {
                Ok(item) => {
                    seen.insert(item);
                }
                Err(_) => {
                    tracing::warn!(path = %path.display(), record = line, "skipping unreadable record");
                }
            }
        }

        Ok(Self {
            seen: Mutex::new(seen),
            log: Some(DurableLog {
                path,
                file: tokio::sync::Mutex::new(None),
            }),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.log.as_ref().map(|log| log.path.as_path())
    }

    pub fn contains(&self, item: &T) -> bool {
        self.lock().contains(item)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Inserts `item` if absent. Concurrent callers racing on the same item
    /// see exactly one `true`.
    pub fn try_insert(&self, item: T) -> bool {
        self.lock().insert(item)
    }

    /// Inserts a batch under one lock and returns the items that were new,
    /// in input order.
    pub fn insert_new(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        let mut seen = self.lock();
        items
            .into_iter()
            .filter(|item| seen.insert(item.clone()))
            .collect()
    }

    /// Appends one line per item and syncs the file before returning.
    ///
    /// Items whose text spans several lines are skipped, since they would
    /// not read back as themselves. Does nothing for an empty batch or a set
    /// without a backing file.
    pub async fn append_durable(&self, items: &[T]) -> Result<(), StoreError> {
        let Some(log) = &self.log else {
            return Ok(());
        };
        if items.is_empty() {
            return Ok(());
        }

        let mut record = String::new();
        for item in items {
            let text = item.to_string();
            if text.contains(['\n', '\r']) {
                tracing::warn!(path = %log.path.display(), record = %text.escape_debug(), "refusing multi-line record");
                continue;
            }
            record.push_str(&text);
            record.push('\n');
        }
        if record.is_empty() {
            return Ok(());
        }

        let mut file = log.file.lock().await;
        let result = write_record(&log.path, &mut file, record.as_bytes()).await;
        if result.is_err() {
            // Reopen on the next append instead of reusing a broken handle.
            *file = None;
        }
        result.map_err(|source| StoreError::Append {
            path: log.path.clone(),
            source,
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<T>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

async fn write_record(path: &Path, slot: &mut Option<File>, bytes: &[u8]) -> std::io::Result<()> {
    if slot.is_none() {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path).await?;
        *slot = Some(file);
    }

    let Some(file) = slot.as_mut() else {
        return Err(std::io::Error::other("log file unavailable"));
    };
    file.write_all(bytes).await?;
    file.flush().await?;
    file.sync_data().await
}
