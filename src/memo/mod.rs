pub mod store;

pub use store::{FileStore, KvStore, MemoryStore};

use std::collections::BTreeMap;
use std::iter::FromIterator;
use std::sync::Arc;

use crate::calendar::DateKey;
use crate::error::Result;

pub const MEMO_STORAGE_KEY: &str = "memos";

/// Copy-on-write mapping from day to memo text.
///
/// `set` and `delete` never touch `self`; they hand out a new snapshot and
/// only copy the underlying map while an older snapshot is still alive.
/// Values are never empty: an absent key is the only way to say "no memo".
#[derive(Debug, Clone, Default)]
pub struct MemoMap(Arc<BTreeMap<DateKey, String>>);

impl MemoMap {
    pub fn new() -> Self {
        MemoMap::default()
    }

    pub fn get(&self, date: &DateKey) -> Option<&str> {
        self.0.get(date).map(String::as_str)
    }

    pub fn contains(&self, date: &DateKey) -> bool {
        self.0.contains_key(date)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&DateKey, &str)> {
        self.0.iter().map(|(date, text)| (date, text.as_str()))
    }

    /// Empty `text` leaves the map untouched; use `delete` to drop a memo.
    pub fn set(&self, date: DateKey, text: &str) -> MemoMap {
        if text.is_empty() {
            return self.clone();
        }

        let mut next = self.clone();
        Arc::make_mut(&mut next.0).insert(date, text.to_owned());
        next
    }

    pub fn delete(&self, date: &DateKey) -> MemoMap {
        if !self.contains(date) {
            return self.clone();
        }

        let mut next = self.clone();
        Arc::make_mut(&mut next.0).remove(date);
        next
    }

    /// True if both handles point at the very same snapshot.
    pub fn is_same_snapshot(&self, other: &MemoMap) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for MemoMap {
    fn eq(&self, other: &Self) -> bool {
        self.is_same_snapshot(other) || self.0 == other.0
    }
}

impl Eq for MemoMap {}

impl<'a> FromIterator<(DateKey, &'a str)> for MemoMap {
    fn from_iter<I: IntoIterator<Item = (DateKey, &'a str)>>(iter: I) -> Self {
        MemoMap(Arc::new(
            iter.into_iter()
                .filter(|(_, text)| !text.is_empty())
                .map(|(date, text)| (date, text.to_owned()))
                .collect(),
        ))
    }
}

pub struct MemoStore {
    backend: Box<dyn KvStore>,
}

impl MemoStore {
    pub fn new(backend: Box<dyn KvStore>) -> Self {
        MemoStore { backend }
    }

    /// Reads the persisted memos. Never fails: missing or unreadable data
    /// yields an empty map, malformed entries are skipped.
    pub fn load(&self) -> MemoMap {
        let payload = match self.backend.read(MEMO_STORAGE_KEY) {
            Ok(Some(payload)) => payload,
            Ok(None) => return MemoMap::new(),
            Err(err) => {
                log::warn!("Could not read memos, starting empty: {}", err);
                return MemoMap::new();
            }
        };

        let table = match payload.parse::<toml::Value>() {
            Ok(toml::Value::Table(table)) => table,
            Ok(_) => {
                log::warn!("Stored memos are not a table, starting empty");
                return MemoMap::new();
            }
            Err(err) => {
                log::warn!("Could not parse stored memos, starting empty: {}", err);
                return MemoMap::new();
            }
        };

        let entries: Vec<(DateKey, &str)> = table
            .iter()
            .filter_map(|(key, value)| {
                let date = match key.parse::<DateKey>() {
                    Ok(date) => date,
                    Err(err) => {
                        log::warn!("Skipping stored memo: {}", err);
                        return None;
                    }
                };

                match value.as_str() {
                    Some(text) if !text.is_empty() => Some((date, text)),
                    _ => {
                        log::warn!("Skipping stored memo for {}: not a non-empty string", date);
                        None
                    }
                }
            })
            .collect();

        let memos: MemoMap = entries.into_iter().collect();
        log::info!("Loaded {} memo(s)", memos.len());
        memos
    }

    /// Overwrites the persisted memos with the full content of `map`.
    pub fn save(&mut self, map: &MemoMap) -> Result<()> {
        let table: BTreeMap<String, &str> = map
            .iter()
            .map(|(date, text)| (date.to_string(), text))
            .collect();

        let payload = toml::to_string(&table)?;
        self.backend.write(MEMO_STORAGE_KEY, &payload)?;

        log::info!("Saved {} memo(s)", map.len());
        Ok(())
    }
}
