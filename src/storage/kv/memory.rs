//! In-process key-value substrate with lazy per-key expiry.

use super::client::{KvBatch, KvClient, KvError, KvInfo, KvOp};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

/// Stored entries plus their running size, so batches are checked against
/// the memory ceiling without walking the whole map.
#[derive(Debug)]
struct Shelf {
    entries: BTreeMap<String, Entry>,
    /// Size of every stored entry, including expired ones not yet purged.
    stored_bytes: u64,
    next_sweep: Instant,
}

impl Shelf {
    fn new(now: Instant) -> Self {
        Self {
            entries: BTreeMap::new(),
            stored_bytes: 0,
            next_sweep: now,
        }
    }

    fn insert(&mut self, key: String, entry: Entry) {
        let key_len = key.len();
        let added = entry_size(&key, &entry.value);
        if let Some(old) = self.entries.insert(key, entry) {
            let freed = key_len.saturating_add(old.value.len()) as u64;
            self.stored_bytes = self.stored_bytes.saturating_sub(freed);
        }
        self.stored_bytes = self.stored_bytes.saturating_add(added);
    }

    fn remove(&mut self, key: &str) {
        if let Some(old) = self.entries.remove(key) {
            self.stored_bytes = self
                .stored_bytes
                .saturating_sub(entry_size(key, &old.value));
        }
    }

    fn purge_expired(&mut self, now: Instant) {
        let mut freed = 0u64;
        self.entries.retain(|key, entry| {
            let keep = entry.is_live(now);
            if !keep {
                freed = freed.saturating_add(entry_size(key, &entry.value));
            }
            keep
        });
        self.stored_bytes = self.stored_bytes.saturating_sub(freed);
        self.next_sweep = now.checked_add(SWEEP_INTERVAL).unwrap_or(now);
    }

    /// `stored_bytes` after applying `ops`, computed from the keys they touch.
    fn projected(&self, ops: &[KvOp]) -> u64 {
        let mut touched: HashMap<&str, u64> = HashMap::new();
        for op in ops {
            match op {
                KvOp::Set { key, value, .. } => {
                    touched.insert(key, entry_size(key, value));
                }
                KvOp::Delete { key } => {
                    touched.insert(key, 0);
                }
                KvOp::Expire { .. } => {}
            }
        }
        touched.into_iter().fold(self.stored_bytes, |acc, (key, size)| {
            let current = self
                .entries
                .get(key)
                .map_or(0, |e| entry_size(key, &e.value));
            acc.saturating_sub(current).saturating_add(size)
        })
    }

    fn apply(&mut self, op: KvOp, now: Instant) {
        match op {
            KvOp::Set { key, value, ttl } => {
                let expires_at = ttl.and_then(|ttl| deadline(now, ttl));
                self.insert(key, Entry { value, expires_at });
            }
            KvOp::Expire { key, ttl } => {
                if let Some(entry) = self.entries.get_mut(&key).filter(|e| e.is_live(now)) {
                    entry.expires_at = deadline(now, ttl);
                }
            }
            KvOp::Delete { key } => self.remove(&key),
        }
    }
}

/// How often a batch also sweeps out expired entries.
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Expiry runs on the tokio clock, so paused-time tests can advance it.
#[derive(Debug)]
pub struct MemoryKv {
    shelf: RwLock<Shelf>,
    max_memory_bytes: Option<u64>,
    open: AtomicBool,
}

impl Default for MemoryKv {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_memory(None)
    }

    /// Writes that would push usage past `max_memory_bytes` are rejected.
    #[must_use]
    pub fn with_max_memory(max_memory_bytes: Option<u64>) -> Self {
        Self {
            shelf: RwLock::new(Shelf::new(Instant::now())),
            max_memory_bytes,
            open: AtomicBool::new(true),
        }
    }

    fn ensure_open(&self) -> Result<(), KvError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(KvError::Closed)
        }
    }
}

fn entry_size(key: &str, value: &str) -> u64 {
    key.len().saturating_add(value.len()) as u64
}

/// `None` when the deadline is beyond the clock's range; such keys never
/// expire.
fn deadline(now: Instant, ttl: Duration) -> Option<Instant> {
    now.checked_add(ttl)
}

fn used_memory(entries: &BTreeMap<String, Entry>, now: Instant) -> u64 {
    entries
        .iter()
        .filter(|(_, e)| e.is_live(now))
        .fold(0u64, |acc, (k, e)| acc.saturating_add(entry_size(k, &e.value)))
}

fn live<'a>(entries: &'a BTreeMap<String, Entry>, key: &str, now: Instant) -> Option<&'a Entry> {
    entries.get(key).filter(|e| e.is_live(now))
}

#[async_trait]
impl KvClient for MemoryKv {
    async fn ping(&self) -> Result<(), KvError> {
        self.ensure_open()
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        Ok(live(entries, key, Instant::now()).map(|e| e.value.clone()))
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        let now = Instant::now();
        Ok(keys
            .iter()
            .map(|k| live(entries, k, now).map(|e| e.value.clone()))
            .collect())
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        Ok(live(entries, key, Instant::now()).is_some())
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        let now = Instant::now();
        Ok(live(entries, key, now)
            .and_then(|e| e.expires_at)
            .map(|at| at.saturating_duration_since(now)))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        let now = Instant::now();
        Ok(entries
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .filter(|(_, e)| e.is_live(now))
            .map(|(k, _)| k.clone())
            .collect())
    }

    async fn exec(&self, batch: KvBatch) -> Result<(), KvError> {
        self.ensure_open()?;
        let ops = batch.into_ops();
        let mut shelf = self.shelf.write().await;
        let now = Instant::now();
        if shelf.next_sweep <= now {
            shelf.purge_expired(now);
        }

        if let Some(max) = self.max_memory_bytes {
            let mut projected = shelf.projected(&ops);
            if projected > max {
                shelf.purge_expired(now);
                projected = shelf.projected(&ops);
            }
            if projected > max {
                return Err(KvError::Command(format!(
                    "OOM command not allowed when used memory > 'maxmemory' ({projected} > {max})"
                )));
            }
        }

        for op in ops {
            shelf.apply(op, now);
        }
        Ok(())
    }

    async fn info(&self) -> Result<KvInfo, KvError> {
        self.ensure_open()?;
        let shelf = self.shelf.read().await;
        let entries = &shelf.entries;
        let now = Instant::now();
        let key_count = entries.values().filter(|e| e.is_live(now)).count() as u64;
        Ok(KvInfo {
            used_memory_bytes: used_memory(entries, now),
            max_memory_bytes: self.max_memory_bytes,
            key_count,
        })
    }

    async fn close(&self) -> Result<(), KvError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
