//! Redis substrate over a multiplexed, auto-reconnecting connection.

use super::client::{KvBatch, KvClient, KvError, KvInfo, KvOp};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;

/// Keys requested per `SCAN` round trip.
const SCAN_COUNT: u32 = 500;

pub struct RedisKv {
    manager: ConnectionManager,
    open: AtomicBool,
}

impl std::fmt::Debug for RedisKv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisKv")
            .field("open", &self.open.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

impl RedisKv {
    /// Connect to the server at `url` (`redis://`, `rediss://` or `unix://`).
    pub async fn connect(url: &str) -> Result<Self, KvError> {
        let client = redis::Client::open(url).map_err(|e| KvError::Connection(e.to_string()))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| KvError::Connection(e.to_string()))?;
        debug!("Opened Redis connection manager");
        Ok(Self {
            manager,
            open: AtomicBool::new(true),
        })
    }

    /// A handle onto the shared connection; cloning is cheap.
    fn conn(&self) -> Result<ConnectionManager, KvError> {
        if self.open.load(Ordering::SeqCst) {
            Ok(self.manager.clone())
        } else {
            Err(KvError::Closed)
        }
    }
}

fn kv_error(err: RedisError) -> KvError {
    if err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_io_error()
        || err.is_timeout()
    {
        KvError::Connection(err.to_string())
    } else {
        KvError::Command(err.to_string())
    }
}

/// Redis rejects a zero expiry, so sub-millisecond TTLs round up.
fn ttl_millis(ttl: Duration) -> u64 {
    u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1)
}

/// `PTTL` replies -2 for missing keys and -1 for keys without expiry.
fn ttl_from_reply(millis: i64) -> Option<Duration> {
    u64::try_from(millis).ok().map(Duration::from_millis)
}

/// `SCAN MATCH` pattern selecting exactly the keys that start with `prefix`.
fn prefix_pattern(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len().saturating_add(1));
    for c in prefix.chars() {
        if matches!(c, '*' | '?' | '[' | ']' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('*');
    pattern
}

/// Pull `used_memory` and `maxmemory` out of an `INFO memory` reply.
/// A `maxmemory` of 0 means the server has no ceiling.
fn parse_memory_info(raw: &str) -> (u64, Option<u64>) {
    let mut used = 0;
    let mut max = None;
    for line in raw.lines() {
        let Some((field, value)) = line.trim().split_once(':') else {
            continue;
        };
        match field {
            "used_memory" => used = value.parse().unwrap_or(0),
            "maxmemory" => max = value.parse().ok().filter(|&m: &u64| m > 0),
            _ => {}
        }
    }
    (used, max)
}

fn batch_pipeline(batch: KvBatch) -> redis::Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic();
    for op in batch.into_ops() {
        match op {
            KvOp::Set { key, value, ttl } => {
                let cmd = pipe.cmd("SET").arg(key).arg(value);
                if let Some(ttl) = ttl {
                    cmd.arg("PX").arg(ttl_millis(ttl));
                }
                cmd.ignore();
            }
            KvOp::Expire { key, ttl } => {
                pipe.cmd("PEXPIRE").arg(key).arg(ttl_millis(ttl)).ignore();
            }
            KvOp::Delete { key } => {
                pipe.cmd("DEL").arg(key).ignore();
            }
        }
    }
    pipe
}

#[async_trait]
impl KvClient for RedisKv {
    async fn ping(&self) -> Result<(), KvError> {
        let mut conn = self.conn()?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let mut conn = self.conn()?;
        redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(kv_error)
    }

    async fn get_many(&self, keys: &[String]) -> Result<Vec<Option<String>>, KvError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.conn()?;
        redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut conn)
            .await
            .map_err(kv_error)
    }

    async fn exists(&self, key: &str) -> Result<bool, KvError> {
        let mut conn = self.conn()?;
        let count: u64 = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        Ok(count > 0)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, KvError> {
        let mut conn = self.conn()?;
        let millis: i64 = redis::cmd("PTTL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        Ok(ttl_from_reply(millis))
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<String>, KvError> {
        let mut conn = self.conn()?;
        let pattern = prefix_pattern(prefix);
        let mut cursor: u64 = 0;
        let mut keys = Vec::new();
        loop {
            let (next, page): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_COUNT)
                .query_async(&mut conn)
                .await
                .map_err(kv_error)?;
            keys.extend(page);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        // SCAN may return a key more than once.
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    async fn exec(&self, batch: KvBatch) -> Result<(), KvError> {
        let mut conn = self.conn()?;
        if batch.is_empty() {
            return Ok(());
        }
        let () = batch_pipeline(batch)
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        Ok(())
    }

    async fn info(&self) -> Result<KvInfo, KvError> {
        let mut conn = self.conn()?;
        let raw: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        let key_count: u64 = redis::cmd("DBSIZE")
            .query_async(&mut conn)
            .await
            .map_err(kv_error)?;
        let (used_memory_bytes, max_memory_bytes) = parse_memory_info(&raw);
        Ok(KvInfo {
            used_memory_bytes,
            max_memory_bytes,
            key_count,
        })
    }

    async fn close(&self) -> Result<(), KvError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}
