//! Short-lived reuse of sequence-model forecasts
//!
//! Training is the only expensive step, and its output depends only on the
//! symbol, the history and the hyper-parameters. The cache keys results by
//! `(symbol, history hash, config hash)`, expires them after a TTL and lets at
//! most one caller compute a given key at a time; concurrent callers for the
//! same key wait and reuse the stored result. Failures are never stored.

use crate::data::PriceHistory;
use crate::error::Result;
use crate::models::SequenceModelConfig;
use crate::strategies::PredictionResult;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Identity of a forecast input
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub symbol: String,
    pub history_hash: u64,
    pub config_hash: u64,
}

impl CacheKey {
    /// Key for a sequence-model run of `config` over `history`
    pub fn new(history: &PriceHistory, config: &SequenceModelConfig) -> Self {
        let mut hasher = DefaultHasher::new();
        history.len().hash(&mut hasher);
        for close in history.closes() {
            close.to_bits().hash(&mut hasher);
        }
        let history_hash = hasher.finish();

        let mut hasher = DefaultHasher::new();
        config.window_size.hash(&mut hasher);
        config.hidden_size.hash(&mut hasher);
        config.epochs.hash(&mut hasher);
        config.learning_rate.to_bits().hash(&mut hasher);
        config.gradient_clip.map(f64::to_bits).hash(&mut hasher);
        config.seed.hash(&mut hasher);

        Self {
            symbol: history.symbol().to_string(),
            history_hash,
            config_hash: hasher.finish(),
        }
    }
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    result: PredictionResult,
}

type Slot = Arc<Mutex<Option<Entry>>>;

/// TTL cache with per-key single-flight
#[derive(Debug)]
pub struct ForecastCache {
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl ForecastCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return a fresh stored result for `key` or compute and store one
    pub fn get_or_compute<F>(&self, key: &CacheKey, compute: F) -> Result<PredictionResult>
    where
        F: FnOnce() -> Result<PredictionResult>,
    {
        let slot = {
            let mut slots = lock(&self.slots);
            self.evict_expired(&mut slots);
            slots.entry(key.clone()).or_default().clone()
        };

        let mut entry = lock(slot.as_ref());
        if let Some(cached) = entry.as_ref() {
            if cached.stored_at.elapsed() < self.ttl {
                debug!(symbol = %key.symbol, "forecast cache hit");
                return Ok(cached.result.clone());
            }
        }

        debug!(symbol = %key.symbol, "forecast cache miss");
        let result = compute()?;
        *entry = Some(Entry {
            stored_at: Instant::now(),
            result: result.clone(),
        });
        Ok(result)
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        lock(&self.slots).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn evict_expired(&self, slots: &mut HashMap<CacheKey, Slot>) {
        let ttl = self.ttl;
        // slots held or locked by a caller are always kept
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|e| e.stored_at.elapsed() < ttl),
                Err(_) => true,
            }
        });
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
