//! Log sampling for high-volume scenarios
//!
//! [`SamplerCore`] caps the CPU and I/O cost of repetitive records while keeping
//! a representative sample. Within each tick (one second when assembled from a
//! config) and for each call site, the first `initial` records pass. After that
//! only every `thereafter`-th record passes, starting with the first one past the
//! burst. A call site is the record's level, message and caller location.
//!
//! Counting is lock-free: call sites hash into a fixed table of atomic counters,
//! so unrelated call sites may occasionally share a counter.
//!
//! # Example
//!
//! ```
//! use rust_logger_config::core::{Core, ObservedCore, SamplerCore};
//! use rust_logger_config::LogLevel;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let (observed, logs) = ObservedCore::new(LogLevel::Debug);
//! let sampler = SamplerCore::new(Arc::new(observed), Duration::from_secs(1), 100, 10);
//! assert!(sampler.enabled(LogLevel::Info));
//! assert!(logs.is_empty());
//! ```

use super::cores::{CheckedCores, Core};
use super::entry::Entry;
use super::error::Result;
use super::field::Field;
use super::log_level::LogLevel;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

const COUNTERS_PER_LEVEL: usize = 4096;

/// Outcome of one sampling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SamplingDecision {
    Sampled,
    Dropped,
}

/// Called for every sampling decision
pub type SamplingHook = Arc<dyn Fn(&Entry, SamplingDecision) + Send + Sync>;

/// Metrics for sampling observability
///
/// Tracks how many logs were sampled vs dropped, allowing monitoring
/// of sampling effectiveness.
///
/// # Example
///
/// ```
/// use rust_logger_config::core::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.sampled_count(), 0);
/// assert_eq!(metrics.dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    /// Number of logs that passed sampling (were logged)
    sampled_count: AtomicU64,

    /// Number of logs dropped by sampling
    dropped_count: AtomicU64,
}

impl SamplerMetrics {
    /// Create new metrics with all counters at zero
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
        }
    }

    /// Get the number of sampled (logged) entries
    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    /// Get the number of dropped entries
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Get the total number of entries processed
    #[inline]
    pub fn total_count(&self) -> u64 {
        self.sampled_count() + self.dropped_count()
    }

    #[inline]
    pub(crate) fn record(&self, decision: SamplingDecision) {
        match decision {
            SamplingDecision::Sampled => self.sampled_count.fetch_add(1, Ordering::Relaxed),
            SamplingDecision::Dropped => self.dropped_count.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Get the effective sample rate based on actual sampling
    ///
    /// Returns 1.0 if no logs have been processed yet.
    pub fn effective_sample_rate(&self) -> f64 {
        let total = self.total_count();
        if total == 0 {
            1.0
        } else {
            self.sampled_count() as f64 / total as f64
        }
    }

    /// Reset all counters to zero
    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

struct Counter {
    reset_at: AtomicI64,
    count: AtomicU64,
}

impl Counter {
    fn new() -> Self {
        Self {
            reset_at: AtomicI64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Count one record at `now`, starting a fresh window once the old one expired
    fn inc_check_reset(&self, now: i64, tick: i64) -> u64 {
        let reset_after = self.reset_at.load(Ordering::Acquire);
        if reset_after > now {
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }

        self.count.store(1, Ordering::Relaxed);
        let new_reset_after = now.saturating_add(tick);
        if self
            .reset_at
            .compare_exchange(reset_after, new_reset_after, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            // Another thread reset the window first; count against it
            return self.count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        1
    }
}

struct Counters {
    slots: Box<[Counter]>,
}

impl Counters {
    fn new() -> Self {
        let slots = (0..LogLevel::ALL.len() * COUNTERS_PER_LEVEL)
            .map(|_| Counter::new())
            .collect();
        Self { slots }
    }

    fn get(&self, entry: &Entry) -> &Counter {
        let mut hasher = DefaultHasher::new();
        entry.message.hash(&mut hasher);
        if let Some(caller) = &entry.caller {
            caller.file.hash(&mut hasher);
            caller.line.hash(&mut hasher);
        }
        let key = (hasher.finish() % COUNTERS_PER_LEVEL as u64) as usize;
        &self.slots[entry.level as usize * COUNTERS_PER_LEVEL + key]
    }
}

/// Core wrapper that drops repetitive records
pub struct SamplerCore {
    inner: Arc<dyn Core>,
    counters: Arc<Counters>,
    tick: Duration,
    first: u64,
    thereafter: u64,
    hook: Option<SamplingHook>,
    metrics: Arc<SamplerMetrics>,
}

impl SamplerCore {
    /// `thereafter == 0` drops everything after the first `first` records per tick
    pub fn new(inner: Arc<dyn Core>, tick: Duration, first: u64, thereafter: u64) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::new()),
            tick,
            first,
            thereafter,
            hook: None,
            metrics: Arc::new(SamplerMetrics::new()),
        }
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_hook(mut self, hook: SamplingHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Counters shared by this sampler and every core derived through `with`
    pub fn metrics(&self) -> Arc<SamplerMetrics> {
        Arc::clone(&self.metrics)
    }

    fn decide(&self, entry: &Entry) -> SamplingDecision {
        let now = entry.time.timestamp_nanos_opt().unwrap_or(i64::MAX);
        let tick = i64::try_from(self.tick.as_nanos()).unwrap_or(i64::MAX);
        let n = self.counters.get(entry).inc_check_reset(now, tick);

        if n <= self.first {
            return SamplingDecision::Sampled;
        }
        let k = n - self.first;
        if self.thereafter != 0 && (k - 1) % self.thereafter == 0 {
            SamplingDecision::Sampled
        } else {
            SamplingDecision::Dropped
        }
    }
}

impl Core for SamplerCore {
    fn enabled(&self, level: LogLevel) -> bool {
        self.inner.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Arc<dyn Core> {
        Arc::new(Self {
            inner: self.inner.with(fields),
            counters: Arc::clone(&self.counters),
            tick: self.tick,
            first: self.first,
            thereafter: self.thereafter,
            hook: self.hook.clone(),
            metrics: Arc::clone(&self.metrics),
        })
    }

    fn check(self: Arc<Self>, entry: &Entry, checked: &mut CheckedCores) {
        if !self.enabled(entry.level) {
            return;
        }

        let decision = self.decide(entry);
        self.metrics.record(decision);
        if let Some(hook) = &self.hook {
            hook(entry, decision);
        }
        if decision == SamplingDecision::Sampled {
            Arc::clone(&self.inner).check(entry, checked);
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<()> {
        self.inner.write(entry, fields)
    }

    fn sync(&self) -> Result<()> {
        self.inner.sync()
    }
}

impl fmt::Debug for SamplerCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplerCore")
            .field("tick", &self.tick)
            .field("first", &self.first)
            .field("thereafter", &self.thereafter)
            .field("metrics", &self.metrics)
            .finish()
    }
}
