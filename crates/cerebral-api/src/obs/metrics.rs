//! Process metrics registry.
//!
//! Instruments are plain atomics behind `Arc` handles; the registry only
//! indexes them by name (`DashMap`) and remembers registration order so that
//! `render` is deterministic. Histogram and summary sums are `f64` seconds
//! stored as bit patterns in an `AtomicU64`.

use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use cerebral_core::error::{CerebralError, Result};

pub const REQUEST_TIME: &str = "request_processing_seconds";
pub const REQUEST_COUNT: &str = "request_count";
pub const REQUEST_LATENCY: &str = "request_latency_seconds";
pub const IN_PROGRESS: &str = "in_progress_requests";
pub const ERROR_COUNT: &str = "error_count";

/// Default latency buckets in seconds (the usual Prometheus client defaults).
pub const DEFAULT_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Helper to escape help text.
fn escape_help(v: &str) -> String {
    v.replace('\\', "\\\\").replace('\n', "\\n")
}

fn fmt_float(v: f64) -> String {
    if v == f64::INFINITY {
        "+Inf".to_string()
    } else if v == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if v.is_nan() {
        "NaN".to_string()
    } else {
        v.to_string()
    }
}

/// Metric names must match `[a-zA-Z_:][a-zA-Z0-9_:]*`.
pub fn validate_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(CerebralError::BadRequest(format!("invalid metric name: {name:?}")))
    }
}

/// Bucket bounds must be non-empty, finite, positive and strictly increasing.
pub fn validate_buckets(bounds: &[f64]) -> Result<()> {
    if bounds.is_empty() {
        return Err(CerebralError::BadRequest("histogram buckets must not be empty".into()));
    }
    if bounds.iter().any(|b| !b.is_finite() || *b <= 0.0) {
        return Err(CerebralError::BadRequest(
            "histogram buckets must be finite and positive".into(),
        ));
    }
    if bounds.windows(2).any(|w| w[0] >= w[1]) {
        return Err(CerebralError::BadRequest(
            "histogram buckets must be strictly increasing".into(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    /// Name used on the `# TYPE` line.
    pub fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

#[derive(Debug, Default)]
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn add(&self, v: f64) {
        let mut cur = self.0.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(cur) + v).to_bits();
            match self
                .0
                .compare_exchange_weak(cur, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return,
                Err(actual) => cur = actual,
            }
        }
    }

    fn get(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Anything that accepts observed durations in seconds.
pub trait Observe: Send + Sync {
    fn observe(&self, seconds: f64);

    fn observe_duration(&self, d: Duration) {
        self.observe(d.as_secs_f64());
    }
}

/// Records the elapsed time into its target when dropped.
#[must_use = "the timer records on drop; binding it to `_` drops it immediately"]
pub struct Timer<'a> {
    target: &'a dyn Observe,
    start: Instant,
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        self.target.observe_duration(self.start.elapsed());
    }
}

#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    /// Increment by 1.
    pub fn inc(&self) {
        self.inc_by(1);
    }

    /// Increment by an arbitrary value.
    pub fn inc_by(&self, v: u64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicI64,
}

impl Gauge {
    /// Increment by 1.
    pub fn inc(&self) { self.add(1); }
    /// Decrement by 1.
    pub fn dec(&self) { self.add(-1); }

    /// Add an arbitrary signed delta.
    pub fn add(&self, v: i64) {
        self.value.fetch_add(v, Ordering::Relaxed);
    }

    pub fn set(&self, v: i64) {
        self.value.store(v, Ordering::Relaxed);
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct Histogram {
    bounds: Vec<f64>,
    buckets: Vec<AtomicU64>,
    count: AtomicU64,
    sum: AtomicF64,
}

impl Histogram {
    pub fn new(bounds: &[f64]) -> Result<Self> {
        validate_buckets(bounds)?;
        Ok(Self {
            bounds: bounds.to_vec(),
            buckets: bounds.iter().map(|_| AtomicU64::new(0)).collect(),
            count: AtomicU64::new(0),
            sum: AtomicF64::default(),
        })
    }

    pub fn start_timer(&self) -> Timer<'_> {
        Timer { target: self, start: Instant::now() }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }

    /// Cumulative `(upper_bound, count)` pairs, without `+Inf`.
    pub fn buckets(&self) -> Vec<(f64, u64)> {
        self.bounds
            .iter()
            .zip(&self.buckets)
            .map(|(b, c)| (*b, c.load(Ordering::Relaxed)))
            .collect()
    }
}

impl Observe for Histogram {
    fn observe(&self, seconds: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.add(seconds);

        // Cumulative: every bucket whose bound covers the value.
        for (i, &b) in self.bounds.iter().enumerate() {
            if seconds <= b {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }
}

/// Count and sum only; no quantiles are computed.
#[derive(Debug, Default)]
pub struct Summary {
    count: AtomicU64,
    sum: AtomicF64,
}

impl Summary {
    pub fn start_timer(&self) -> Timer<'_> {
        Timer { target: self, start: Instant::now() }
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    pub fn sum(&self) -> f64 {
        self.sum.get()
    }
}

impl Observe for Summary {
    fn observe(&self, seconds: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.sum.add(seconds);
    }
}

/// Handle to a registered instrument.
#[derive(Debug, Clone)]
pub enum Instrument {
    Counter(Arc<Counter>),
    Gauge(Arc<Gauge>),
    Histogram(Arc<Histogram>),
    Summary(Arc<Summary>),
}

impl Instrument {
    pub fn kind(&self) -> MetricKind {
        match self {
            Instrument::Counter(_) => MetricKind::Counter,
            Instrument::Gauge(_) => MetricKind::Gauge,
            Instrument::Histogram(_) => MetricKind::Histogram,
            Instrument::Summary(_) => MetricKind::Summary,
        }
    }

    /// Exposed family name. Counters carry `_total` on every line, so the
    /// `# TYPE` line names the same family as the sample.
    fn family(&self, name: &str) -> String {
        match self {
            Instrument::Counter(_) if !name.ends_with("_total") => format!("{name}_total"),
            _ => name.to_string(),
        }
    }

    /// Append `# HELP`, `# TYPE` and sample lines.
    fn render(&self, name: &str, help: &str, out: &mut String) {
        let family = self.family(name);
        let name = family.as_str();
        let _ = writeln!(out, "# HELP {} {}", name, escape_help(help));
        let _ = writeln!(out, "# TYPE {} {}", name, self.kind().as_str());
        match self {
            Instrument::Counter(c) => {
                let _ = writeln!(out, "{} {}", name, c.get());
            }
            Instrument::Gauge(g) => {
                let _ = writeln!(out, "{} {}", name, g.get());
            }
            Instrument::Histogram(h) => {
                for (le, count) in h.buckets() {
                    let _ = writeln!(out, "{}_bucket{{le=\"{}\"}} {}", name, fmt_float(le), count);
                }
                // count is bumped before buckets, so reading it last keeps +Inf >= every bucket.
                let count = h.count();
                let _ = writeln!(out, "{}_bucket{{le=\"+Inf\"}} {}", name, count);
                let _ = writeln!(out, "{}_count {}", name, count);
                let _ = writeln!(out, "{}_sum {}", name, fmt_float(h.sum()));
            }
            Instrument::Summary(s) => {
                let _ = writeln!(out, "{}_count {}", name, s.count());
                let _ = writeln!(out, "{}_sum {}", name, fmt_float(s.sum()));
            }
        }
    }
}

struct Registered {
    seq: u64,
    help: String,
    instrument: Instrument,
}

/// Named instruments, rendered in registration order.
#[derive(Default)]
pub struct Registry {
    metrics: DashMap<String, Registered>,
    next_seq: AtomicU64,
}

fn mismatch(name: &str, actual: MetricKind, op: &'static str) -> CerebralError {
    CerebralError::KindMismatch {
        name: name.to_string(),
        actual: actual.as_str(),
        op,
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new instrument of `kind`. Histograms get [`DEFAULT_BUCKETS`].
    pub fn register(&self, name: &str, help: &str, kind: MetricKind) -> Result<Instrument> {
        let instrument = match kind {
            MetricKind::Counter => Instrument::Counter(Arc::default()),
            MetricKind::Gauge => Instrument::Gauge(Arc::default()),
            MetricKind::Histogram => {
                Instrument::Histogram(Arc::new(Histogram::new(&DEFAULT_BUCKETS)?))
            }
            MetricKind::Summary => Instrument::Summary(Arc::default()),
        };
        self.insert(name, help, instrument)
    }

    pub fn register_counter(&self, name: &str, help: &str) -> Result<Arc<Counter>> {
        let c = Arc::new(Counter::default());
        self.insert(name, help, Instrument::Counter(Arc::clone(&c)))?;
        Ok(c)
    }

    pub fn register_gauge(&self, name: &str, help: &str) -> Result<Arc<Gauge>> {
        let g = Arc::new(Gauge::default());
        self.insert(name, help, Instrument::Gauge(Arc::clone(&g)))?;
        Ok(g)
    }

    pub fn register_histogram(
        &self,
        name: &str,
        help: &str,
        bounds: &[f64],
    ) -> Result<Arc<Histogram>> {
        let h = Arc::new(Histogram::new(bounds)?);
        self.insert(name, help, Instrument::Histogram(Arc::clone(&h)))?;
        Ok(h)
    }

    pub fn register_summary(&self, name: &str, help: &str) -> Result<Arc<Summary>> {
        let s = Arc::new(Summary::default());
        self.insert(name, help, Instrument::Summary(Arc::clone(&s)))?;
        Ok(s)
    }

    fn insert(&self, name: &str, help: &str, instrument: Instrument) -> Result<Instrument> {
        validate_name(name)?;
        match self.metrics.entry(name.to_string()) {
            Entry::Occupied(_) => Err(CerebralError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(slot) => {
                let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
                slot.insert(Registered {
                    seq,
                    help: help.to_string(),
                    instrument: instrument.clone(),
                });
                Ok(instrument)
            }
        }
    }

    /// Look up a registered instrument by name.
    pub fn get(&self, name: &str) -> Result<Instrument> {
        self.metrics
            .get(name)
            .map(|r| r.instrument.clone())
            .ok_or_else(|| CerebralError::UnknownMetric(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Increment a counter or gauge by 1.
    pub fn inc(&self, name: &str) -> Result<()> {
        self.inc_by(name, 1)
    }

    /// Increment a counter or gauge by `v`.
    pub fn inc_by(&self, name: &str, v: u64) -> Result<()> {
        match self.get(name)? {
            Instrument::Counter(c) => c.inc_by(v),
            Instrument::Gauge(g) => {
                let delta = i64::try_from(v).map_err(|_| {
                    CerebralError::BadRequest(format!("gauge delta out of range: {v}"))
                })?;
                g.add(delta)
            }
            other => return Err(mismatch(name, other.kind(), "inc")),
        }
        Ok(())
    }

    /// Decrement a gauge by 1. Counters never go down.
    pub fn dec(&self, name: &str) -> Result<()> {
        match self.get(name)? {
            Instrument::Gauge(g) => g.dec(),
            other => return Err(mismatch(name, other.kind(), "dec")),
        }
        Ok(())
    }

    pub fn set(&self, name: &str, v: i64) -> Result<()> {
        match self.get(name)? {
            Instrument::Gauge(g) => g.set(v),
            other => return Err(mismatch(name, other.kind(), "set")),
        }
        Ok(())
    }

    /// Record a value (seconds) into a histogram or summary.
    pub fn observe(&self, name: &str, v: f64) -> Result<()> {
        match self.get(name)? {
            Instrument::Histogram(h) => h.observe(v),
            Instrument::Summary(s) => s.observe(v),
            other => return Err(mismatch(name, other.kind(), "observe")),
        }
        Ok(())
    }

    /// Render every instrument in Prometheus text exposition format.
    pub fn render(&self) -> String {
        // Snapshot handles first so no shard lock is held while formatting.
        let mut entries: Vec<(u64, String, String, Instrument)> = self
            .metrics
            .iter()
            .map(|r| (r.seq, r.key().clone(), r.help.clone(), r.instrument.clone()))
            .collect();
        entries.sort_by_key(|e| e.0);

        let mut out = String::new();
        for (_, name, help, instrument) in &entries {
            instrument.render(name, help, &mut out);
        }
        out
    }
}

/// The instruments the API records into.
#[derive(Debug, Clone)]
pub struct ApiMetrics {
    pub request_time: Arc<Summary>,
    pub request_count: Arc<Counter>,
    pub request_latency: Arc<Histogram>,
    pub in_progress: Arc<Gauge>,
    pub error_count: Arc<Counter>,
}

impl ApiMetrics {
    pub fn register(registry: &Registry, latency_buckets: &[f64]) -> Result<Self> {
        Ok(Self {
            request_time: registry.register_summary(REQUEST_TIME, "Time spent processing request")?,
            request_count: registry.register_counter(REQUEST_COUNT, "Total number of requests")?,
            request_latency: registry.register_histogram(
                REQUEST_LATENCY,
                "Request latency",
                latency_buckets,
            )?,
            in_progress: registry.register_gauge(IN_PROGRESS, "Number of in-progress requests")?,
            error_count: registry.register_counter(ERROR_COUNT, "Total number of errors")?,
        })
    }
}
