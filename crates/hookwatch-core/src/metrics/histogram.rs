use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::Desc;
use crate::error::{HookwatchError, Result};

/// Default upper bounds, in seconds.
pub const DEFAULT_BUCKETS: &[f64] = &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

struct AtomicHistogram {
    count: AtomicU64,
    // f64 bits; updated with compare-and-swap.
    sum: AtomicU64,
    buckets: Box<[AtomicU64]>,
}

impl AtomicHistogram {
    fn new(buckets: usize) -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0.0f64.to_bits()),
            buckets: (0..buckets).map(|_| AtomicU64::new(0)).collect(),
        }
    }

    fn observe(&self, bounds: &[f64], v: f64) {
        self.count.fetch_add(1, Ordering::Relaxed);
        let _ = self
            .sum
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + v).to_bits())
            });

        // Cumulative buckets: increment every bucket whose bound covers the value.
        for (i, &le) in bounds.iter().enumerate() {
            if v <= le {
                self.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn snapshot(&self, bounds: &[f64]) -> HistogramSnapshot {
        HistogramSnapshot {
            count: self.count.load(Ordering::Relaxed),
            sum: f64::from_bits(self.sum.load(Ordering::Relaxed)),
            buckets: bounds
                .iter()
                .zip(self.buckets.iter())
                .map(|(&le, c)| (le, c.load(Ordering::Relaxed)))
                .collect(),
        }
    }
}

/// View of one histogram instance.
///
/// Count, sum and buckets are loaded one after another, not as a unit: taken
/// while observations are in flight, `count` may already include a value
/// that `sum` or the buckets do not yet reflect. Once writers are quiescent
/// the three agree.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    pub count: u64,
    pub sum: f64,
    /// `(upper bound, cumulative count)` pairs, `+Inf` excluded.
    pub buckets: Vec<(f64, u64)>,
}

/// Histogram family: one bucketed distribution per label tuple.
pub struct HistogramVec {
    desc: Desc,
    bounds: Vec<f64>,
    map: DashMap<Vec<String>, AtomicHistogram>,
}

impl HistogramVec {
    pub(crate) fn new(desc: Desc, buckets: &[f64]) -> Result<Self> {
        if buckets.iter().any(|b| !b.is_finite()) {
            return Err(HookwatchError::InvalidSchema(format!(
                "non-finite bucket bound on {}",
                desc.name
            )));
        }
        if buckets.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HookwatchError::InvalidSchema(format!(
                "buckets of {} must be strictly increasing",
                desc.name
            )));
        }
        Ok(Self {
            desc,
            bounds: buckets.to_vec(),
            map: DashMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.labels
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Observe one value (seconds for every family this crate registers).
    pub(crate) fn observe(&self, values: &[&str], v: f64) -> Result<()> {
        let key = self.desc.key(values)?;
        if let Some(hist) = self.map.get(&key) {
            hist.observe(&self.bounds, v);
            return Ok(());
        }
        let n = self.bounds.len();
        let hist = self.map.entry(key).or_insert_with(|| AtomicHistogram::new(n));
        hist.observe(&self.bounds, v);
        Ok(())
    }

    /// Snapshot for a label tuple; an empty snapshot when the tuple was never observed.
    pub fn snapshot(&self, values: &[&str]) -> Result<HistogramSnapshot> {
        let key = self.desc.key(values)?;
        Ok(match self.map.get(&key) {
            Some(hist) => hist.snapshot(&self.bounds),
            None => AtomicHistogram::new(self.bounds.len()).snapshot(&self.bounds),
        })
    }

    pub(crate) fn render(&self, out: &mut String) {
        self.desc.render_header("histogram", out);

        let mut samples: Vec<(Vec<String>, HistogramSnapshot)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().snapshot(&self.bounds)))
            .collect();
        samples.sort_by(|a, b| a.0.cmp(&b.0));

        let name = &self.desc.name;
        for (key, snap) in samples {
            let labels = self.desc.label_pairs(&key);
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{labels},")
            };

            for (le, count) in &snap.buckets {
                let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"{le}\"}} {count}");
            }
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {}", snap.count);

            if labels.is_empty() {
                let _ = writeln!(out, "{name}_sum {}", snap.sum);
                let _ = writeln!(out, "{name}_count {}", snap.count);
            } else {
                let _ = writeln!(out, "{name}_sum{{{labels}}} {}", snap.sum);
                let _ = writeln!(out, "{name}_count{{{labels}}} {}", snap.count);
            }
        }
    }
}
