use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

use super::{Desc, Format};
use crate::error::Result;

/// Counter family: one monotonically increasing `u64` per label tuple.
pub struct CounterVec {
    desc: Desc,
    map: DashMap<Vec<String>, AtomicU64>,
}

impl CounterVec {
    pub(crate) fn new(desc: Desc) -> Self {
        Self {
            desc,
            map: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.desc.name
    }

    pub fn label_names(&self) -> &[String] {
        &self.desc.labels
    }

    /// Increment by 1.
    pub(crate) fn inc(&self, values: &[&str]) -> Result<()> {
        self.add(values, 1)
    }

    /// Increment by an arbitrary value.
    pub(crate) fn add(&self, values: &[&str], v: u64) -> Result<()> {
        let key = self.desc.key(values)?;
        if let Some(counter) = self.map.get(&key) {
            counter.fetch_add(v, Ordering::Relaxed);
            return Ok(());
        }
        // entry() takes the shard write lock: creation happens at most once per tuple.
        let counter = self.map.entry(key).or_insert_with(|| AtomicU64::new(0));
        counter.fetch_add(v, Ordering::Relaxed);
        Ok(())
    }

    /// Current value for a label tuple; 0 when the tuple was never observed.
    pub fn value(&self, values: &[&str]) -> Result<u64> {
        let key = self.desc.key(values)?;
        Ok(self
            .map
            .get(&key)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0))
    }

    pub(crate) fn render(&self, format: Format, out: &mut String) {
        self.desc.render_header("counter", out);
        let suffix = match format {
            Format::Text => "",
            Format::OpenMetrics => "_total",
        };

        let mut samples: Vec<(Vec<String>, u64)> = self
            .map
            .iter()
            .map(|r| (r.key().clone(), r.value().load(Ordering::Relaxed)))
            .collect();
        samples.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, val) in samples {
            let labels = self.desc.label_pairs(&key);
            if labels.is_empty() {
                let _ = writeln!(out, "{}{} {}", self.desc.name, suffix, val);
            } else {
                let _ = writeln!(out, "{}{}{{{}}} {}", self.desc.name, suffix, labels, val);
            }
        }
    }
}
