//! In-process metric backend.
//!
//! A [`Registry`] owns named metric families (counters and histograms). Each
//! family declares a fixed, ordered label schema at registration; instances
//! are created lazily per label tuple and live as long as the family.
//! Families are stored as atomics behind `DashMap` shards, so recording never
//! blocks beyond a shard lock on first use of a tuple.
//!
//! Rendering produces the Prometheus text exposition format, or OpenMetrics
//! when asked for it.

mod counter;
mod histogram;

use std::fmt::Write;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::error::{HookwatchError, Result};

pub use counter::CounterVec;
pub use histogram::{HistogramSnapshot, HistogramVec, DEFAULT_BUCKETS};

/// Exposition format negotiated with the scraper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Prometheus text format 0.0.4.
    #[default]
    Text,
    /// OpenMetrics 1.0.0 text format.
    OpenMetrics,
}

impl Format {
    pub fn content_type(self) -> &'static str {
        match self {
            Format::Text => "text/plain; version=0.0.4; charset=utf-8",
            Format::OpenMetrics => "application/openmetrics-text; version=1.0.0; charset=utf-8",
        }
    }

    /// Pick a format from an HTTP `Accept` header value: OpenMetrics when
    /// listed with a non-zero quality, text otherwise.
    pub fn negotiate(accept: Option<&str>) -> Self {
        let Some(accept) = accept else {
            return Format::Text;
        };
        let wanted = accept.split(',').any(|range| {
            let mut params = range.split(';').map(str::trim);
            let media = params.next().unwrap_or_default();
            if !media.eq_ignore_ascii_case("application/openmetrics-text") {
                return false;
            }
            let q = params
                .filter_map(|p| p.split_once('='))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("q"))
                .map(|(_, v)| v.trim().parse::<f64>().unwrap_or(0.0))
                .unwrap_or(1.0);
            q > 0.0
        });
        if wanted {
            Format::OpenMetrics
        } else {
            Format::Text
        }
    }
}

/// Options describing a metric family before registration.
#[derive(Debug, Clone, Default)]
pub struct Opts {
    pub namespace: String,
    pub subsystem: String,
    pub name: String,
    pub help: String,
    pub labels: Vec<String>,
}

impl Opts {
    pub fn new(name: impl Into<String>, help: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: help.into(),
            ..Self::default()
        }
    }

    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn subsystem(mut self, subsystem: impl Into<String>) -> Self {
        self.subsystem = subsystem.into();
        self
    }

    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Fully-qualified name: non-empty parts of namespace, subsystem and name joined by `_`.
    pub fn fq_name(&self) -> String {
        [&self.namespace, &self.subsystem, &self.name]
            .iter()
            .filter(|p| !p.is_empty())
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Validated, immutable family description.
#[derive(Debug)]
pub(crate) struct Desc {
    pub(crate) name: String,
    pub(crate) help: String,
    pub(crate) labels: Vec<String>,
}

impl Desc {
    fn new(opts: Opts, histogram: bool) -> Result<Self> {
        let name = opts.fq_name();
        if !valid_metric_name(&name) {
            return Err(HookwatchError::InvalidSchema(format!(
                "invalid metric name: {name:?}"
            )));
        }
        for (i, label) in opts.labels.iter().enumerate() {
            if !valid_label_name(label) || label.starts_with("__") {
                return Err(HookwatchError::InvalidSchema(format!(
                    "invalid label name {label:?} on {name}"
                )));
            }
            if histogram && label == "le" {
                return Err(HookwatchError::InvalidSchema(format!(
                    "label \"le\" is reserved on histogram {name}"
                )));
            }
            if opts.labels[..i].contains(label) {
                return Err(HookwatchError::InvalidSchema(format!(
                    "duplicate label {label:?} on {name}"
                )));
            }
        }
        Ok(Self {
            name,
            help: opts.help,
            labels: opts.labels,
        })
    }

    /// Build the instance key for a label tuple, checking it against the schema.
    pub(crate) fn key(&self, values: &[&str]) -> Result<Vec<String>> {
        if values.len() != self.labels.len() {
            return Err(HookwatchError::LabelArity {
                family: self.name.clone(),
                expected: self.labels.len(),
                got: values.len(),
            });
        }
        for (label, v) in self.labels.iter().zip(values) {
            if v.is_empty() {
                return Err(HookwatchError::EmptyLabelValue {
                    family: self.name.clone(),
                    label: label.clone(),
                });
            }
        }
        Ok(values.iter().map(|v| v.to_string()).collect())
    }

    fn render_header(&self, kind: &str, out: &mut String) {
        let help = self.help.replace('\\', "\\\\").replace('\n', "\\n");
        let _ = writeln!(out, "# HELP {} {}", self.name, help);
        let _ = writeln!(out, "# TYPE {} {}", self.name, kind);
    }

    /// `a="x",b="y"` for the given tuple (empty when the family has no labels).
    pub(crate) fn label_pairs(&self, values: &[String]) -> String {
        self.labels
            .iter()
            .zip(values)
            .map(|(k, v)| format!("{}=\"{}\"", k, escape_label(v)))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

fn valid_metric_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == ':' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}

fn valid_label_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Clone)]
enum Family {
    Counter(Arc<CounterVec>),
    Histogram(Arc<HistogramVec>),
}

/// Registry of metric families.
///
/// Family names are unique per registry. Registration is the only way to
/// create a family; there is no removal.
#[derive(Default)]
pub struct Registry {
    families: DashMap<String, Family>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a counter family.
    pub fn register_counter(&self, opts: Opts) -> Result<Arc<CounterVec>> {
        let counter = Arc::new(CounterVec::new(Desc::new(opts, false)?));
        self.insert(counter.name(), Family::Counter(Arc::clone(&counter)))?;
        Ok(counter)
    }

    /// Register a histogram family with the given upper bounds (`+Inf` is implicit).
    pub fn register_histogram(&self, opts: Opts, buckets: &[f64]) -> Result<Arc<HistogramVec>> {
        let desc = Desc::new(opts, true)?;
        let histogram = Arc::new(HistogramVec::new(desc, buckets)?);
        self.insert(histogram.name(), Family::Histogram(Arc::clone(&histogram)))?;
        Ok(histogram)
    }

    fn insert(&self, name: &str, family: Family) -> Result<()> {
        match self.families.entry(name.to_string()) {
            Entry::Occupied(_) => Err(HookwatchError::AlreadyRegistered(name.to_string())),
            Entry::Vacant(v) => {
                v.insert(family);
                tracing::debug!(family = %name, "metric family registered");
                Ok(())
            }
        }
    }

    /// Registered family names, sorted.
    pub fn family_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.families.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Render every registered family.
    pub fn render(&self, format: Format) -> String {
        // Clone the Arcs out so no shard lock is held while formatting.
        let mut families: Vec<(String, Family)> = self
            .families
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        families.sort_by(|a, b| a.0.cmp(&b.0));

        let mut out = String::new();
        for (_, family) in &families {
            match family {
                Family::Counter(c) => c.render(format, &mut out),
                Family::Histogram(h) => h.render(&mut out),
            }
        }
        if format == Format::OpenMetrics {
            out.push_str("# EOF\n");
        }
        out
    }
}
