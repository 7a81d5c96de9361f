//! Prometheus text exposition format.
//!
//! - `line`: per-line classification (sample / TYPE / HELP / anything else).
//! - `parser`: folds classified lines into an [`Exposition`].
//! - `render`: writes the surviving series back out as exposition text.
//!
//! Parsing is best-effort: a line that matches no grammar, or whose value is
//! not a float, is skipped without failing the payload.

pub mod line;
pub mod parser;
pub mod render;

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use crate::identity::SeriesKey;

pub use line::{Line, LineClassifier};
pub use parser::{parse, Parser};
pub use render::{format_value, render};

/// Suffixes under which histogram and summary families publish their samples.
const MULTI_SAMPLE_SUFFIXES: [&str; 3] = ["_bucket", "_sum", "_count"];

/// Declared metric type (`# TYPE <name> <kind>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricType {
    Counter,
    Gauge,
    Untyped,
    /// Not supported: never re-exposed.
    Histogram,
    /// Not supported: never re-exposed.
    Summary,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Untyped => "untyped",
            MetricType::Histogram => "histogram",
            MetricType::Summary => "summary",
        }
    }

    /// Multi-sample families cannot be filtered per line and are dropped.
    pub fn is_unsupported(self) -> bool {
        matches!(self, MetricType::Histogram | MetricType::Summary)
    }
}

impl FromStr for MetricType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "counter" => Ok(MetricType::Counter),
            "gauge" => Ok(MetricType::Gauge),
            "untyped" => Ok(MetricType::Untyped),
            "histogram" => Ok(MetricType::Histogram),
            "summary" => Ok(MetricType::Summary),
            _ => Err(()),
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One sample of a family.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Verbatim label block contents (without braces).
    pub labels: String,
    pub value: f64,
    /// Parsed but never forwarded.
    pub timestamp: Option<i64>,
}

/// A metric family as seen in a single scrape.
#[derive(Debug, Clone, Default)]
pub struct MetricFamily {
    pub name: String,
    /// `None` when the payload carried no `# TYPE` line for this family.
    pub kind: Option<MetricType>,
    pub help: String,
    series: Vec<Series>,
    index: HashMap<String, usize>,
}

impl MetricFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Effective type; undeclared families are `untyped`.
    pub fn metric_type(&self) -> MetricType {
        self.kind.unwrap_or(MetricType::Untyped)
    }

    /// Series in first-seen order.
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    pub fn get(&self, labels: &str) -> Option<&Series> {
        self.index.get(labels).and_then(|&i| self.series.get(i))
    }

    /// Insert a sample. A repeated label block overwrites the earlier value
    /// in place.
    pub fn upsert(&mut self, labels: &str, value: f64, timestamp: Option<i64>) {
        if let Some(s) = self.index.get(labels).and_then(|&i| self.series.get_mut(i)) {
            s.value = value;
            s.timestamp = timestamp;
            return;
        }
        self.index.insert(labels.to_string(), self.series.len());
        self.series.push(Series {
            labels: labels.to_string(),
            value,
            timestamp,
        });
    }

    pub fn key(&self, series: &Series) -> SeriesKey {
        SeriesKey::new(self.name.as_str(), series.labels.as_str())
    }
}

/// Parse result for one scrape: family name -> family, iterated by name.
#[derive(Debug, Clone, Default)]
pub struct Exposition {
    families: BTreeMap<String, MetricFamily>,
}

impl Exposition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn family(&self, name: &str) -> Option<&MetricFamily> {
        self.families.get(name)
    }

    pub fn family_mut(&mut self, name: &str) -> &mut MetricFamily {
        self.families
            .entry(name.to_string())
            .or_insert_with(|| MetricFamily::new(name))
    }

    pub fn families(&self) -> impl Iterator<Item = &MetricFamily> {
        self.families.values()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn series_count(&self) -> usize {
        self.families.values().map(|f| f.series.len()).sum()
    }

    /// True for histogram/summary families and for the undeclared
    /// `_bucket`/`_sum`/`_count` families that belong to one.
    pub fn is_unsupported(&self, family: &MetricFamily) -> bool {
        match family.kind {
            Some(kind) => kind.is_unsupported(),
            None => MULTI_SAMPLE_SUFFIXES.iter().any(|suffix| {
                family
                    .name
                    .strip_suffix(suffix)
                    .and_then(|base| self.families.get(base))
                    .and_then(|base| base.kind)
                    .is_some_and(MetricType::is_unsupported)
            }),
        }
    }

    /// Families that may reach the output.
    pub fn supported_families(&self) -> impl Iterator<Item = &MetricFamily> {
        self.families().filter(|f| !self.is_unsupported(f))
    }
}
