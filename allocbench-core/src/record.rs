//! Measurement records
//!
//! One record holds the metrics of a single run: a flat `name -> value` map
//! such as `{"task-clock": 1234.5, "VmHWM": 20480}`. A failed run produces an
//! empty record.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// The value of one metric in one run
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Numeric measurement
    Number(f64),
    /// Raw textual output, parsed on demand
    Text(String),
    /// The run did not produce this metric; stored as `null`
    Missing,
}

impl MetricValue {
    /// Numeric view of the value
    ///
    /// Text is parsed after trimming and yields `None` if it is not a number.
    /// A missing value reads as NaN so it poisons the statistics it enters.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => s.trim().parse().ok(),
            MetricValue::Missing => Some(f64::NAN),
        }
    }

    /// Whether this is the missing placeholder
    pub fn is_missing(&self) -> bool {
        matches!(self, MetricValue::Missing)
    }
}

impl Serialize for MetricValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            MetricValue::Number(n) => crate::float::serialize_f64(*n, serializer),
            MetricValue::Text(s) => serializer.serialize_str(s),
            MetricValue::Missing => serializer.serialize_none(),
        }
    }
}

impl From<f64> for MetricValue {
    // Non-finite values take the form they are reloaded in.
    fn from(v: f64) -> Self {
        if v.is_nan() {
            MetricValue::Missing
        } else if v.is_infinite() {
            MetricValue::Text(if v > 0.0 { "inf" } else { "-inf" }.to_string())
        } else {
            MetricValue::Number(v)
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Number(v as f64)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

/// Metrics of a single run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, MetricValue>);

impl Record {
    /// Empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// The record of a run that produced nothing
    pub fn failed() -> Self {
        Self::default()
    }

    /// A run is failed when it carries no metrics at all
    pub fn is_failed(&self) -> bool {
        self.0.is_empty()
    }

    /// Set a metric
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<MetricValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`Record::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<MetricValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw value of a metric
    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.0.get(name)
    }

    /// Numeric value of a metric; `None` if absent or not numeric
    pub fn numeric(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(MetricValue::as_f64)
    }

    /// Metric names
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `(name, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of metrics
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Same as [`Record::is_failed`]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Template for a failed run: every key present, every value missing
    pub fn missing_from<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self(
            keys.into_iter()
                .map(|k| (k.to_string(), MetricValue::Missing))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<MetricValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
