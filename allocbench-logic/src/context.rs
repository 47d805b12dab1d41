//! Metric Context
//!
//! Provides variable bindings for expression evaluation.

use crate::expr::{Expr, ExprError, MetricLookup};
use fxhash::FxHashMap;

/// Context holding metric values for expression evaluation
#[derive(Debug, Clone, Default)]
pub struct MetricContext {
    metrics: FxHashMap<String, f64>,
}

impl MetricContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a metric value
    pub fn set(&mut self, name: impl Into<String>, value: f64) {
        self.metrics.insert(name.into(), value);
    }

    /// Get a metric value
    pub fn get(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).copied()
    }

    /// Check whether a metric is bound
    pub fn has(&self, name: &str) -> bool {
        self.metrics.contains_key(name)
    }

    /// Parse and evaluate an expression in this context
    pub fn evaluate(&self, expression: &str) -> Result<f64, ExprError> {
        Expr::parse(expression)?.eval(self)
    }

    /// List all metric names
    pub fn metric_names(&self) -> impl Iterator<Item = &String> {
        self.metrics.keys()
    }
}

impl MetricLookup for MetricContext {
    fn metric(&self, name: &str) -> Option<f64> {
        self.get(name)
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for MetricContext {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_evaluation() {
        let mut ctx = MetricContext::new();
        ctx.set("x", 10.0);
        ctx.set("y", 5.0);

        let result = ctx.evaluate("x + y").unwrap();
        assert!((result - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_perf_event_names() {
        let ctx: MetricContext = [("cpu-clock", 1500.0), ("cycles", 3000.0)]
            .into_iter()
            .collect();

        let result = ctx.evaluate("{cycles} / {cpu-clock}").unwrap();
        assert!((result - 2.0).abs() < f64::EPSILON);
        assert!(ctx.has("cycles"));
        assert!(!ctx.has("instructions"));
    }

    #[test]
    fn test_unknown_metric() {
        let ctx = MetricContext::new();
        assert!(matches!(
            ctx.evaluate("{VmHWM}"),
            Err(ExprError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_nan_propagates() {
        let mut ctx = MetricContext::new();
        ctx.set("m", f64::NAN);
        assert!(ctx.evaluate("m * 0").unwrap().is_nan());
    }
}
