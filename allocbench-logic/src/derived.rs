//! Derived Metrics
//!
//! Named expressions evaluated against a metric context. Definitions are
//! evaluated in order and each result is bound under its name, so later
//! definitions may build on earlier ones.

use crate::context::MetricContext;
use crate::expr::Expr;
use serde::{Deserialize, Serialize};

/// A named metric computed from other metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetric {
    /// Name the value is bound under
    pub name: String,
    /// Expression computing it
    pub expression: Expr,
}

impl DerivedMetric {
    /// Create a derived metric from an expression string
    pub fn new(name: impl Into<String>, expression: &str) -> Result<Self, crate::ExprError> {
        Ok(Self {
            name: name.into(),
            expression: Expr::parse(expression)?,
        })
    }

    /// A datapoint that is just a single metric, named after it
    pub fn metric(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            expression: Expr::Metric(name.clone()),
            name,
        }
    }
}

impl std::str::FromStr for DerivedMetric {
    type Err = crate::ExprError;

    /// Parses `name=expression`, or a bare expression named after itself
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, expr)) => DerivedMetric::new(name.trim(), expr),
            None => DerivedMetric::new(s.trim(), s),
        }
    }
}

/// Outcome of evaluating one derived metric
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivedResult {
    pub name: String,
    pub expression: String,
    pub value: Option<f64>,
    pub error: Option<String>,
}

/// Evaluate derived metrics in declaration order
pub fn compute_derived(defs: &[DerivedMetric], context: &MetricContext) -> Vec<DerivedResult> {
    let mut scope = context.clone();
    defs.iter()
        .map(|def| match def.expression.eval(&scope) {
            Ok(value) => {
                scope.set(def.name.clone(), value);
                DerivedResult {
                    name: def.name.clone(),
                    expression: def.expression.to_string(),
                    value: Some(value),
                    error: None,
                }
            }
            Err(e) => DerivedResult {
                name: def.name.clone(),
                expression: def.expression.to_string(),
                value: None,
                error: Some(e.to_string()),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_definitions() {
        let ctx: MetricContext = [("ops", 1000.0), ("task-clock", 500.0)]
            .into_iter()
            .collect();
        let defs = vec![
            "throughput = {ops} / {task-clock}".parse::<DerivedMetric>().unwrap(),
            DerivedMetric::new("doubled", "throughput * 2").unwrap(),
        ];

        let results = compute_derived(&defs, &ctx);
        assert_eq!(results[0].value, Some(2.0));
        assert_eq!(results[1].value, Some(4.0));
    }

    #[test]
    fn test_error_does_not_abort_rest() {
        let ctx: MetricContext = [("a", 1.0)].into_iter().collect();
        let defs = vec![
            DerivedMetric::new("bad", "{missing} + 1").unwrap(),
            DerivedMetric::new("good", "a + 1").unwrap(),
        ];

        let results = compute_derived(&defs, &ctx);
        assert!(results[0].value.is_none());
        assert!(results[0].error.as_deref().unwrap().contains("missing"));
        assert_eq!(results[1].value, Some(2.0));
    }

    #[test]
    fn test_bare_expression_names_itself() {
        let def: DerivedMetric = "{VmHWM}".parse().unwrap();
        assert_eq!(def.name, "{VmHWM}");
        assert_eq!(def.expression, DerivedMetric::metric("VmHWM").expression);
    }
}
