#![warn(missing_docs)]
//! allocbench Logic - Datapoint Expressions
//!
//! Datapoints in reports are arithmetic over metric statistics, e.g.
//! `{task-clock} / 1000`. This crate parses them into a closed, typed AST and
//! evaluates them with an explicit interpreter: numbers, metric references
//! and `+ - * /`, nothing else.

mod context;
mod derived;
mod expr;

pub use context::MetricContext;
pub use derived::{DerivedMetric, DerivedResult, compute_derived};
pub use expr::{BinaryOp, Expr, ExprError, MetricLookup};
