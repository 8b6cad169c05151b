//! Lightweight in-process metrics.
//!
//! Counters and gauges are atomics behind `DashMap` label sets, rendered in
//! Prometheus text format by the `/metrics` handler.

pub mod metrics;

pub use metrics::RelayMetrics;
