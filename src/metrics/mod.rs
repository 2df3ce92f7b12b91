//! Metrics collection and export module.
//!
//! This module owns the Prometheus registry the exporter publishes into.
//! The registry is an explicitly owned object handed to both the
//! registration pass and the scrape endpoint; there are no global metric
//! singletons.
//!
//! # Submodules
//!
//! - `prom` - Prometheus registry and gauge definitions

pub mod prom;
