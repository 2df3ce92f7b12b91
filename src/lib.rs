//! Prometheus exporter for endoflife.date.
//!
//! Fetches end-of-life dates for a configured set of products from the
//! [endoflife.date](https://endoflife.date) API and exposes them as the
//! `endoflife_service` gauge (labels `service`, `host`, `version`, `cycle`,
//! value = Unix timestamp of the EOL date) on a `/metrics` endpoint.
//!
//! The pipeline is a one-shot bootstrap: configuration is loaded once,
//! every product is fetched once, and the resulting samples live in the
//! registry for the lifetime of the process. Re-fetching requires a
//! process restart.

pub mod client;
pub mod config;
pub mod error;
pub mod exporter;
pub mod metrics;

pub use client::{EolClient, EolRecord, FlexibleDate, FlexibleString, DEFAULT_BASE_URL};
pub use config::{Config, ConfigError, Product};
pub use error::{ExporterError, FetchError};
