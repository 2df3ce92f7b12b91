//! Metric registration pass and the scrape endpoint.
//!
//! `register_metrics` is the core of the exporter: it walks the configured
//! products in configuration order, fetches each product's release cycles,
//! and publishes one gauge sample per cycle whose `eol` field is a real
//! calendar date. Everything runs synchronously at startup; the HTTP server
//! started afterwards only ever reads the registry.

use log::{debug, info, warn};

use chrono::{NaiveDate, NaiveTime};
use tiny_http::{Header, Method, Response, Server};

use crate::client::{EolClient, DEFAULT_BASE_URL};
use crate::config::Config;
use crate::error::{ExporterError, FetchError};
use crate::metrics::prom::Metrics;

const EOL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Fetches EOL data for every configured product and publishes the gauges.
///
/// A record whose `eol` is a boolean sentinel or fails date parsing is
/// skipped with a warning; a failed fetch aborts the pass immediately.
/// Samples set before the abort stay in the registry.
pub fn register_metrics(
    cfg: &Config,
    client: &EolClient,
    metrics: &Metrics,
) -> Result<(), FetchError> {
    for product in &cfg.products {
        for (name, details) in product {
            let records = client.fetch(name)?;

            for record in &records {
                debug!(
                    "{}: cycle {} (lts: {})",
                    name,
                    record.cycle,
                    record.lts_label()
                );

                let eol = record.eol.as_str();
                if eol == "true" || eol == "false" {
                    warn!("Skipping non-date EOL value for {}: {}", name, eol);
                    continue;
                }

                let date = match NaiveDate::parse_from_str(eol, EOL_DATE_FORMAT) {
                    Ok(date) => date,
                    Err(_) => {
                        warn!("Invalid date format for {} EOL: {}", name, eol);
                        continue;
                    }
                };

                let timestamp = date.and_time(NaiveTime::MIN).and_utc().timestamp();
                metrics.set_end_of_life(
                    name,
                    &details.host,
                    &details.version,
                    record.cycle.as_str(),
                    timestamp as f64,
                );
            }
        }
    }
    Ok(())
}

/// Serves the registry on `0.0.0.0:{port}` until the process exits.
///
/// Only `GET /metrics` is routed; everything else is a 404. Scrapes are a
/// pure read-through of registry state and never trigger re-fetching.
pub fn serve(port: u16, metrics: Metrics) -> Result<(), ExporterError> {
    let server = Server::http(("0.0.0.0", port)).map_err(|e| ExporterError::Server {
        reason: e.to_string(),
    })?;
    info!("Serving metrics on 0.0.0.0:{}/metrics", port);

    let content_type = Header::from_bytes(&b"Content-Type"[..], &b"text/plain; version=0.0.4"[..])
        .expect("static content-type header");

    for request in server.incoming_requests() {
        let response = if request.method() == &Method::Get && request.url() == "/metrics" {
            match metrics.encode() {
                Ok(body) => Response::from_string(body).with_header(content_type.clone()),
                Err(e) => {
                    warn!("Failed to gather metrics: {}", e);
                    Response::from_string(format!("Failed to gather metrics: {}", e))
                        .with_status_code(500)
                }
            }
        } else {
            Response::from_string("Not Found").with_status_code(404)
        };

        if let Err(e) = request.respond(response) {
            warn!("Failed to write scrape response: {}", e);
        }
    }
    Ok(())
}

/// Runs the whole exporter: one registration pass, then the scrape server.
///
/// Any fetch failure aborts before the server starts listening.
pub fn run(cfg: &Config) -> Result<(), ExporterError> {
    let client = EolClient::new(DEFAULT_BASE_URL)?;
    let metrics = Metrics::new();
    register_metrics(cfg, &client, &metrics)?;
    serve(cfg.port, metrics)
}
