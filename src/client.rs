//! Upstream endoflife.date API client.
//!
//! The API returns one JSON array per product, one object per release cycle.
//! The schema is loosely typed: the same field may arrive as a string, a
//! boolean, a number, or null depending on the product. [`FlexibleString`]
//! and [`FlexibleDate`] normalize those scalars to plain strings at decode
//! time so the rest of the exporter only ever deals with `&str`.

use std::fmt;
use std::time::Duration;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

use crate::error::FetchError;

/// Public endoflife.date API.
pub const DEFAULT_BASE_URL: &str = "https://endoflife.date/api";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A JSON scalar decoded to its canonical string form.
///
/// Accepts strings, booleans, numbers, and null:
/// booleans become the lowercase literals `"true"`/`"false"`, numbers their
/// shortest decimal representation, null the empty string. Any other JSON
/// shape is a decode error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexibleString(String);

impl FlexibleString {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FlexibleString {
    fn from(s: &str) -> Self {
        FlexibleString(s.to_string())
    }
}

impl fmt::Display for FlexibleString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FlexibleString {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexibleStringVisitor;

        impl<'de> Visitor<'de> for FlexibleStringVisitor {
            type Value = FlexibleString;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string, boolean, number, or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FlexibleString(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FlexibleString(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(FlexibleString(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(FlexibleString(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(FlexibleString(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexibleString(String::new()))
            }
        }

        deserializer.deserialize_any(FlexibleStringVisitor)
    }
}

/// A date-or-flag field decoded to its canonical string form.
///
/// Same contract as [`FlexibleString`] except numbers are rejected: upstream
/// date fields are either a `YYYY-MM-DD` string, a boolean flag, or null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexibleDate(String);

impl FlexibleDate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FlexibleDate {
    fn from(s: &str) -> Self {
        FlexibleDate(s.to_string())
    }
}

impl fmt::Display for FlexibleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for FlexibleDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct FlexibleDateVisitor;

        impl<'de> Visitor<'de> for FlexibleDateVisitor {
            type Value = FlexibleDate;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a date string, boolean, or null")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(FlexibleDate(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(FlexibleDate(v.to_string()))
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(FlexibleDate(String::new()))
            }
        }

        deserializer.deserialize_any(FlexibleDateVisitor)
    }
}

/// One release cycle of one product, as returned by the API.
///
/// Fields missing from the upstream object decode to their empty defaults,
/// matching how sparsely some products are filled in upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EolRecord {
    #[serde(default)]
    pub cycle: FlexibleString,
    #[serde(default, rename = "releaseDate")]
    pub release_date: FlexibleDate,
    #[serde(default)]
    pub eol: FlexibleString,
    #[serde(default)]
    pub latest: FlexibleString,
    #[serde(default)]
    pub link: FlexibleString,
    /// Boolean or string upstream; see [`EolRecord::lts_label`].
    #[serde(default)]
    pub lts: Value,
    #[serde(default)]
    pub support: FlexibleDate,
    #[serde(default)]
    pub discontinued: FlexibleDate,
}

impl EolRecord {
    /// Normalizes the tri-state `lts` field: booleans become their string
    /// literal, strings pass through, anything else is `"unknown"`.
    pub fn lts_label(&self) -> String {
        match &self.lts {
            Value::Bool(b) => b.to_string(),
            Value::String(s) => s.clone(),
            _ => "unknown".to_string(),
        }
    }
}

/// Blocking HTTP client for the endoflife.date API.
///
/// One `GET {base_url}/{product}.json` per [`fetch`](EolClient::fetch) call;
/// no caching, no retries.
#[derive(Debug)]
pub struct EolClient {
    http: reqwest::blocking::Client,
    base_url: String,
}

impl EolClient {
    /// Creates a client for the given base URL with the default 30s timeout.
    pub fn new(base_url: &str) -> Result<EolClient, FetchError> {
        EolClient::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Creates a client with an explicit request timeout.
    ///
    /// The timeout bounds the whole request, connect through body read.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<EolClient, FetchError> {
        Url::parse(base_url).map_err(|source| FetchError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| FetchError::Transport {
                url: base_url.to_string(),
                source,
            })?;

        Ok(EolClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetches all release cycles for a product.
    ///
    /// Returns the records in upstream order, unfiltered. Connection
    /// failures and non-2xx statuses surface as transport errors, anything
    /// wrong with the body as a decode error.
    pub fn fetch(&self, product: &str) -> Result<Vec<EolRecord>, FetchError> {
        let url = format!("{}/{}.json", self.base_url, product);

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| FetchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|source| FetchError::Transport {
            url: url.clone(),
            source,
        })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn flexible_string_accepts_all_scalar_kinds() {
        let cases = [
            (r#""test""#, "test"),
            ("true", "true"),
            ("false", "false"),
            ("42", "42"),
            ("-7", "-7"),
            ("1.5", "1.5"),
            ("null", ""),
        ];
        for (input, expected) in cases {
            let value: FlexibleString = serde_json::from_str(input).unwrap();
            assert_eq!(value.as_str(), expected, "input: {}", input);
        }
    }

    #[test]
    fn flexible_string_rejects_objects_and_arrays() {
        assert!(serde_json::from_str::<FlexibleString>(r#"{"key": "value"}"#).is_err());
        assert!(serde_json::from_str::<FlexibleString>("[1, 2]").is_err());
        assert!(serde_json::from_str::<FlexibleString>("{").is_err());
    }

    #[test]
    fn flexible_date_accepts_strings_booleans_and_null() {
        let cases = [
            (r#""2023-01-01""#, "2023-01-01"),
            ("true", "true"),
            ("false", "false"),
            ("null", ""),
        ];
        for (input, expected) in cases {
            let value: FlexibleDate = serde_json::from_str(input).unwrap();
            assert_eq!(value.as_str(), expected, "input: {}", input);
        }
    }

    #[test]
    fn flexible_date_rejects_numbers() {
        assert!(serde_json::from_str::<FlexibleDate>("42").is_err());
        assert!(serde_json::from_str::<FlexibleDate>("1.5").is_err());
        assert!(serde_json::from_str::<FlexibleDate>(r#"{"key": "value"}"#).is_err());
    }

    #[test]
    fn record_decodes_heterogeneous_fields() {
        let body = r#"{
            "cycle": 21.04,
            "releaseDate": "2021-04-22",
            "eol": "2022-01-01",
            "latest": "21.04",
            "link": null,
            "lts": false,
            "support": true,
            "discontinued": "2022-01-01"
        }"#;

        let record: EolRecord = serde_json::from_str(body).unwrap();
        assert_eq!(record.cycle.as_str(), "21.04");
        assert_eq!(record.release_date.as_str(), "2021-04-22");
        assert_eq!(record.eol.as_str(), "2022-01-01");
        assert_eq!(record.link.as_str(), "");
        assert_eq!(record.support.as_str(), "true");
        assert_eq!(record.lts_label(), "false");
    }

    #[test]
    fn record_tolerates_missing_fields() {
        let record: EolRecord = serde_json::from_str(r#"{"cycle": "8"}"#).unwrap();
        assert_eq!(record.cycle.as_str(), "8");
        assert_eq!(record.eol.as_str(), "");
        assert_eq!(record.lts_label(), "unknown");
    }

    #[test]
    fn lts_label_normalizes_the_tri_state() {
        let from_json = |lts: &str| -> EolRecord {
            serde_json::from_str(&format!(r#"{{"lts": {}}}"#, lts)).unwrap()
        };
        assert_eq!(from_json("true").lts_label(), "true");
        assert_eq!(from_json(r#""2027-04-01""#).lts_label(), "2027-04-01");
        assert_eq!(from_json("null").lts_label(), "unknown");
        assert_eq!(from_json("12").lts_label(), "unknown");
    }

    #[test]
    fn new_rejects_invalid_base_url() {
        let err = EolClient::new("not a url").unwrap_err();
        assert!(matches!(err, FetchError::InvalidBaseUrl { .. }));
    }

    fn mock_server(responses: Vec<(u16, String)>) -> String {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            for (status, body) in responses {
                match server.recv() {
                    Ok(request) => {
                        let response =
                            tiny_http::Response::from_string(body).with_status_code(status);
                        let _ = request.respond(response);
                    }
                    Err(_) => break,
                }
            }
        });
        format!("http://{}", addr)
    }

    #[test]
    fn fetch_decodes_a_successful_response() {
        let body = r#"[{
            "cycle": "21.04",
            "releaseDate": "2021-04-22",
            "eol": "2022-01-01",
            "latest": "21.04",
            "link": "https://wiki.ubuntu.com/HirsuteHippo/ReleaseNotes/",
            "lts": false,
            "support": "2022-01-01",
            "discontinued": "2022-01-01"
        }]"#;
        let base_url = mock_server(vec![(200, body.to_string())]);

        let client = EolClient::new(&base_url).unwrap();
        let records = client.fetch("ubuntu").unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cycle.as_str(), "21.04");
        assert_eq!(records[0].eol.as_str(), "2022-01-01");
    }

    #[test]
    fn fetch_fails_on_non_success_status() {
        let base_url = mock_server(vec![(404, String::new())]);

        let client = EolClient::new(&base_url).unwrap();
        let err = client.fetch("no-such-product").unwrap_err();

        match err {
            FetchError::UnexpectedStatus { status, url } => {
                assert_eq!(status, 404);
                assert!(url.ends_with("no-such-product.json"));
            }
            other => panic!("expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[test]
    fn fetch_fails_on_invalid_json() {
        let base_url = mock_server(vec![(200, "invalid json".to_string())]);

        let client = EolClient::new(&base_url).unwrap();
        let err = client.fetch("ubuntu").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn fetch_fails_on_schema_mismatch() {
        // eol must be a scalar, not an object
        let body = r#"[{"cycle": "1.0", "eol": {"date": "2022-01-01"}}]"#;
        let base_url = mock_server(vec![(200, body.to_string())]);

        let client = EolClient::new(&base_url).unwrap();
        let err = client.fetch("ubuntu").unwrap_err();
        assert!(matches!(err, FetchError::Decode { .. }));
    }

    #[test]
    fn fetch_times_out_against_a_stalled_server() {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        thread::spawn(move || {
            if let Ok(request) = server.recv() {
                thread::sleep(Duration::from_millis(500));
                let _ = request.respond(tiny_http::Response::from_string("[]"));
            }
        });

        let client = EolClient::with_timeout(
            &format!("http://{}", addr),
            Duration::from_millis(50),
        )
        .unwrap();

        let err = client.fetch("ubuntu").unwrap_err();
        assert!(matches!(err, FetchError::Transport { .. }));
    }
}
