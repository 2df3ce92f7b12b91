use prometheus::{Encoder, GaugeVec, Opts, Registry, TextEncoder};

/// The exporter's metric registry and the gauges registered in it.
///
/// Writes happen once, during the registration pass before the HTTP server
/// starts; scrapes only read. Clones share the same underlying registry, so
/// a clone handed to the server thread sees every sample set before it.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    end_of_life: GaugeVec,
}

impl Metrics {
    /// Creates a fresh registry with the `endoflife_service` gauge registered.
    pub fn new() -> Metrics {
        let registry = Registry::new();
        let end_of_life = GaugeVec::new(
            Opts::new("endoflife_service", "End of life date for services"),
            &["service", "host", "version", "cycle"],
        )
        .expect("endoflife_service gauge definition");
        registry
            .register(Box::new(end_of_life.clone()))
            .expect("endoflife_service gauge registration");

        Metrics {
            registry,
            end_of_life,
        }
    }

    /// Sets the EOL timestamp sample for one product release cycle.
    ///
    /// Last write wins: re-registering the same label set overwrites the
    /// previous value.
    pub fn set_end_of_life(
        &self,
        service: &str,
        host: &str,
        version: &str,
        cycle: &str,
        timestamp: f64,
    ) {
        self.end_of_life
            .with_label_values(&[service, host, version, cycle])
            .set(timestamp);
    }

    /// Renders the current registry contents in the Prometheus text
    /// exposition format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Metrics::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_contains_the_gauge_header() {
        let metrics = Metrics::new();
        let body = metrics.encode().unwrap();
        assert!(body.contains("# TYPE endoflife_service gauge"));
        assert!(body.contains("# HELP endoflife_service End of life date for services"));
    }

    #[test]
    fn set_end_of_life_publishes_a_labeled_sample() {
        let metrics = Metrics::new();
        metrics.set_end_of_life("ubuntu", "localhost", "22.04", "21.04", 1640995200.0);

        let body = metrics.encode().unwrap();
        let sample = body
            .lines()
            .find(|line| line.starts_with("endoflife_service{"))
            .expect("gauge sample line");

        assert!(sample.contains(r#"service="ubuntu""#));
        assert!(sample.contains(r#"host="localhost""#));
        assert!(sample.contains(r#"version="22.04""#));
        assert!(sample.contains(r#"cycle="21.04""#));
        assert!(sample.ends_with("1640995200"));
    }

    #[test]
    fn re_registration_overwrites_the_sample() {
        let metrics = Metrics::new();
        metrics.set_end_of_life("ubuntu", "localhost", "22.04", "21.04", 1.0);
        metrics.set_end_of_life("ubuntu", "localhost", "22.04", "21.04", 2.0);

        let body = metrics.encode().unwrap();
        let samples: Vec<&str> = body
            .lines()
            .filter(|line| line.starts_with("endoflife_service{"))
            .collect();
        assert_eq!(samples.len(), 1);
        assert!(samples[0].ends_with(" 2"));
    }

    #[test]
    fn clones_share_the_registry() {
        let metrics = Metrics::new();
        let clone = metrics.clone();
        metrics.set_end_of_life("nodejs", "localhost", "16", "16", 1652313600.0);

        assert!(clone.encode().unwrap().contains(r#"service="nodejs""#));
    }
}
