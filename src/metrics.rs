//! Resolution metrics and tracing spans.
//!
//! With the `metrics` feature, [`METRICS`] counts resolutions by outcome and
//! records their duration through an OpenTelemetry meter exported to a
//! Prometheus registry. With the `tracing` feature, [`tracing_helpers`] builds
//! the span each resolution runs in.

#[cfg(feature = "metrics")]
pub use self::otel::{LookoutMetrics, METRICS};

#[cfg(feature = "metrics")]
mod otel {
    use once_cell::sync::Lazy;
    use opentelemetry::{
        global,
        metrics::{Counter, Histogram, Meter, MeterProvider as _},
        KeyValue,
    };
    use opentelemetry_sdk::metrics::SdkMeterProvider;
    use prometheus::{Encoder, Registry, TextEncoder};
    use std::time::Duration;

    pub static METRICS: Lazy<LookoutMetrics> = Lazy::new(LookoutMetrics::init);

    pub struct LookoutMetrics {
        pub registry: Registry,
        pub resolutions_total: Counter<u64>,
        pub resolution_duration: Histogram<f64>,
        pub call_failures_total: Counter<u64>,
        // Keeps the exporter's reader alive
        _provider: Option<SdkMeterProvider>,
    }

    impl LookoutMetrics {
        pub fn init() -> Self {
            let registry = Registry::new();
            let (meter, provider): (Meter, Option<SdkMeterProvider>) =
                match opentelemetry_prometheus::exporter()
                    .with_registry(registry.clone())
                    .build()
                {
                    Ok(exporter) => {
                        let provider = SdkMeterProvider::builder().with_reader(exporter).build();
                        (provider.meter("lookout"), Some(provider))
                    }
                    Err(e) => {
                        log::warn!("failed to build prometheus exporter, metrics stay in-process: {e}");
                        (global::meter("lookout"), None)
                    }
                };

            let resolutions_total = meter
                .u64_counter("lookout_resolutions_total")
                .with_description("Total lookups resolved, by outcome")
                .build();

            let resolution_duration = meter
                .f64_histogram("lookout_resolution_duration_seconds")
                .with_description("Duration of lookups, call and routing included")
                .build();

            let call_failures_total = meter
                .u64_counter("lookout_call_failures_total")
                .with_description("Broker calls and model actions that failed before settling")
                .build();

            Self {
                registry,
                resolutions_total,
                resolution_duration,
                call_failures_total,
                _provider: provider,
            }
        }

        pub fn record_resolution(&self, outcome: &'static str, elapsed: Duration) {
            let attributes = [KeyValue::new("outcome", outcome)];
            self.resolutions_total.add(1, &attributes);
            self.resolution_duration.record(elapsed.as_secs_f64(), &attributes);
        }

        pub fn record_call_failure(&self, target: &'static str) {
            self.call_failures_total.add(1, &[KeyValue::new("target", target)]);
        }

        /// Current metrics in the Prometheus text format
        pub fn encode(&self) -> Result<String, prometheus::Error> {
            let mut buffer = Vec::new();
            TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
            String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
        }
    }
}

#[cfg(feature = "tracing")]
pub mod tracing_helpers {
    use tracing::{info_span, Span};

    /// Span wrapping one resolution
    pub fn resolve_span(correlation_id: &str, target: &str) -> Span {
        info_span!("lookout.resolve", correlation_id = %correlation_id, target = %target)
    }

    /// Span wrapping the broker call or model action of a resolution
    pub fn call_span(call: &str) -> Span {
        info_span!("lookout.call", call = %call)
    }
}
