//! Metric names and recorders for the thumbnail broker

use std::time::Instant;

use opentelemetry::{
    KeyValue, global,
    metrics::{Counter, Histogram},
};

pub const GENERATION_COUNT: &str = "thumbnail.generation.count";
pub const GENERATION_DURATION: &str = "thumbnail.generation.duration";

/// Counters and histograms for generation requests
///
/// Instruments come from the global meter provider, so they are no-ops
/// until telemetry export is initialized.
#[derive(Clone)]
pub struct GenerationMetrics {
    count: Counter<u64>,
    duration: Histogram<f64>,
}

impl GenerationMetrics {
    pub fn new() -> Self {
        let meter = global::meter("thumbforge");

        Self {
            count: meter
                .u64_counter(GENERATION_COUNT)
                .with_description("Thumbnail generation requests by provider and outcome")
                .build(),
            duration: meter
                .f64_histogram(GENERATION_DURATION)
                .with_unit("s")
                .with_description("Time spent serving a thumbnail generation request")
                .build(),
        }
    }

    /// Record one finished generation attempt
    pub fn record(&self, provider: &'static str, outcome: &'static str, start: Instant) {
        let attributes = [KeyValue::new("provider", provider), KeyValue::new("outcome", outcome)];
        self.count.add(1, &attributes);
        self.duration.record(start.elapsed().as_secs_f64(), &attributes);
    }
}

impl Default for GenerationMetrics {
    fn default() -> Self {
        Self::new()
    }
}
