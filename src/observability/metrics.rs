use prometheus::{
    Encoder, GaugeVec, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub quotes_total: IntCounterVec,
    pub quote_latency_seconds: HistogramVec,
    pub delivery_transitions_total: IntCounterVec,
    pub allocation_runs_total: IntCounterVec,
    pub pending_deliveries: IntGauge,
    pub driver_assigned_zones: GaugeVec,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let quotes_total = IntCounterVec::new(
            Opts::new("quotes_total", "Total quote requests by outcome"),
            &["outcome"],
        )
        .expect("valid quotes_total metric");

        let quote_latency_seconds = HistogramVec::new(
            prometheus::HistogramOpts::new(
                "quote_latency_seconds",
                "Latency of quote computation in seconds",
            ),
            &["outcome"],
        )
        .expect("valid quote_latency_seconds metric");

        let delivery_transitions_total = IntCounterVec::new(
            Opts::new(
                "delivery_transitions_total",
                "Delivery lifecycle transitions by event and outcome",
            ),
            &["event", "outcome"],
        )
        .expect("valid delivery_transitions_total metric");

        let allocation_runs_total = IntCounterVec::new(
            Opts::new("allocation_runs_total", "Zone allocation runs by outcome"),
            &["outcome"],
        )
        .expect("valid allocation_runs_total metric");

        let pending_deliveries =
            IntGauge::new("pending_deliveries", "Current number of pending deliveries")
                .expect("valid pending_deliveries metric");

        let driver_assigned_zones = GaugeVec::new(
            Opts::new(
                "driver_assigned_zones",
                "Zones assigned to each driver in the last allocation run",
            ),
            &["driver_id"],
        )
        .expect("valid driver_assigned_zones metric");

        registry
            .register(Box::new(quotes_total.clone()))
            .expect("register quotes_total");
        registry
            .register(Box::new(quote_latency_seconds.clone()))
            .expect("register quote_latency_seconds");
        registry
            .register(Box::new(delivery_transitions_total.clone()))
            .expect("register delivery_transitions_total");
        registry
            .register(Box::new(allocation_runs_total.clone()))
            .expect("register allocation_runs_total");
        registry
            .register(Box::new(pending_deliveries.clone()))
            .expect("register pending_deliveries");
        registry
            .register(Box::new(driver_assigned_zones.clone()))
            .expect("register driver_assigned_zones");

        Self {
            registry,
            quotes_total,
            quote_latency_seconds,
            delivery_transitions_total,
            allocation_runs_total,
            pending_deliveries,
            driver_assigned_zones,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
