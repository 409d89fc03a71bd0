//! Prometheus metrics for the relay and the contracts it drives.
//!
//! [`RelayMetrics`] owns a dedicated [`Registry`] that can be encoded into
//! the Prometheus text exposition format with [`RelayMetrics::encode`].

use prometheus::{
    register_int_counter_with_registry, register_int_gauge_with_registry, Encoder, IntCounter,
    IntGauge, Opts, Registry, TextEncoder,
};

pub struct RelayMetrics {
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Envelopes encoded and queued by either chain.
    pub envelopes_sent: IntCounter,
    /// Envelopes applied to their destination contract.
    pub envelopes_delivered: IntCounter,
    /// Redeliveries dropped by an inbox.
    pub envelopes_duplicate: IntCounter,
    /// Deliveries refused by the destination contract.
    pub deliveries_rejected: IntCounter,
    pub auctions_awarded: IntCounter,
    pub auctions_failed: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub open_auctions: IntGauge,
    pub registered_pois: IntGauge,
}

impl RelayMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let envelopes_sent = register_int_counter_with_registry!(
            Opts::new("poi_relay_envelopes_sent_total", "Envelopes queued for delivery"),
            registry
        )?;
        let envelopes_delivered = register_int_counter_with_registry!(
            Opts::new(
                "poi_relay_envelopes_delivered_total",
                "Envelopes applied to their destination contract"
            ),
            registry
        )?;
        let envelopes_duplicate = register_int_counter_with_registry!(
            Opts::new(
                "poi_relay_envelopes_duplicate_total",
                "Redelivered envelopes dropped by an inbox"
            ),
            registry
        )?;
        let deliveries_rejected = register_int_counter_with_registry!(
            Opts::new(
                "poi_relay_deliveries_rejected_total",
                "Deliveries refused by the destination contract"
            ),
            registry
        )?;
        let auctions_awarded = register_int_counter_with_registry!(
            Opts::new("poi_auctions_awarded_total", "Auctions settled with a winner"),
            registry
        )?;
        let auctions_failed = register_int_counter_with_registry!(
            Opts::new("poi_auctions_failed_total", "Auctions settled without an eligible entrant"),
            registry
        )?;

        let open_auctions = register_int_gauge_with_registry!(
            Opts::new("poi_open_auctions", "Auctions currently accepting or awaiting settlement"),
            registry
        )?;
        let registered_pois = register_int_gauge_with_registry!(
            Opts::new("poi_registered_pois", "POIs registered on the settlement chain"),
            registry
        )?;

        Ok(Self {
            registry,
            envelopes_sent,
            envelopes_delivered,
            envelopes_duplicate,
            deliveries_rejected,
            auctions_awarded,
            auctions_failed,
            open_auctions,
            registered_pois,
        })
    }

    /// Render every metric in the Prometheus text format.
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
