//! Prometheus metrics for the chain host.
//!
//! [`ChainMetrics`] owns a dedicated [`Registry`] that an exporter can encode
//! into the Prometheus text exposition format.

use prometheus::{
    register_histogram_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_with_registry, Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};

/// Central collection of all chain-level Prometheus metrics.
pub struct ChainMetrics {
    /// The Prometheus registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    /// Committed calls, labelled by entry point.
    pub calls_committed: IntCounterVec,
    /// Rejected calls, labelled by entry point.
    pub calls_rejected: IntCounterVec,

    // ── Gauges ──────────────────────────────────────────────────────────
    /// Height of the latest sealed block.
    pub block_height: IntGauge,
    /// Number of tokens deployed through the factory.
    pub token_count: IntGauge,
    /// Number of proposals ever created.
    pub proposal_count: IntGauge,

    // ── Histograms ──────────────────────────────────────────────────────
    /// Time spent inside the write lock per call, in milliseconds.
    pub call_time_ms: Histogram,
}

impl ChainMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let calls_committed = register_int_counter_vec_with_registry!(
            Opts::new("tally_calls_committed_total", "Calls committed into a block"),
            &["call"],
            registry
        )?;

        let calls_rejected = register_int_counter_vec_with_registry!(
            Opts::new("tally_calls_rejected_total", "Calls rejected without effect"),
            &["call"],
            registry
        )?;

        let block_height = register_int_gauge_with_registry!(
            Opts::new("tally_block_height", "Height of the latest sealed block"),
            registry
        )?;

        let token_count = register_int_gauge_with_registry!(
            Opts::new("tally_token_count", "Tokens deployed through the factory"),
            registry
        )?;

        let proposal_count = register_int_gauge_with_registry!(
            Opts::new("tally_proposal_count", "Governance proposals created"),
            registry
        )?;

        let call_time_ms = register_histogram_with_registry!(
            HistogramOpts::new("tally_call_time_ms", "Call processing time in milliseconds")
                .buckets(prometheus::exponential_buckets(0.01, 2.0, 15)?),
            registry
        )?;

        Ok(Self {
            registry,
            calls_committed,
            calls_rejected,
            block_height,
            token_count,
            proposal_count,
            call_time_ms,
        })
    }

    /// Encode every registered metric in the text exposition format.
    pub fn encode_text(&self) -> Result<String, prometheus::Error> {
        let mut buf = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buf)?;
        String::from_utf8(buf).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
