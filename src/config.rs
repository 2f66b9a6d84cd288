use std::time::Duration;

/// Experiment configuration passed into the runner.
///
/// The trace sample size, requery cap, and both cache-detection thresholds
/// are tunables, not constants: neither threshold is calibrated against any
/// particular resolver's cache-latency distribution.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
	/// Number of leading Phase-1 domains whose resolution path is traced.
	/// Tracing is expensive and deliberately sampled, not exhaustive.
	pub trace_sample: usize,
	/// Maximum number of Phase-1 successes to re-query in Phase 2
	pub requery_cap: usize,
	/// Requery counts as a cache hit when its RTT is strictly below
	/// `hit_ratio` times the Phase-1 baseline for the same domain
	pub hit_ratio: f64,
	/// Fallback threshold for unpaired measurements: a response under
	/// this many milliseconds is a probable hit
	pub absolute_hit_ms: f64,
	/// Per-query bound on the executor round trip
	pub timeout: Duration,
	/// Bound for traced lookups, which walk the full hierarchy
	pub trace_timeout: Duration,
	/// Settle pause between Phase 1 and Phase 2
	pub phase_pause: Duration,
	/// Spacing between consecutive Phase-2 requeries
	pub requery_spacing: Duration,
}

impl Default for ExperimentConfig {
	fn default() -> Self {
		ExperimentConfig {
			trace_sample: 10,
			requery_cap: 20,
			hit_ratio: 0.5,
			absolute_hit_ms: 5.0,
			timeout: Duration::from_millis(2000),
			trace_timeout: Duration::from_millis(3000),
			phase_pause: Duration::from_millis(500),
			requery_spacing: Duration::from_millis(50),
		}
	}
}
