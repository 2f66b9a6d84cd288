use crate::error::ExperimentError;
use crate::record::CacheStatus;

/// Classify a Phase-2 requery against its Phase-1 baseline.
///
/// Hit iff the requery is strictly faster than `hit_ratio` times the
/// baseline (default 0.5, i.e. at least a 2x speed-up). This is a timing
/// heuristic standing in for cache introspection; it prefers false
/// negatives under jitter over false positives.
///
/// A non-positive baseline is an undefined comparison and classifies as
/// Miss. A non-positive requery RTT cannot come from a successful
/// measurement and is a data-integrity error, not a classification.
pub fn classify_paired(
	initial_rtt_ms: f64,
	requery_rtt_ms: f64,
	hit_ratio: f64,
) -> Result<CacheStatus, ExperimentError> {
	if requery_rtt_ms <= 0.0 {
		return Err(ExperimentError::DataIntegrity(format!(
			"non-positive requery round trip: {} ms",
			requery_rtt_ms,
		)));
	}
	if initial_rtt_ms <= 0.0 {
		return Ok(CacheStatus::Miss);
	}
	if requery_rtt_ms < hit_ratio * initial_rtt_ms {
		Ok(CacheStatus::Hit)
	} else {
		Ok(CacheStatus::Miss)
	}
}

/// Fallback classifier for a measurement with no baseline.
///
/// Labels any response under the absolute threshold (default 5 ms) as a
/// probable hit. Weaker than the paired rule and kept separate from it:
/// callers must surface this as a "probable" label, never as a
/// CacheStatus on a requery record.
pub fn probable_hit_unpaired(rtt_ms: f64, absolute_hit_ms: f64) -> bool {
	rtt_ms > 0.0 && rtt_ms < absolute_hit_ms
}
