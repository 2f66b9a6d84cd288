use std::time::Duration;

use crate::record::{CacheStatus, Phase, QueryRecord, RunSummary};

/// Calculate the arithmetic mean of a slice of values.
pub fn mean(values: &[f64]) -> Option<f64> {
	if values.is_empty() {
		return None;
	}
	let sum: f64 = values.iter().sum();
	Some(sum / values.len() as f64)
}

fn min(values: &[f64]) -> Option<f64> {
	values.iter().copied().reduce(f64::min)
}

fn max(values: &[f64]) -> Option<f64> {
	values.iter().copied().reduce(f64::max)
}

/// Reduce a record collection to a RunSummary.
///
/// Pure function of its inputs: the same records and elapsed time always
/// produce the same summary. `phase_filter` restricts the view to one
/// phase; None summarizes everything. Latency statistics cover successful
/// records only; the cache-hit rate covers requery records only. All
/// zero-record and zero-sample cases report 0, never NaN or an error.
pub fn summarize(
	records: &[QueryRecord],
	phase_filter: Option<Phase>,
	elapsed: Duration,
) -> RunSummary {
	let selected: Vec<&QueryRecord> = records
		.iter()
		.filter(|r| phase_filter.map_or(true, |p| r.phase == p))
		.collect();

	let total = selected.len();
	let successful = selected.iter().filter(|r| r.success).count();
	let failed = total - successful;

	let latencies: Vec<f64> = selected
		.iter()
		.filter(|r| r.success)
		.map(|r| r.round_trip_ms)
		.collect();

	let elapsed_s = elapsed.as_secs_f64();
	let throughput_qps = if elapsed_s > 0.0 && total > 0 {
		total as f64 / elapsed_s
	} else {
		0.0
	};

	let requery_count = selected
		.iter()
		.filter(|r| r.phase == Phase::Requery)
		.count();
	let cache_hits = selected
		.iter()
		.filter(|r| r.phase == Phase::Requery && r.cache_status == CacheStatus::Hit)
		.count();
	let cache_hit_rate = if requery_count == 0 {
		0.0
	} else {
		cache_hits as f64 / requery_count as f64
	};

	RunSummary {
		total,
		successful,
		failed,
		avg_latency_ms: mean(&latencies).unwrap_or(0.0),
		min_latency_ms: min(&latencies).unwrap_or(0.0),
		max_latency_ms: max(&latencies).unwrap_or(0.0),
		throughput_qps,
		cache_hits,
		cache_hit_rate,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use chrono::Utc;

	fn record(
		domain: &str,
		phase: Phase,
		rtt: f64,
		success: bool,
		cache_status: CacheStatus,
	) -> QueryRecord {
		QueryRecord {
			host_id: "h1".to_string(),
			domain: domain.to_string(),
			phase,
			dns_server: "10.0.0.5".to_string(),
			round_trip_ms: rtt,
			resolved_addresses: vec!["203.0.113.1".to_string()],
			success,
			cache_status,
			hops: Vec::new(),
			timestamp: Utc::now(),
		}
	}

	#[test]
	fn test_empty_records_all_zero() {
		let summary = summarize(&[], None, Duration::from_secs(1));
		assert_eq!(summary, RunSummary::zero());
	}

	#[test]
	fn test_counts_sum_correctly() {
		let records = vec![
			record("a.com", Phase::Initial, 40.0, true, CacheStatus::NotApplicable),
			record("b.org", Phase::Initial, 0.0, false, CacheStatus::NotApplicable),
			record("c.net", Phase::Initial, 25.0, true, CacheStatus::NotApplicable),
		];
		let summary = summarize(&records, Some(Phase::Initial), Duration::from_secs(3));
		assert_eq!(summary.total, 3);
		assert_eq!(summary.successful, 2);
		assert_eq!(summary.failed, 1);
		assert_eq!(summary.successful + summary.failed, summary.total);
		assert_eq!(summary.throughput_qps, 1.0);
	}

	#[test]
	fn test_latency_stats_over_successes_only() {
		let records = vec![
			record("a.com", Phase::Initial, 10.0, true, CacheStatus::NotApplicable),
			record("b.org", Phase::Initial, 30.0, true, CacheStatus::NotApplicable),
			// Failed record latency must not leak into the stats
			record("c.net", Phase::Initial, 2000.0, false, CacheStatus::NotApplicable),
		];
		let summary = summarize(&records, Some(Phase::Initial), Duration::from_secs(1));
		assert_eq!(summary.avg_latency_ms, 20.0);
		assert_eq!(summary.min_latency_ms, 10.0);
		assert_eq!(summary.max_latency_ms, 30.0);
	}

	#[test]
	fn test_all_failed_latency_stats_zero() {
		let records = vec![
			record("a.com", Phase::Initial, 2000.0, false, CacheStatus::NotApplicable),
		];
		let summary = summarize(&records, None, Duration::from_secs(2));
		assert_eq!(summary.avg_latency_ms, 0.0);
		assert_eq!(summary.min_latency_ms, 0.0);
		assert_eq!(summary.max_latency_ms, 0.0);
		assert_eq!(summary.failed, 1);
	}

	#[test]
	fn test_cache_hit_rate_over_requeries_only() {
		// Two-domain scenario: 40ms/55ms cold, then 3ms (hit) and 50ms (miss)
		let records = vec![
			record("example.com", Phase::Initial, 40.0, true, CacheStatus::NotApplicable),
			record("test.org", Phase::Initial, 55.0, true, CacheStatus::NotApplicable),
			record("example.com", Phase::Requery, 3.0, true, CacheStatus::Hit),
			record("test.org", Phase::Requery, 50.0, true, CacheStatus::Miss),
		];
		let summary = summarize(&records, None, Duration::from_secs(1));
		assert_eq!(summary.cache_hits, 1);
		assert_eq!(summary.cache_hit_rate, 0.5);

		// Restricting to Phase 1 drops the requeries entirely
		let phase1 = summarize(&records, Some(Phase::Initial), Duration::from_secs(1));
		assert_eq!(phase1.cache_hits, 0);
		assert_eq!(phase1.cache_hit_rate, 0.0);
	}

	#[test]
	fn test_no_requeries_rate_is_zero() {
		let records = vec![
			record("a.com", Phase::Initial, 40.0, true, CacheStatus::NotApplicable),
		];
		let summary = summarize(&records, None, Duration::from_secs(1));
		assert_eq!(summary.cache_hit_rate, 0.0);
	}

	#[test]
	fn test_zero_elapsed_throughput_zero() {
		let records = vec![
			record("a.com", Phase::Initial, 40.0, true, CacheStatus::NotApplicable),
		];
		let summary = summarize(&records, None, Duration::ZERO);
		assert_eq!(summary.throughput_qps, 0.0);
	}

	#[test]
	fn test_summarize_idempotent() {
		let records = vec![
			record("a.com", Phase::Initial, 12.5, true, CacheStatus::NotApplicable),
			record("b.org", Phase::Requery, 4.0, true, CacheStatus::Hit),
		];
		let first = summarize(&records, None, Duration::from_secs(2));
		let second = summarize(&records, None, Duration::from_secs(2));
		assert_eq!(first, second);
	}
}
