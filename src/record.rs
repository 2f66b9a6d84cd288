use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Resolution hierarchy stage inferred from a trace.
///
/// The stage is a heuristic reading of dig-style trace output, not ground
/// truth: the first name-server listing is taken as the root referral, the
/// next as the TLD referral, and an address answer marks the authoritative
/// step. Anything seen before the first listing stays Unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
	Root,
	Tld,
	Authoritative,
	Unknown,
}

/// One server contacted during a traced resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionHop {
	/// IP literal of the server that answered
	pub server_address: String,
	/// Server name as reported in the trace; empty when unresolved
	pub server_name: String,
	pub stage: Stage,
	/// 0-based position in the trace; strictly increasing within one trace
	pub sequence_index: usize,
}

/// Which phase of the experiment a query belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
	/// Phase 1: first-time (cold) resolution
	Initial,
	/// Phase 2: repeat (warm) resolution of a Phase-1 success
	Requery,
}

/// Cache classification of a single query.
///
/// Initial-phase records are always NotApplicable; requery records are
/// always Hit or Miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CacheStatus {
	Hit,
	Miss,
	NotApplicable,
}

/// One resolution attempt. Immutable once created; the unit of truth that
/// flows from the runner into aggregation and persisted output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
	pub host_id: String,
	pub domain: String,
	pub phase: Phase,
	/// Address of the resolver the query was sent to
	pub dns_server: String,
	pub round_trip_ms: f64,
	/// Answer addresses, deduplicated, first-seen order preserved
	pub resolved_addresses: Vec<String>,
	pub success: bool,
	pub cache_status: CacheStatus,
	/// Non-empty only for traced queries
	pub hops: Vec<ResolutionHop>,
	pub timestamp: DateTime<Utc>,
}

/// Per-host (or whole-run) statistics rollup. Derived, never mutated in
/// place; recomputed from the record collection on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
	pub total: usize,
	pub successful: usize,
	pub failed: usize,
	pub avg_latency_ms: f64,
	pub min_latency_ms: f64,
	pub max_latency_ms: f64,
	pub throughput_qps: f64,
	pub cache_hits: usize,
	/// cache_hits / requery attempts, 0.0 when nothing was requeried
	pub cache_hit_rate: f64,
}

impl RunSummary {
	pub fn zero() -> Self {
		RunSummary {
			total: 0,
			successful: 0,
			failed: 0,
			avg_latency_ms: 0.0,
			min_latency_ms: 0.0,
			max_latency_ms: 0.0,
			throughput_qps: 0.0,
			cache_hits: 0,
			cache_hit_rate: 0.0,
		}
	}
}
