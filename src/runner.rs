use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use chrono::Utc;

use crate::classify::classify_paired;
use crate::config::ExperimentConfig;
use crate::error::ExperimentError;
use crate::executor::QueryExecutor;
use crate::host::HostSpec;
use crate::record::{CacheStatus, Phase, QueryRecord, RunSummary};
use crate::stats::summarize;
use crate::trace::parse_trace;

/// Per-host run states. The run only ever moves forward; Reported is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
	Idle,
	ResolvingConfig,
	Phase1Running,
	Phase1Done,
	Phase2Running,
	Phase2Done,
	Reported,
}

impl RunState {
	pub fn advance(self) -> RunState {
		match self {
			RunState::Idle => RunState::ResolvingConfig,
			RunState::ResolvingConfig => RunState::Phase1Running,
			RunState::Phase1Running => RunState::Phase1Done,
			RunState::Phase1Done => RunState::Phase2Running,
			RunState::Phase2Running => RunState::Phase2Done,
			RunState::Phase2Done => RunState::Reported,
			RunState::Reported => RunState::Reported,
		}
	}
}

/// Immutable result of one host's run. Each host produces its own report;
/// overall totals are a pure reduction over the collected reports, never
/// a shared accumulator.
#[derive(Debug, Clone)]
pub struct HostReport {
	pub host_id: String,
	/// Reason the host was skipped before any query was issued
	pub skipped: Option<String>,
	pub records: Vec<QueryRecord>,
	pub phase1: RunSummary,
	pub phase2: RunSummary,
	pub elapsed: Duration,
}

impl HostReport {
	fn skipped(host_id: &str, reason: String) -> Self {
		HostReport {
			host_id: host_id.to_string(),
			skipped: Some(reason),
			records: Vec::new(),
			phase1: RunSummary::zero(),
			phase2: RunSummary::zero(),
			elapsed: Duration::ZERO,
		}
	}
}

/// Run the two-phase protocol for a single host.
///
/// Phase 1 resolves every domain once, in list order, tracing only the
/// first `trace_sample` lookups. Phase 2 re-queries a bounded prefix of
/// the Phase-1 successes and classifies each against its cold baseline.
/// Domains are processed strictly sequentially so latency measurements
/// are free of queueing effects on the executor side.
///
/// Individual query failures are recorded, never raised. A resolver
/// mismatch skips the host (returned as a skipped report). Only executor
/// unavailability and data-integrity violations are Err.
pub async fn run_host<E: QueryExecutor>(
	executor: &E,
	spec: &HostSpec,
	declared_resolver: SocketAddr,
	domains: &[String],
	config: &ExperimentConfig,
) -> Result<HostReport, ExperimentError> {
	let mut state = RunState::Idle;
	state = state.advance();
	debug_assert_eq!(state, RunState::ResolvingConfig);

	if spec.resolver != declared_resolver {
		let reason = ExperimentError::ConfigMismatch {
			host: spec.host_id.clone(),
			declared: declared_resolver.to_string(),
			configured: spec.resolver.to_string(),
		};
		println!("[{}] skipped: {}", spec.host_id, reason);
		return Ok(HostReport::skipped(&spec.host_id, reason.to_string()));
	}

	let resolver = spec.resolver;
	let started = Instant::now();
	let mut records: Vec<QueryRecord> = Vec::new();
	let mut baselines: HashMap<String, f64> = HashMap::new();
	let mut successful_domains: Vec<String> = Vec::new();

	state = state.advance();
	debug_assert_eq!(state, RunState::Phase1Running);
	println!("[{}] Phase 1: resolving {} domains...", spec.host_id, domains.len());

	for (idx, domain) in domains.iter().enumerate() {
		let hops = if idx < config.trace_sample {
			let raw = executor.trace(domain, config.trace_timeout).await?;
			parse_trace(&raw)
		} else {
			Vec::new()
		};

		let outcome = executor.execute(domain, resolver, config.timeout).await?;

		if outcome.success {
			baselines.insert(domain.clone(), outcome.round_trip_ms);
			successful_domains.push(domain.clone());
		}

		// Records are committed whole: the record is pushed only once
		// fully built, so a cancelled run never exposes a partial one
		records.push(QueryRecord {
			host_id: spec.host_id.clone(),
			domain: domain.clone(),
			phase: Phase::Initial,
			dns_server: resolver.ip().to_string(),
			round_trip_ms: outcome.round_trip_ms,
			resolved_addresses: outcome.resolved_addresses,
			success: outcome.success,
			cache_status: CacheStatus::NotApplicable,
			hops,
			timestamp: Utc::now(),
		});

		if (idx + 1) % 25 == 0 {
			println!(
				"  [{}] progress: {}/{} ({} ok, {} failed)",
				spec.host_id,
				idx + 1,
				domains.len(),
				successful_domains.len(),
				idx + 1 - successful_domains.len(),
			);
		}
	}

	let phase1_elapsed = started.elapsed();
	state = state.advance();
	debug_assert_eq!(state, RunState::Phase1Done);

	// Let the resolver settle before probing its cache
	if !config.phase_pause.is_zero() {
		tokio::time::sleep(config.phase_pause).await;
	}

	state = state.advance();
	debug_assert_eq!(state, RunState::Phase2Running);

	let requery_count = config.requery_cap.min(successful_domains.len());
	println!("[{}] Phase 2: re-querying {} domains...", spec.host_id, requery_count);

	let phase2_started = Instant::now();
	for domain in &successful_domains[..requery_count] {
		if !config.requery_spacing.is_zero() {
			tokio::time::sleep(config.requery_spacing).await;
		}

		let outcome = executor.execute(domain, resolver, config.timeout).await?;

		let cache_status = if outcome.success {
			// Only Phase-1 successes are requeried, so a baseline exists
			let baseline = baselines.get(domain).copied().unwrap_or(0.0);
			classify_paired(baseline, outcome.round_trip_ms, config.hit_ratio)?
		} else {
			// A failed requery cannot have been served from cache
			CacheStatus::Miss
		};

		records.push(QueryRecord {
			host_id: spec.host_id.clone(),
			domain: domain.clone(),
			phase: Phase::Requery,
			dns_server: resolver.ip().to_string(),
			round_trip_ms: outcome.round_trip_ms,
			resolved_addresses: outcome.resolved_addresses,
			success: outcome.success,
			cache_status,
			hops: Vec::new(),
			timestamp: Utc::now(),
		});
	}

	let phase2_elapsed = phase2_started.elapsed();
	state = state.advance();
	debug_assert_eq!(state, RunState::Phase2Done);

	let phase1 = summarize(&records, Some(Phase::Initial), phase1_elapsed);
	let phase2 = summarize(&records, Some(Phase::Requery), phase2_elapsed);

	state = state.advance();
	debug_assert_eq!(state, RunState::Reported);

	println!(
		"[{}] done: {}/{} resolved, {}/{} cache hits",
		spec.host_id, phase1.successful, phase1.total, phase2.cache_hits, phase2.total,
	);

	Ok(HostReport {
		host_id: spec.host_id.clone(),
		skipped: None,
		records,
		phase1,
		phase2,
		elapsed: started.elapsed(),
	})
}

/// Run all hosts, one after another.
///
/// Hosts are processed strictly sequentially: one host's Phase 1 and 2
/// complete before the next host starts, so trace output stays
/// attributable to a single host at a time.
pub async fn run_hosts<E: QueryExecutor>(
	executor: &E,
	jobs: &[(HostSpec, Vec<String>)],
	declared_resolver: SocketAddr,
	config: &ExperimentConfig,
) -> Result<Vec<HostReport>, ExperimentError> {
	let mut reports = Vec::new();
	for (spec, domains) in jobs {
		let report = run_host(executor, spec, declared_resolver, domains, config).await?;
		reports.push(report);
	}
	Ok(reports)
}
