use clap::Parser;

/// DNS cache experiment harness
#[derive(Parser, Debug)]
#[command(name = "dns-cache-probe")]
#[command(about = "Measure DNS resolver caching via a two-phase cold/warm query experiment")]
pub struct Cli {
	/// Resolver address the experiment is declared against (e.g. 10.0.0.5)
	#[arg(short = 'r', long = "resolver", default_value = "127.0.0.1")]
	pub resolver: String,

	/// File of host declarations, one "host_id resolver domain_file" per line
	#[arg(long = "hosts")]
	pub hosts: Option<String>,

	/// Domain list file for a single-host run (used when --hosts is absent)
	#[arg(short = 'd', long = "domains")]
	pub domains: Option<String>,

	/// Host id for a single-host run
	#[arg(long = "host-id", default_value = "h1")]
	pub host_id: String,

	/// Number of leading Phase-1 domains to trace per host
	#[arg(long = "trace-sample", default_value = "10")]
	pub trace_sample: usize,

	/// Maximum number of Phase-1 successes to re-query in Phase 2
	#[arg(long = "requery-cap", default_value = "20")]
	pub requery_cap: usize,

	/// Requery counts as a hit below this fraction of the cold baseline
	#[arg(long = "hit-ratio", default_value = "0.5")]
	pub hit_ratio: f64,

	/// Absolute fallback threshold in ms for probable cache hits
	#[arg(long = "absolute-hit-ms", default_value = "5")]
	pub absolute_hit_ms: f64,

	/// Query timeout in milliseconds
	#[arg(short = 't', long = "timeout", default_value = "2000")]
	pub timeout: u64,

	/// Traced-lookup timeout in milliseconds
	#[arg(long = "trace-timeout", default_value = "3000")]
	pub trace_timeout: u64,

	/// Settle pause between Phase 1 and Phase 2 in milliseconds
	#[arg(long = "phase-pause", default_value = "500")]
	pub phase_pause: u64,

	/// Spacing between Phase-2 requeries in milliseconds
	#[arg(long = "spacing", default_value = "50")]
	pub spacing: u64,

	/// Output path for the detailed JSON query log
	#[arg(long = "json-log")]
	pub json_log: Option<String>,

	/// Output CSV file path for per-host summaries
	#[arg(short = 'o', long = "output")]
	pub output: Option<String>,
}
