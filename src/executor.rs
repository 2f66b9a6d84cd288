use std::net::SocketAddr;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;

use crate::error::ExperimentError;

/// Result of one resolution attempt as seen at the adapter boundary.
/// The pipeline never looks past this: no resolver internals, no wire
/// format, only the adapter's textual output and measurements.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct QueryOutcome {
	/// Raw diagnostic text produced by the external tool
	pub raw_text: String,
	pub round_trip_ms: f64,
	/// Answer addresses, deduplicated, first-seen order
	pub resolved_addresses: Vec<String>,
	pub success: bool,
}

impl QueryOutcome {
	/// Outcome for an attempt that produced no usable answer.
	pub fn failed(elapsed_ms: f64) -> Self {
		QueryOutcome {
			raw_text: String::new(),
			round_trip_ms: elapsed_ms,
			resolved_addresses: Vec::new(),
			success: false,
		}
	}
}

/// Adapter boundary for issuing resolution requests.
///
/// `execute` performs one plain lookup against the given resolver;
/// `trace` performs one full-hierarchy traced lookup and returns the raw
/// diagnostic text for the trace parser. Individual failures come back as
/// unsuccessful outcomes; only total unavailability of the underlying
/// tool is an Err.
#[allow(async_fn_in_trait)]
pub trait QueryExecutor {
	async fn execute(
		&self,
		domain: &str,
		resolver: SocketAddr,
		timeout: Duration,
	) -> Result<QueryOutcome, ExperimentError>;

	async fn trace(&self, domain: &str, timeout: Duration) -> Result<String, ExperimentError>;
}

/// Query executor backed by the `dig` command-line tool.
#[derive(Debug, Clone)]
pub struct DigExecutor {
	binary: String,
}

impl DigExecutor {
	pub fn new() -> Self {
		DigExecutor { binary: "dig".to_string() }
	}

	async fn run(&self, args: &[String], timeout: Duration) -> Result<Option<(String, f64)>, ExperimentError> {
		let mut cmd = Command::new(&self.binary);
		cmd.args(args).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::null());

		let start = Instant::now();
		// Grace period on top of dig's own +time budget so dig normally
		// times out first and still prints its diagnostics
		let bound = timeout + Duration::from_millis(500);
		match tokio::time::timeout(bound, cmd.output()).await {
			Ok(Ok(output)) => {
				let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
				let text = String::from_utf8_lossy(&output.stdout).into_owned();
				Ok(Some((text, elapsed_ms)))
			}
			Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
				Err(ExperimentError::ExecutorUnavailable(format!(
					"cannot run '{}': {}",
					self.binary, e,
				)))
			}
			// Spawn error or bound exceeded: a failed attempt, not fatal
			Ok(Err(_)) | Err(_) => Ok(None),
		}
	}
}

impl Default for DigExecutor {
	fn default() -> Self {
		Self::new()
	}
}

impl QueryExecutor for DigExecutor {
	async fn execute(
		&self,
		domain: &str,
		resolver: SocketAddr,
		timeout: Duration,
	) -> Result<QueryOutcome, ExperimentError> {
		let mut args = vec![
			format!("@{}", resolver.ip()),
			format!("+time={}", timeout.as_secs().max(1)),
			"+tries=1".to_string(),
		];
		if resolver.port() != 53 {
			args.push("-p".to_string());
			args.push(resolver.port().to_string());
		}
		args.push(domain.to_string());

		let start = Instant::now();
		let Some((text, wall_ms)) = self.run(&args, timeout).await? else {
			return Ok(QueryOutcome::failed(start.elapsed().as_secs_f64() * 1000.0));
		};

		let success = is_successful_answer(&text);
		// dig rounds sub-millisecond answers down to "0 msec"; fall back
		// to the wall clock so a successful measurement is always positive
		let round_trip_ms = parse_query_time_ms(&text)
			.filter(|t| *t > 0.0)
			.unwrap_or(wall_ms);
		let resolved_addresses = parse_answer_addresses(&text);

		Ok(QueryOutcome {
			raw_text: text,
			round_trip_ms,
			resolved_addresses,
			success,
		})
	}

	async fn trace(&self, domain: &str, timeout: Duration) -> Result<String, ExperimentError> {
		let args = vec![
			"+trace".to_string(),
			"+tries=1".to_string(),
			format!("+time={}", timeout.as_secs().max(1)),
			domain.to_string(),
		];
		// A traced walk contacts several servers; allow one timeout per
		// expected step of the hierarchy
		let bound = timeout * 4;
		match self.run(&args, bound).await? {
			Some((text, _)) => Ok(text),
			None => Ok(String::new()),
		}
	}
}

/// Whether dig output represents a successful resolution: an answer
/// section present and no NXDOMAIN/SERVFAIL status.
pub fn is_successful_answer(text: &str) -> bool {
	text.contains("ANSWER SECTION") && !text.contains("NXDOMAIN") && !text.contains("SERVFAIL")
}

/// Extract the server-reported round trip from ";; Query time: N msec".
pub fn parse_query_time_ms(text: &str) -> Option<f64> {
	let idx = text.find("Query time:")?;
	let rest = &text[idx + "Query time:".len()..];
	rest.split_whitespace().next()?.parse().ok()
}

/// Extract A-record addresses from the answer section, deduplicated,
/// first-seen order preserved.
pub fn parse_answer_addresses(text: &str) -> Vec<String> {
	let Some(idx) = text.find("ANSWER SECTION:") else {
		return Vec::new();
	};

	let mut addresses: Vec<String> = Vec::new();
	for line in text[idx..].lines().skip(1) {
		if line.trim().is_empty() {
			break;
		}
		// name ttl class type rdata
		let fields: Vec<&str> = line.split_whitespace().collect();
		if fields.len() >= 5 && fields[2] == "IN" && fields[3] == "A" {
			let addr = fields[4];
			if addr.parse::<std::net::Ipv4Addr>().is_ok()
				&& !addresses.iter().any(|a| a == addr)
			{
				addresses.push(addr.to_string());
			}
		}
	}
	addresses
}

#[cfg(test)]
mod tests {
	use super::*;

	const DIG_SUCCESS: &str = "\
; <<>> DiG 9.18.12 <<>> @10.0.0.5 +time=2 +tries=1 example.com\n\
;; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 12345\n\
\n\
;; ANSWER SECTION:\n\
example.com.\t\t287\tIN\tA\t93.184.216.34\n\
example.com.\t\t287\tIN\tA\t93.184.216.34\n\
example.com.\t\t287\tIN\tA\t93.184.215.14\n\
\n\
;; Query time: 42 msec\n\
;; SERVER: 10.0.0.5#53(10.0.0.5)\n";

	const DIG_NXDOMAIN: &str = "\
; <<>> DiG 9.18.12 <<>> @10.0.0.5 nosuch.example\n\
;; ->>HEADER<<- opcode: QUERY, status: NXDOMAIN, id: 4711\n\
;; Query time: 18 msec\n";

	#[test]
	fn test_success_detection() {
		assert!(is_successful_answer(DIG_SUCCESS));
		assert!(!is_successful_answer(DIG_NXDOMAIN));
		assert!(!is_successful_answer(""));
	}

	#[test]
	fn test_servfail_is_failure() {
		let text = ";; ANSWER SECTION:\n;; status: SERVFAIL\n";
		assert!(!is_successful_answer(text));
	}

	#[test]
	fn test_query_time_extraction() {
		assert_eq!(parse_query_time_ms(DIG_SUCCESS), Some(42.0));
		assert_eq!(parse_query_time_ms("no timing here"), None);
	}

	#[test]
	fn test_answer_addresses_deduplicated_in_order() {
		let addresses = parse_answer_addresses(DIG_SUCCESS);
		assert_eq!(addresses, vec!["93.184.216.34", "93.184.215.14"]);
	}

	#[test]
	fn test_answer_addresses_absent_section() {
		assert!(parse_answer_addresses(DIG_NXDOMAIN).is_empty());
	}

	#[test]
	fn test_answer_addresses_skips_non_a_records() {
		let text = "\
;; ANSWER SECTION:\n\
example.com.\t300\tIN\tCNAME\twww.example.com.\n\
www.example.com.\t300\tIN\tA\t203.0.113.9\n\
\n";
		assert_eq!(parse_answer_addresses(text), vec!["203.0.113.9"]);
	}

	#[test]
	fn test_failed_outcome_shape() {
		let outcome = QueryOutcome::failed(2000.0);
		assert!(!outcome.success);
		assert!(outcome.resolved_addresses.is_empty());
		assert_eq!(outcome.round_trip_ms, 2000.0);
	}
}
