use crate::record::{ResolutionHop, Stage};

/// Classification of one line of diagnostic trace output.
///
/// The trace text is free-form and line-oriented with no guaranteed
/// schema; every line falls into exactly one of these shapes and
/// everything unrecognized is Other (skipped, never an error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceLine {
	/// A delegation listing ("IN NS ...") naming the servers for the
	/// next step of the hierarchy
	NameServerListing,
	/// An address answer ("IN A ...") terminating the walk
	AddressAnswer,
	/// Evidence that a server was actually contacted:
	/// "Received N bytes from ADDRESS#PORT(NAME) in T ms"
	ServerContact { address: String, name: String },
	Other,
}

/// Classify a single line of trace output.
pub fn classify_line(line: &str) -> TraceLine {
	if let Some(contact) = parse_contact(line) {
		return contact;
	}
	if line.contains("IN\tNS") || line.contains(" IN NS ") {
		return TraceLine::NameServerListing;
	}
	if line.contains("IN\tA\t") || line.contains(" IN A ") {
		return TraceLine::AddressAnswer;
	}
	TraceLine::Other
}

/// Extract ADDRESS and NAME from a server-contact line, e.g.
/// ";; Received 525 bytes from 192.5.5.241#53(f.root-servers.net) in 45 ms".
/// The "(NAME)" part may be missing; the address ends at '#', ')',
/// or whitespace, whichever comes first.
fn parse_contact(line: &str) -> Option<TraceLine> {
	if !line.contains("Received") || !line.contains("bytes from") {
		return None;
	}
	let rest = line.split("bytes from").nth(1)?.trim_start();

	let address: String = rest
		.chars()
		.take_while(|c| !matches!(c, '#' | '(' | ')') && !c.is_whitespace())
		.collect();
	if address.is_empty() {
		return None;
	}

	let name = match (rest.find('('), rest.find(')')) {
		(Some(open), Some(close)) if open < close => rest[open + 1..close].to_string(),
		_ => String::new(),
	};

	Some(TraceLine::ServerContact { address, name })
}

/// Stage transition function for the trace walk.
///
/// Explicit three-state machine: the first delegation listing moves
/// Unknown to Root, the next moves Root to Tld, and an address answer
/// moves any established stage to Authoritative. Transitions only ever
/// advance; repeated listings past Tld and answers before any listing
/// leave the stage unchanged.
pub fn next_stage(current: Stage, line: &TraceLine) -> Stage {
	match (current, line) {
		(Stage::Unknown, TraceLine::NameServerListing) => Stage::Root,
		(Stage::Root, TraceLine::NameServerListing) => Stage::Tld,
		(s, TraceLine::AddressAnswer) if s != Stage::Unknown => Stage::Authoritative,
		(s, _) => s,
	}
}

/// Parse a full diagnostic trace into an ordered hop sequence.
///
/// Scans lines in order, advancing the stage cursor per next_stage, and
/// appends a hop for every server-contact line whose address has not been
/// seen before in this trace (first sighting wins). Malformed or empty
/// input yields an empty sequence; nothing here fails the pipeline.
pub fn parse_trace(raw_text: &str) -> Vec<ResolutionHop> {
	let mut stage = Stage::Unknown;
	let mut hops: Vec<ResolutionHop> = Vec::new();

	for line in raw_text.lines() {
		let classified = classify_line(line);
		stage = next_stage(stage, &classified);

		if let TraceLine::ServerContact { address, name } = classified {
			let already_seen = hops.iter().any(|h| h.server_address == address);
			if !already_seen {
				hops.push(ResolutionHop {
					server_address: address,
					server_name: name,
					stage,
					sequence_index: hops.len(),
				});
			}
		}
	}

	hops
}
