use std::net::SocketAddr;

use anyhow::{anyhow, Result};

/// One target host declared for the experiment.
///
/// `resolver` is the resolver the host is actually configured to use; it
/// is validated against the experiment's declared resolver before any
/// query is issued, and a mismatch skips the host.
#[derive(Debug, Clone)]
pub struct HostSpec {
	pub host_id: String,
	pub resolver: SocketAddr,
	pub domain_file: String,
}

/// Parse a resolver address string into a SocketAddr.
///
/// Supports formats:
///   "10.0.0.5"             -- IPv4, default port 53
///   "10.0.0.5:5353"        -- IPv4 with explicit port
///   "2606:4700::1111"      -- bare IPv6, default port 53
///   "[2606:4700::1111]:53" -- bracketed IPv6 with port
pub fn parse_resolver(input: &str) -> Result<SocketAddr> {
	let trimmed = input.trim();
	if trimmed.is_empty() {
		return Err(anyhow!("empty resolver address"));
	}

	let addr: SocketAddr = if trimmed.starts_with('[') {
		// Bracketed IPv6 with port: [::1]:53
		trimmed.parse()
			.map_err(|e| anyhow!("invalid bracketed IPv6 address '{}': {}", trimmed, e))?
	} else if trimmed.contains("::") || trimmed.matches(':').count() > 1 {
		// Bare IPv6 address without port
		let ip = trimmed.parse()
			.map_err(|e| anyhow!("invalid IPv6 address '{}': {}", trimmed, e))?;
		SocketAddr::new(ip, 53)
	} else if let Ok(addr) = trimmed.parse::<SocketAddr>() {
		// IPv4 with port (e.g. "10.0.0.5:5353")
		addr
	} else {
		// Plain IPv4 without port
		let ip = trimmed.parse()
			.map_err(|e| anyhow!("invalid IP address '{}': {}", trimmed, e))?;
		SocketAddr::new(ip, 53)
	};

	Ok(addr)
}

/// Parse one hosts-file line: "HOST_ID RESOLVER DOMAIN_FILE".
fn parse_host_line(line: &str) -> Result<HostSpec> {
	let fields: Vec<&str> = line.split_whitespace().collect();
	if fields.len() != 3 {
		return Err(anyhow!(
			"expected 'host_id resolver domain_file', got '{}'",
			line,
		));
	}
	Ok(HostSpec {
		host_id: fields[0].to_string(),
		resolver: parse_resolver(fields[1])?,
		domain_file: fields[2].to_string(),
	})
}

/// Read host declarations from a file, one per line.
///
/// Blank lines and lines starting with '#' are skipped.
pub fn read_hosts_file(path: &str) -> Result<Vec<HostSpec>> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read hosts file '{}': {}", path, e))?;
	let mut hosts = Vec::new();
	for line in content.lines() {
		let trimmed = line.trim();
		if trimmed.is_empty() || trimmed.starts_with('#') {
			continue;
		}
		hosts.push(parse_host_line(trimmed)?);
	}
	Ok(hosts)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_ipv4_no_port() {
		let addr = parse_resolver("10.0.0.5").unwrap();
		assert_eq!(addr.port(), 53);
		assert_eq!(addr.ip().to_string(), "10.0.0.5");
	}

	#[test]
	fn test_ipv4_with_port() {
		let addr = parse_resolver("10.0.0.5:5353").unwrap();
		assert_eq!(addr.port(), 5353);
	}

	#[test]
	fn test_ipv6_bare() {
		let addr = parse_resolver("2606:4700::1111").unwrap();
		assert_eq!(addr.port(), 53);
	}

	#[test]
	fn test_ipv6_bracketed() {
		let addr = parse_resolver("[2606:4700::1111]:53").unwrap();
		assert_eq!(addr.port(), 53);
	}

	#[test]
	fn test_invalid_input() {
		assert!(parse_resolver("not-an-ip").is_err());
		assert!(parse_resolver("").is_err());
	}

	#[test]
	fn test_host_line() {
		let spec = parse_host_line("h1 10.0.0.5 domains/h1.txt").unwrap();
		assert_eq!(spec.host_id, "h1");
		assert_eq!(spec.resolver.ip().to_string(), "10.0.0.5");
		assert_eq!(spec.domain_file, "domains/h1.txt");
	}

	#[test]
	fn test_host_line_wrong_arity() {
		assert!(parse_host_line("h1 10.0.0.5").is_err());
		assert!(parse_host_line("h1 10.0.0.5 a.txt extra").is_err());
	}

	#[test]
	fn test_read_hosts_file() {
		let dir = std::env::temp_dir().join("dns-cache-probe-hosts-test");
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("hosts.txt");
		std::fs::write(
			&path,
			"# experiment hosts\nh1 10.0.0.5 domains/h1.txt\n\nh2 10.0.0.5:53 domains/h2.txt\n",
		)
		.unwrap();

		let hosts = read_hosts_file(path.to_str().unwrap()).unwrap();
		assert_eq!(hosts.len(), 2);
		assert_eq!(hosts[0].host_id, "h1");
		assert_eq!(hosts[1].host_id, "h2");
	}
}
