use anyhow::{anyhow, Result};

/// Whether a captured name is usable as an experiment target.
///
/// Drops mDNS/service-discovery noise and single labels: no `.local`
/// suffix, no leading-underscore label, and at least one dot. Downstream
/// consumers trust this filter and do not re-validate.
pub fn is_valid_domain(domain: &str) -> bool {
	let d = domain.to_lowercase();
	if d.ends_with(".local") {
		return false;
	}
	if d.starts_with('_') {
		return false;
	}
	if !d.contains('.') {
		return false;
	}
	true
}

/// Read a domain list from a file, one per line, in file order.
///
/// Blank lines and lines starting with '#' are skipped, as are names
/// rejected by is_valid_domain. Order is preserved; the runner issues
/// queries strictly in list order.
pub fn read_domain_file(path: &str) -> Result<Vec<String>> {
	let content = std::fs::read_to_string(path)
		.map_err(|e| anyhow!("failed to read domain file '{}': {}", path, e))?;
	let domains: Vec<String> = content
		.lines()
		.map(|line| line.trim().to_string())
		.filter(|line| !line.is_empty() && !line.starts_with('#'))
		.filter(|line| is_valid_domain(line))
		.collect();
	Ok(domains)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_valid_domains() {
		assert!(is_valid_domain("example.com"));
		assert!(is_valid_domain("a.b.c.example.org"));
		assert!(is_valid_domain("xn--nxasmq6b.example"));
	}

	#[test]
	fn test_rejects_local_suffix() {
		assert!(!is_valid_domain("printer.local"));
		assert!(!is_valid_domain("Printer.LOCAL"));
	}

	#[test]
	fn test_rejects_underscore_label() {
		assert!(!is_valid_domain("_dns-sd.example.com"));
	}

	#[test]
	fn test_rejects_single_label() {
		assert!(!is_valid_domain("localhost"));
		assert!(!is_valid_domain(""));
	}

	#[test]
	fn test_read_domain_file_filters_and_preserves_order() {
		let dir = std::env::temp_dir().join("dns-cache-probe-domains-test");
		std::fs::create_dir_all(&dir).unwrap();
		let path = dir.join("domains.txt");
		std::fs::write(
			&path,
			"# comment\nexample.com\n\nprinter.local\n_svc.example.org\ntest.org\n",
		)
		.unwrap();

		let domains = read_domain_file(path.to_str().unwrap()).unwrap();
		assert_eq!(domains, vec!["example.com", "test.org"]);
	}

	#[test]
	fn test_read_domain_file_missing() {
		assert!(read_domain_file("/nonexistent/domains.txt").is_err());
	}
}
