mod classify;
mod cli;
mod config;
mod domains;
mod error;
mod executor;
mod host;
mod output;
mod record;
mod runner;
mod stats;
mod trace;

use std::time::{Duration, Instant};

use clap::Parser;

use crate::cli::Cli;
use crate::config::ExperimentConfig;
use crate::executor::DigExecutor;
use crate::host::HostSpec;
use crate::record::QueryRecord;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let cli = Cli::parse();
	let declared = host::parse_resolver(&cli.resolver)?;

	// Host declarations: a hosts file, or a single implicit host built
	// from --domains
	let specs: Vec<HostSpec> = if let Some(path) = &cli.hosts {
		host::read_hosts_file(path)?
	} else if let Some(path) = &cli.domains {
		vec![HostSpec {
			host_id: cli.host_id.clone(),
			resolver: declared,
			domain_file: path.clone(),
		}]
	} else {
		anyhow::bail!("either --hosts or --domains must be given");
	};

	// Load every host's domain list up front so file problems surface
	// before any query is issued
	let mut jobs: Vec<(HostSpec, Vec<String>)> = Vec::new();
	for spec in specs {
		let domain_list = domains::read_domain_file(&spec.domain_file)?;
		jobs.push((spec, domain_list));
	}

	let config = ExperimentConfig {
		trace_sample: cli.trace_sample,
		requery_cap: cli.requery_cap,
		hit_ratio: cli.hit_ratio,
		absolute_hit_ms: cli.absolute_hit_ms,
		timeout: Duration::from_millis(cli.timeout),
		trace_timeout: Duration::from_millis(cli.trace_timeout),
		phase_pause: Duration::from_millis(cli.phase_pause),
		requery_spacing: Duration::from_millis(cli.spacing),
	};

	output::print_config_summary(declared, jobs.len(), &config);

	let executor = DigExecutor::new();
	let started = Instant::now();
	let reports = runner::run_hosts(&executor, &jobs, declared, &config).await?;
	let elapsed = started.elapsed();

	output::print_results_table(&reports);

	// Overall rollup is a pure reduction over every host's records
	let all_records: Vec<QueryRecord> = reports
		.iter()
		.flat_map(|r| r.records.iter().cloned())
		.collect();
	let overall = stats::summarize(&all_records, None, elapsed);
	output::print_overall_summary(&overall);

	if let Some(path) = &cli.json_log {
		output::write_json_log(path, &all_records, &config)?;
	}
	if let Some(path) = &cli.output {
		output::write_csv(path, &reports)?;
	}

	Ok(())
}
