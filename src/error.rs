use thiserror::Error;

/// Failure taxonomy for the experiment pipeline.
///
/// Per-domain query failures are not errors at all: they are recorded as
/// unsuccessful QueryRecords and never propagate. Only the variants below
/// escape the per-domain loop, and of those only DataIntegrity and
/// ExecutorUnavailable terminate the run; ConfigMismatch skips one host.
#[derive(Debug, Error)]
pub enum ExperimentError {
	/// An impossible measurement reached the classifier, e.g. a
	/// non-positive round trip on a successful requery. A contract
	/// violation, surfaced loudly rather than coerced.
	#[error("data integrity violation: {0}")]
	DataIntegrity(String),

	/// A host's configured resolver does not match the resolver the
	/// experiment was declared against. The host is skipped.
	#[error("host {host}: configured resolver {configured} does not match declared resolver {declared}")]
	ConfigMismatch {
		host: String,
		declared: String,
		configured: String,
	},

	/// The query executor cannot run at all (e.g. the external tool is
	/// missing). Fatal: no query on any host can succeed.
	#[error("query executor unavailable: {0}")]
	ExecutorUnavailable(String),
}
