/// Errors raised while wiring a page session together.
///
/// Once a session is running nothing here escapes to the page: transport
/// failures are logged and swallowed.
#[derive(Debug, thiserror::Error)]
pub enum BeaconError {
	/// The page origin or collection endpoint could not be parsed
	#[error("Invalid URL {input:?}: {source}")]
	InvalidUrl {
		input: String,
		#[source]
		source: url::ParseError,
	},

	/// The keep-alive HTTP client could not be built
	#[error("HTTP client error: {0}")]
	HttpClient(#[from] reqwest::Error),

	/// Batch could not be serialized to JSON
	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	/// The keep-alive transport needs a tokio runtime to spawn onto
	#[error("No tokio runtime available: {0}")]
	NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

pub type Result<T> = std::result::Result<T, BeaconError>;
