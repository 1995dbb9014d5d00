use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of one extraction run.
///
/// There is deliberately no schema variant: a completion that parses as JSON
/// but misses the graph shape is shallow-repaired and passed on rather than
/// failed (see `validate`).
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No usable credential for the selected provider. Fatal, never retried.
    #[error("{provider} API key not found: set {env_var} or pass an explicit key")]
    Configuration {
        provider: &'static str,
        env_var: &'static str,
    },

    /// The completion service could not be reached or kept answering with a
    /// non-success status; raised only after the retry budget is spent.
    #[error("completion request failed after {attempts} attempts: {reason}")]
    Transport { attempts: usize, reason: String },

    /// The normalized response is not the expected JSON. Not retried —
    /// re-sending the same prompt is unlikely to fix a malformed payload.
    #[error("completion response is not valid graph JSON ({source}); response begins: {excerpt}")]
    Parse {
        excerpt: String,
        #[source]
        source: serde_json::Error,
    },

    /// The input document could not be read (missing path, non-UTF-8 bytes).
    #[error("failed to read document {}", path.display())]
    Document {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
