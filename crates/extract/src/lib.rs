pub mod config;
pub mod error;
pub mod llm;
pub mod normalizer;
pub mod prompt;
pub mod retry;
pub mod schema;
pub mod validate;

pub use config::{ClientConfig, Provider};
pub use error::ExtractError;
pub use llm::CompletionClient;
pub use retry::RetryPolicy;
pub use schema::{Entity, EntityKind, KnowledgeGraph, Relationship};

use serde_json::Value;
use std::path::Path;
use tracing::{info, warn};

/// How much of a malformed response a parse error carries for diagnosis.
const PARSE_EXCERPT_CHARS: usize = 500;

/// The whole document rides inside the prompt, so reads are capped rather
/// than streamed.
const MAX_DOCUMENT_BYTES: usize = 512 * 1024;

/// One document in, one validated graph out. Each extraction run owns its
/// client; concurrent runs get independent `Extractor`s and share nothing.
pub struct Extractor {
    client: CompletionClient,
}

impl Extractor {
    pub fn new(client: CompletionClient) -> Self {
        Self { client }
    }

    /// Read the document at `path` and extract its knowledge graph.
    pub async fn extract_file(&self, path: &Path) -> Result<KnowledgeGraph, ExtractError> {
        let text =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| ExtractError::Document {
                    path: path.to_path_buf(),
                    source,
                })?;
        if text.len() > MAX_DOCUMENT_BYTES {
            return Err(ExtractError::Document {
                path: path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!(
                        "document is {} bytes, over the {MAX_DOCUMENT_BYTES} byte prompt ceiling",
                        text.len()
                    ),
                ),
            });
        }
        info!(path = %path.display(), chars = text.len(), "read document");
        self.extract_text(&text).await
    }

    /// Extract from in-memory document text: prompt, complete, normalize,
    /// parse, validate (with shallow repair), and type the result.
    pub async fn extract_text(&self, text: &str) -> Result<KnowledgeGraph, ExtractError> {
        let provider = self.client.config().provider;
        info!(
            provider = provider.name(),
            model = provider.model(),
            "extracting entities and relationships"
        );

        let prompt = prompt::build_extraction_prompt(text);
        let raw = self.client.complete(&prompt).await?;
        let cleaned = normalizer::normalize(&raw);

        let mut candidate: Value =
            serde_json::from_str(cleaned).map_err(|source| ExtractError::Parse {
                excerpt: excerpt(cleaned),
                source,
            })?;

        if !validate::validate(&candidate) {
            warn!("response does not match the graph schema, applying shallow repair");
            validate::repair(&mut candidate);
        }

        let graph: KnowledgeGraph =
            serde_json::from_value(candidate).map_err(|source| ExtractError::Parse {
                excerpt: excerpt(cleaned),
                source,
            })?;

        info!(
            entities = graph.entities.len(),
            relationships = graph.relationships.len(),
            "extraction complete"
        );
        Ok(graph)
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(PARSE_EXCERPT_CHARS).collect()
}
