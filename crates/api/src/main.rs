use axum::{
    Json, Router,
    http::StatusCode,
    routing::{get, post},
};
use extract::{ClientConfig, CompletionClient, ExtractError, Extractor, KnowledgeGraph, Provider};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

#[derive(Serialize)]
struct HealthResponse {
    groq: &'static str,
    openai: &'static str,
}

#[derive(Deserialize)]
struct ExtractRequest {
    /// Path to the document on the server's filesystem.
    path: PathBuf,
    provider: Option<Provider>,
    api_key: Option<String>,
    /// Also return the Mermaid flow-chart text.
    #[serde(default)]
    mermaid: bool,
}

#[derive(Serialize)]
struct ExtractResponse {
    entities: usize,
    relationships: usize,
    graph: KnowledgeGraph,
    #[serde(skip_serializing_if = "Option::is_none")]
    mermaid: Option<String>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/extract", post(extract_document))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("failed to bind 0.0.0.0:3000");

    tracing::info!("server listening on http://localhost:3000");

    axum::serve(listener, app)
        .await
        .expect("server terminated");
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        groq: credential_status(Provider::Groq),
        openai: credential_status(Provider::OpenAi),
    })
}

fn credential_status(provider: Provider) -> &'static str {
    match std::env::var(provider.key_env()) {
        Ok(key) if !key.is_empty() => "configured",
        _ => "missing",
    }
}

/// One extraction per request; the client is built fresh each time so
/// concurrent requests share no state.
async fn extract_document(
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, (StatusCode, String)> {
    let provider = request.provider.unwrap_or(Provider::Groq);
    let config = ClientConfig::resolve(provider, request.api_key).map_err(error_response)?;
    let extractor = Extractor::new(CompletionClient::new(config));

    let graph = extractor
        .extract_file(&request.path)
        .await
        .map_err(error_response)?;

    let mermaid = request.mermaid.then(|| render::mermaid_document(&graph));

    Ok(Json(ExtractResponse {
        entities: graph.entities.len(),
        relationships: graph.relationships.len(),
        graph,
        mermaid,
    }))
}

fn error_response(err: ExtractError) -> (StatusCode, String) {
    let status = match &err {
        ExtractError::Configuration { .. } => StatusCode::BAD_REQUEST,
        ExtractError::Document { source, .. }
            if source.kind() == std::io::ErrorKind::NotFound =>
        {
            StatusCode::NOT_FOUND
        }
        ExtractError::Document { .. } => StatusCode::BAD_REQUEST,
        ExtractError::Transport { .. } | ExtractError::Parse { .. } => StatusCode::BAD_GATEWAY,
    };
    (status, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_onto_meaningful_statuses() {
        let config = error_response(ExtractError::Configuration {
            provider: "groq",
            env_var: "GROQ_API_KEY",
        });
        assert_eq!(config.0, StatusCode::BAD_REQUEST);

        let missing = error_response(ExtractError::Document {
            path: "absent.txt".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        assert_eq!(missing.0, StatusCode::NOT_FOUND);

        let transport = error_response(ExtractError::Transport {
            attempts: 3,
            reason: "rate limited".to_string(),
        });
        assert_eq!(transport.0, StatusCode::BAD_GATEWAY);
        assert!(transport.1.contains("after 3 attempts"));
    }

    #[test]
    fn extract_request_defaults_are_lenient() {
        let request: ExtractRequest =
            serde_json::from_str(r#"{"path": "report.txt"}"#).unwrap();
        assert_eq!(request.path, PathBuf::from("report.txt"));
        assert!(request.provider.is_none());
        assert!(request.api_key.is_none());
        assert!(!request.mermaid);
    }
}
