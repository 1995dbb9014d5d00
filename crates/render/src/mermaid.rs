use extract::{EntityKind, KnowledgeGraph};
use std::path::Path;
use tracing::info;

fn kind_style(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Company => "fill:#4A90E2,stroke:#333,stroke-width:2px",
        EntityKind::RiskFactor => "fill:#E24A4A,stroke:#333,stroke-width:2px",
        EntityKind::Amount => "fill:#4AE24A,stroke:#333,stroke-width:2px",
        EntityKind::Unknown => "fill:#E2E24A,stroke:#333,stroke-width:2px",
    }
}

/// Mermaid identifiers cannot carry spaces or hyphens; fold both into
/// underscores.
fn sanitize_id(id: &str) -> String {
    id.replace([' ', '-'], "_")
}

/// The `graph TD` flow-chart body: one node and one style declaration per
/// entity, one labeled edge per relationship. Edges are emitted whether or
/// not their endpoints resolve; Mermaid simply materializes unknown ids as
/// bare nodes.
pub fn flowchart(graph: &KnowledgeGraph) -> String {
    let mut lines = vec!["graph TD".to_string()];

    for entity in &graph.entities {
        let id = sanitize_id(&entity.id);
        let label = match &entity.value {
            Some(serde_json::Value::String(s)) => format!("{} ({s})", entity.name),
            Some(value) if !value.is_null() => format!("{} ({value})", entity.name),
            _ => entity.name.clone(),
        };
        lines.push(format!("    {id}[\"{label}\"]"));
        lines.push(format!("    style {id} {}", kind_style(entity.kind)));
    }

    for relationship in &graph.relationships {
        lines.push(format!(
            "    {} -->|{}| {}",
            sanitize_id(&relationship.source),
            relationship.label,
            sanitize_id(&relationship.target)
        ));
    }

    lines.join("\n")
}

/// The full markdown artifact: the flow chart in a ```mermaid fence plus the
/// entity/relationship counts.
pub fn document(graph: &KnowledgeGraph) -> String {
    format!(
        "# Financial Knowledge Graph (Mermaid)\n\n```mermaid\n{}\n```\n\n## Entities\n{} entities extracted\n\n## Relationships\n{} relationships extracted\n",
        flowchart(graph),
        graph.entities.len(),
        graph.relationships.len()
    )
}

pub fn save_document(graph: &KnowledgeGraph, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, document(graph))?;
    info!(path = %path.display(), "saved mermaid chart");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use extract::{Entity, Relationship};
    use serde_json::{Map, json};

    fn sample_graph() -> KnowledgeGraph {
        KnowledgeGraph {
            entities: vec![
                Entity {
                    id: "c1".to_string(),
                    kind: EntityKind::Company,
                    name: "Reliance Retail".to_string(),
                    value: None,
                    metadata: Map::new(),
                },
                Entity {
                    id: "c2".to_string(),
                    kind: EntityKind::Company,
                    name: "Hamleys".to_string(),
                    value: None,
                    metadata: Map::new(),
                },
            ],
            relationships: vec![Relationship {
                source: "c1".to_string(),
                target: "c2".to_string(),
                label: "OWNS".to_string(),
                metadata: Map::new(),
            }],
        }
    }

    #[test]
    fn flowchart_declares_nodes_and_labeled_edges() {
        let chart = flowchart(&sample_graph());
        assert!(chart.starts_with("graph TD"));
        assert!(chart.contains("    c1[\"Reliance Retail\"]"));
        assert!(chart.contains("    c2[\"Hamleys\"]"));
        assert!(chart.contains("    c1 -->|OWNS| c2"));
    }

    #[test]
    fn styles_are_keyed_by_kind() {
        let mut graph = sample_graph();
        graph.entities.push(Entity {
            id: "r1".to_string(),
            kind: EntityKind::RiskFactor,
            name: "Market volatility".to_string(),
            value: None,
            metadata: Map::new(),
        });
        let chart = flowchart(&graph);
        assert!(chart.contains("    style c1 fill:#4A90E2,stroke:#333,stroke-width:2px"));
        assert!(chart.contains("    style r1 fill:#E24A4A,stroke:#333,stroke-width:2px"));
    }

    #[test]
    fn identifiers_are_sanitized_for_mermaid_syntax() {
        let mut graph = sample_graph();
        graph.entities[0].id = "company reliance-retail".to_string();
        graph.relationships[0].source = "company reliance-retail".to_string();
        let chart = flowchart(&graph);
        assert!(chart.contains("    company_reliance_retail[\"Reliance Retail\"]"));
        assert!(chart.contains("    company_reliance_retail -->|OWNS| c2"));
    }

    #[test]
    fn values_are_appended_to_node_labels() {
        let mut graph = sample_graph();
        graph.entities.push(Entity {
            id: "a1".to_string(),
            kind: EntityKind::Amount,
            name: "Revenue 2023".to_string(),
            value: Some(json!("$2.5 billion")),
            metadata: Map::new(),
        });
        graph.entities.push(Entity {
            id: "a2".to_string(),
            kind: EntityKind::Amount,
            name: "Store count".to_string(),
            value: Some(json!(18774)),
            metadata: Map::new(),
        });
        let chart = flowchart(&graph);
        assert!(chart.contains("    a1[\"Revenue 2023 ($2.5 billion)\"]"));
        assert!(chart.contains("    a2[\"Store count (18774)\"]"));
    }

    #[test]
    fn document_is_fenced_and_counts_both_sequences() {
        let text = document(&sample_graph());
        assert!(text.contains("```mermaid\ngraph TD"));
        assert!(text.contains("\n```\n"));
        assert!(text.contains("2 entities extracted"));
        assert!(text.contains("1 relationships extracted"));
    }
}
