use crate::schema::EntityKind;
use serde_json::Value;

/// Structural predicate over a parsed completion. Never panics and never
/// errors; anything that deviates from the graph shape is simply `false`.
pub fn validate(candidate: &Value) -> bool {
    let Some(map) = candidate.as_object() else {
        return false;
    };
    let (Some(entities), Some(relationships)) = (
        map.get("entities").and_then(Value::as_array),
        map.get("relationships").and_then(Value::as_array),
    ) else {
        return false;
    };

    entities.iter().all(valid_entity) && relationships.iter().all(valid_relationship)
}

fn valid_entity(entity: &Value) -> bool {
    let Some(map) = entity.as_object() else {
        return false;
    };
    map.contains_key("id")
        && map.contains_key("name")
        && map
            .get("type")
            .and_then(Value::as_str)
            .is_some_and(|kind| EntityKind::from_name(kind).is_some())
}

fn valid_relationship(relationship: &Value) -> bool {
    relationship.as_object().is_some_and(|map| {
        map.contains_key("source") && map.contains_key("target") && map.contains_key("type")
    })
}

/// Shallow repair: default a missing `entities` or `relationships` key to an
/// empty array and nothing else. Malformed records below the top level pass
/// through untouched — recovering the common forgot-a-key failure without
/// masking deeper corruption. A no-op on valid graphs and non-objects.
pub fn repair(candidate: &mut Value) {
    if let Some(map) = candidate.as_object_mut() {
        map.entry("entities").or_insert_with(|| Value::Array(vec![]));
        map.entry("relationships")
            .or_insert_with(|| Value::Array(vec![]));
    }
}
