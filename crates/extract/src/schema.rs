use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Entity kinds the extractor asks the model for.
///
/// `Unknown` catches any kind string the completion service invents so a
/// drifting response still reaches the renderers (which give it the fallback
/// color) instead of aborting the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum EntityKind {
    Company,
    RiskFactor,
    Amount,
    Unknown,
}

impl EntityKind {
    /// Parse a wire-format kind name, `None` for anything outside the
    /// three valid kinds.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Company" => Some(Self::Company),
            "RiskFactor" => Some(Self::RiskFactor),
            "Amount" => Some(Self::Amount),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for EntityKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name).unwrap_or(Self::Unknown))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    pub name: String,
    /// String or number; the model emits `null` for entities with no value.
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub label: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// The single artifact one extraction run produces. Endpoint ids in
/// `relationships` are not required to resolve against `entities`; dangling
/// edges are dropped at render time, not here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub entities: Vec<Entity>,
    pub relationships: Vec<Relationship>,
}

impl KnowledgeGraph {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Persist as pretty-printed UTF-8 JSON. Non-ASCII characters (currency
    /// symbols, crore amounts) are written literally.
    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json_pretty().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
