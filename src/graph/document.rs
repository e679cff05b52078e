//! Serde model of the input graph document
//!
//! Accepts the Hetionet JSON export: numeric or string identifiers, and edge
//! endpoints written either as a bare identifier or a `[kind, identifier]` pair.

use serde::Deserialize;
use serde_json::Value;

use super::NodeData;
use crate::{KgqaError, Result};

/// Top-level document: `{ "nodes": [...], "edges": [...] }`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default)]
    pub edges: Vec<RawEdge>,
}

/// Node as written in the document, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawNode {
    #[serde(default)]
    pub identifier: Option<Value>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, alias = "attributes")]
    pub data: NodeData,
}

/// Edge as written in the document, before validation
#[derive(Debug, Clone, Deserialize)]
pub struct RawEdge {
    pub source_id: Value,
    pub target_id: Value,
    #[serde(default)]
    pub kind: String,
}

impl GraphDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Normalise an identifier value to its string form
pub(crate) fn identifier_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Resolve an edge endpoint: bare identifier or `[kind, identifier]`
pub(crate) fn endpoint_to_string(value: &Value) -> Result<String> {
    let id = match value {
        Value::Array(parts) => parts.last().and_then(identifier_to_string),
        other => identifier_to_string(other),
    };
    id.ok_or_else(|| KgqaError::GraphLoad(format!("invalid edge endpoint: {}", value)))
}
