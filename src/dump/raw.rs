//! Raw dump shapes (serde-friendly).
//!
//! JSON shape:
//! {
//!   "graph_metadata": { ... },                  // passed through
//!   "nodes":    { "/talker":  { "name": "/talker", "parameters": [ {name, value, type} ] } },
//!   "topics":   { "/chatter": { "name": "/chatter", "type": "std_msgs/msg/String",
//!                               "message_schema": ["string data"] } },
//!   "services": { "/add":     { "name": "/add", "type": "example_interfaces/srv/AddTwoInts" } },
//!   "actions":  {},                              // passed through
//!   "connections": [
//!     { "type": "topic", "source_id": "/talker", "target_id": "/chatter", "direction": "publish" }
//!   ]
//! }
//!
//! Entity sections are kept as ordered JSON maps and decoded record by record,
//! so a bad record can be reported by its key. Required fields are `Option`
//! here and checked in `parse`, which yields precise error messages.

use crate::graph::Parameter;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DumpDocument {
    #[serde(default)]
    pub nodes: Map<String, Value>,

    #[serde(default)]
    pub topics: Map<String, Value>,

    #[serde(default)]
    pub services: Map<String, Value>,

    #[serde(default)]
    pub connections: Vec<Value>,

    /// Everything else at the top level (graph_metadata, actions, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Process record under `nodes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Stream or channel record under `topics` / `services`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediumRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    #[serde(default)]
    pub message_schema: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionRecord {
    /// "topic" or "service".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub medium: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<String>,

    /// "publish", "subscribe", "call" or "provide".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
