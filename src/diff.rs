//! Snapshot diff: what disappeared, appeared or changed between two dumps.
//!
//! Output shape (JSON):
//! {
//!   "missing": { "topics": [], "nodes": [], "services": [], "param": [], "connections": [] },
//!   "add":     { ... },
//!   "change":  { ... }
//! }
//!
//! Entities are compared by name per kind, connections by their
//! `src -> dst(type:direction)` key, parameters by name per process.

use crate::graph::{Entity, EntityKind, GraphModel};

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiffBucket {
    pub topics: Vec<String>,
    pub nodes: Vec<String>,
    pub services: Vec<String>,
    pub param: Vec<String>,
    pub connections: Vec<String>,
}

impl DiffBucket {
    fn entities_mut(&mut self, kind: EntityKind) -> &mut Vec<String> {
        match kind {
            EntityKind::Process => &mut self.nodes,
            EntityKind::Stream => &mut self.topics,
            EntityKind::Channel => &mut self.services,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
            && self.nodes.is_empty()
            && self.services.is_empty()
            && self.param.is_empty()
            && self.connections.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphDiff {
    pub missing: DiffBucket,
    pub add: DiffBucket,
    pub change: DiffBucket,
}

impl GraphDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.add.is_empty() && self.change.is_empty()
    }
}

fn value_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn param_names(entity: &Entity) -> impl Iterator<Item = String> + '_ {
    entity
        .parameters()
        .iter()
        .map(move |p| format!("[{}]: {}", entity.name, p.name))
}

/// Compare two models. Lists follow the order of the side they come from.
pub fn diff(before: &GraphModel, after: &GraphModel) -> GraphDiff {
    let mut out = GraphDiff::default();

    // 1) Entities, and parameters of processes present on only one side.
    for kind in EntityKind::ALL {
        for entity in before.entities_of_kind(kind) {
            match after.find_entity(&entity.name, kind) {
                Err(_) => {
                    out.missing.entities_mut(kind).push(entity.name.clone());
                    out.missing.param.extend(param_names(entity));
                }
                Ok(counterpart) => compare_parameters(entity, counterpart, &mut out),
            }
        }
        for entity in after.entities_of_kind(kind) {
            if before.find_entity(&entity.name, kind).is_err() {
                out.add.entities_mut(kind).push(entity.name.clone());
                out.add.param.extend(param_names(entity));
            }
        }
    }

    // 2) Connections by key.
    let before_keys: Vec<String> = before.connections().iter().map(|c| c.key()).collect();
    let after_keys: Vec<String> = after.connections().iter().map(|c| c.key()).collect();
    let before_set: BTreeSet<&String> = before_keys.iter().collect();
    let after_set: BTreeSet<&String> = after_keys.iter().collect();

    out.missing.connections = before_keys
        .iter()
        .filter(|k| !after_set.contains(k))
        .cloned()
        .collect();
    out.add.connections = after_keys
        .iter()
        .filter(|k| !before_set.contains(k))
        .cloned()
        .collect();

    out
}

fn compare_parameters(before: &Entity, after: &Entity, out: &mut GraphDiff) {
    for p in before.parameters() {
        match after.parameters().iter().find(|q| q.name == p.name) {
            None => out
                .missing
                .param
                .push(format!("[{}]: {}", before.name, p.name)),
            Some(q) if q.value != p.value => out.change.param.push(format!(
                "[{}: {}] {} -> {}",
                before.name,
                p.name,
                value_text(&p.value),
                value_text(&q.value)
            )),
            Some(_) => {}
        }
    }
    for q in after.parameters() {
        if !before.parameters().iter().any(|p| p.name == q.name) {
            out.add.param.push(format!("[{}]: {}", after.name, q.name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump;
    use pretty_assertions::assert_eq;

    const BEFORE: &str = r#"{
      "nodes": {
        "/talker": { "name": "/talker", "parameters": [
          { "name": "rate", "value": "10", "type": "integer" },
          { "name": "frame", "value": "map", "type": "string" }
        ] },
        "/old": { "name": "/old", "parameters": [ { "name": "x", "value": "1", "type": "integer" } ] }
      },
      "topics": { "/chatter": { "name": "/chatter", "type": "std_msgs/msg/String" } },
      "connections": [
        { "type": "topic", "source_id": "/talker", "target_id": "/chatter", "direction": "publish" },
        { "type": "topic", "source_id": "/chatter", "target_id": "/old", "direction": "subscribe" }
      ]
    }"#;

    const AFTER: &str = r#"{
      "nodes": {
        "/talker": { "name": "/talker", "parameters": [
          { "name": "rate", "value": "20", "type": "integer" },
          { "name": "use_sim_time", "value": "False", "type": "boolean" }
        ] },
        "/new": { "name": "/new", "parameters": [] }
      },
      "topics": { "/chatter": { "name": "/chatter", "type": "std_msgs/msg/String" } },
      "services": { "/reset": { "name": "/reset", "type": "std_srvs/srv/Empty" } },
      "connections": [
        { "type": "topic", "source_id": "/talker", "target_id": "/chatter", "direction": "publish" },
        { "type": "topic", "source_id": "/chatter", "target_id": "/new", "direction": "subscribe" },
        { "type": "service", "source_id": "/reset", "target_id": "/new", "direction": "provide" }
      ]
    }"#;

    #[test]
    fn reports_missing_added_and_changed() {
        let before = dump::parse_str(BEFORE).unwrap();
        let after = dump::parse_str(AFTER).unwrap();
        let d = diff(&before, &after);

        assert_eq!(d.missing.nodes, vec!["/old"]);
        assert_eq!(d.add.nodes, vec!["/new"]);
        assert_eq!(d.add.services, vec!["/reset"]);
        assert!(d.missing.topics.is_empty());

        assert_eq!(d.missing.param, vec!["[/talker]: frame", "[/old]: x"]);
        assert_eq!(d.add.param, vec!["[/talker]: use_sim_time"]);
        assert_eq!(d.change.param, vec!["[/talker: rate] 10 -> 20"]);

        assert_eq!(
            d.missing.connections,
            vec!["/chatter -> /old(topic:subscribe)"]
        );
        assert_eq!(
            d.add.connections,
            vec![
                "/chatter -> /new(topic:subscribe)",
                "/reset -> /new(service:provide)"
            ]
        );
    }

    #[test]
    fn identical_dumps_have_empty_diff() {
        let a = dump::parse_str(BEFORE).unwrap();
        let b = dump::parse_str(BEFORE).unwrap();
        assert!(diff(&a, &b).is_empty());
    }
}
