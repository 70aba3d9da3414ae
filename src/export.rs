//! Export adapter: visible subgraph -> dump-shaped document.
//!
//! The output uses the same grammar the parser consumes, so re-parsing an
//! export yields a model with exactly the exported entities and connections.

use crate::dump::DumpDocument;
use crate::dump::raw::{ConnectionRecord, MediumRecord, NodeRecord};
use crate::filter::VisibleSubgraph;
use crate::graph::{Attributes, Connection, Entity, EntityKind};

use anyhow::Context;
use serde_json::{Map, Value};

fn entity_record(entity: &Entity) -> serde_json::Result<Value> {
    match &entity.attributes {
        Attributes::Process { parameters } => serde_json::to_value(&NodeRecord {
            name: Some(entity.name.clone()),
            parameters: parameters.clone(),
            extra: entity.extra.clone(),
        }),
        Attributes::Medium {
            type_name,
            message_schema,
        } => serde_json::to_value(&MediumRecord {
            name: Some(entity.name.clone()),
            type_name: Some(type_name.clone()),
            message_schema: message_schema.clone(),
            extra: entity.extra.clone(),
        }),
    }
}

fn connection_record(conn: &Connection, extra: Map<String, Value>) -> serde_json::Result<Value> {
    serde_json::to_value(&ConnectionRecord {
        medium: Some(conn.medium_kind().connection_type().to_string()),
        source_id: Some(conn.source.name.clone()),
        target_id: Some(conn.target.name.clone()),
        direction: Some(conn.role.to_string()),
        extra,
    })
}

/// Document holding exactly the visible entities and connections, plus the
/// source dump's passthrough fields.
pub fn export_data(visible: &VisibleSubgraph) -> anyhow::Result<DumpDocument> {
    let graph = visible.graph();

    let mut sections: [Map<String, Value>; 3] = Default::default();
    for entity in visible.entities() {
        let slot = match entity.kind {
            EntityKind::Process => 0,
            EntityKind::Stream => 1,
            EntityKind::Channel => 2,
        };
        let record = entity_record(entity)
            .with_context(|| format!("serialize {} {}", entity.kind, entity.name))?;
        sections[slot].insert(entity.name.clone(), record);
    }
    let [nodes, topics, services] = sections;

    let mut connections = Vec::with_capacity(visible.connection_count());
    for &idx in visible.connection_indices() {
        let Some(conn) = graph.connection(idx) else {
            continue;
        };
        let extra = graph.connection_extra(idx).cloned().unwrap_or_default();
        let record = connection_record(conn, extra)
            .with_context(|| format!("serialize connection {}", conn))?;
        connections.push(record);
    }

    Ok(DumpDocument {
        nodes,
        topics,
        services,
        connections,
        extra: graph.passthrough().clone(),
    })
}

pub fn to_json_pretty(doc: &DumpDocument) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump;
    use crate::filter::{PatternSet, Which, compute_visible};
    use crate::graph::GraphModel;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    const DUMP: &str = r#"{
      "graph_metadata": { "created_at": 1, "description": "fixture" },
      "nodes": {
        "/a":      { "id": "node_0", "name": "/a", "parameters": [ { "name": "p", "value": "1", "type": "integer" } ] },
        "/b":      { "id": "node_1", "name": "/b", "parameters": [] },
        "/lonely": { "id": "node_2", "name": "/lonely", "parameters": [] }
      },
      "topics": {
        "/topic_x": { "id": "/topic_x", "name": "/topic_x", "type": "std_msgs/msg/String", "message_schema": ["string data"] },
        "/topic_y": { "id": "/topic_y", "name": "/topic_y", "type": "std_msgs/msg/String", "message_schema": [] }
      },
      "services": {
        "/srv": { "id": "/srv", "name": "/srv", "type": "std_srvs/srv/Trigger", "message_schema": [] }
      },
      "actions": {},
      "connections": [
        { "type": "topic",   "source_id": "/a",       "target_id": "/topic_x", "direction": "publish" },
        { "type": "topic",   "source_id": "/topic_x", "target_id": "/b",       "direction": "subscribe" },
        { "type": "topic",   "source_id": "/b",       "target_id": "/topic_y", "direction": "publish" },
        { "type": "service", "source_id": "/srv",     "target_id": "/b",       "direction": "provide" },
        { "type": "service", "source_id": "/a",       "target_id": "/srv",     "direction": "call" }
      ]
    }"#;

    fn entity_set(g: &GraphModel) -> BTreeSet<(EntityKind, String)> {
        g.entities().map(|e| (e.kind, e.name.clone())).collect()
    }

    fn connection_set(g: &GraphModel) -> BTreeSet<String> {
        g.connections().iter().map(|c| c.key()).collect()
    }

    #[test]
    fn round_trip_reproduces_visible_sets() {
        let g = Arc::new(dump::parse_str(DUMP).unwrap());
        let mut s = PatternSet::new();
        s.add(Which::Exclude, "topic_y").unwrap();
        s.add(Which::Include, "/b").unwrap();
        let visible = compute_visible(&g, &s);

        let text = to_json_pretty(&export_data(&visible).unwrap()).unwrap();
        let reparsed = dump::parse_str(&text).unwrap();

        let expected_entities: BTreeSet<(EntityKind, String)> =
            visible.entities().map(|e| (e.kind, e.name.clone())).collect();
        let expected_connections: BTreeSet<String> =
            visible.connections().map(|c| c.key()).collect();
        assert_eq!(entity_set(&reparsed), expected_entities);
        assert_eq!(connection_set(&reparsed), expected_connections);
        assert_eq!(reparsed.connections().len(), visible.connection_count());

        assert_eq!(
            expected_connections,
            BTreeSet::from([
                "/topic_x -> /b(topic:subscribe)".to_string(),
                "/srv -> /b(service:provide)".to_string(),
            ])
        );
    }

    #[test]
    fn export_keeps_attributes_and_passthrough() {
        let g = Arc::new(dump::parse_str(DUMP).unwrap());
        let doc = export_data(&compute_visible(&g, &PatternSet::new())).unwrap();

        assert_eq!(doc.nodes["/a"]["id"], "node_0");
        assert_eq!(doc.nodes["/a"]["parameters"][0]["name"], "p");
        assert_eq!(doc.topics["/topic_x"]["message_schema"][0], "string data");
        assert_eq!(doc.services["/srv"]["type"], "std_srvs/srv/Trigger");
        assert_eq!(doc.extra["graph_metadata"]["description"], "fixture");
        assert!(doc.extra.contains_key("actions"));

        let reparsed = dump::parse(doc).unwrap();
        assert_eq!(entity_set(&reparsed), entity_set(&g));
        assert_eq!(connection_set(&reparsed), connection_set(&g));
    }

    #[test]
    fn export_excludes_hidden_entities() {
        let g = Arc::new(dump::parse_str(DUMP).unwrap());
        let mut s = PatternSet::new();
        s.add(Which::Exclude, ".").unwrap();
        let doc = export_data(&compute_visible(&g, &s)).unwrap();
        assert!(doc.connections.is_empty());
        let names: Vec<&String> = doc.nodes.keys().collect();
        assert_eq!(names, vec!["/lonely"]);
        assert!(doc.topics.is_empty());
        assert!(doc.services.is_empty());
    }

    #[test]
    fn export_keeps_unknown_connection_and_parameter_fields() {
        let g = Arc::new(
            dump::parse_str(
                r#"{
                  "nodes": { "/a": { "name": "/a", "parameters": [
                    { "name": "p", "value": "1", "type": "integer", "descriptor": "ro" },
                    { "name": "untyped", "value": "x" }
                  ] } },
                  "topics": { "/t": { "name": "/t", "type": "std_msgs/msg/String" } },
                  "connections": [
                    { "type": "topic", "source_id": "/a", "target_id": "/t", "direction": "publish", "qos": "reliable" },
                    { "type": "topic", "source_id": "/t", "target_id": "/a", "direction": "publish", "qos": "best_effort" }
                  ]
                }"#,
            )
            .unwrap(),
        );
        let doc = export_data(&compute_visible(&g, &PatternSet::new())).unwrap();

        // The reversed duplicate merges into the first record.
        assert_eq!(doc.connections.len(), 1);
        assert_eq!(doc.connections[0]["qos"], "reliable");
        assert_eq!(doc.nodes["/a"]["parameters"][0]["descriptor"], "ro");
        let untyped = doc.nodes["/a"]["parameters"][1].as_object().unwrap();
        assert!(!untyped.contains_key("type"));

        let reparsed = dump::parse(doc).unwrap();
        assert_eq!(reparsed.connection_extra(0).unwrap()["qos"], "reliable");
        let params = reparsed.find_entity("/a", EntityKind::Process).unwrap().parameters();
        assert_eq!(params[0].extra["descriptor"], "ro");
        assert_eq!(params[1].type_name, None);
    }
}
