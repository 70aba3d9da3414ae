//! Immutable graph model built once per dump.
//!
//! Entities are stored per kind in dump order. Two indices are derived at
//! construction time:
//! - `(kind, name) -> position` for entity lookup
//! - `(kind, name) -> connection positions` for adjacency queries
//!
//! There are no mutation methods. Loading another dump builds a new model.

use crate::error::{ExplorerError, Result};
use crate::graph::{Connection, Entity, EntityKind, EntityRef};

use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, Default)]
pub struct GraphModel {
    processes: Vec<Entity>,
    streams: Vec<Entity>,
    channels: Vec<Entity>,
    connections: Vec<Connection>,
    /// Unknown connection fields, parallel to `connections`.
    connection_extras: Vec<Map<String, Value>>,

    /// Document-level fields outside the entity sections (metadata, actions, ...).
    passthrough: Map<String, Value>,

    position: HashMap<EntityRef, usize>,
    adjacency: HashMap<EntityRef, Vec<usize>>,
}

impl GraphModel {
    /// Assemble a model from already validated parts.
    ///
    /// Callers guarantee unique `(kind, name)` pairs and that every connection
    /// endpoint is present; the dump parser is the only producer.
    pub(crate) fn from_parts(
        entities: Vec<Entity>,
        connections: Vec<(Connection, Map<String, Value>)>,
        passthrough: Map<String, Value>,
    ) -> Self {
        let (connections, connection_extras): (Vec<Connection>, Vec<Map<String, Value>>) =
            connections.into_iter().unzip();
        let mut model = GraphModel {
            passthrough,
            ..GraphModel::default()
        };

        for entity in entities {
            let list = match entity.kind {
                EntityKind::Process => &mut model.processes,
                EntityKind::Stream => &mut model.streams,
                EntityKind::Channel => &mut model.channels,
            };
            model.position.insert(entity.entity_ref(), list.len());
            list.push(entity);
        }

        for (idx, conn) in connections.iter().enumerate() {
            model
                .adjacency
                .entry(conn.source.clone())
                .or_default()
                .push(idx);
            model
                .adjacency
                .entry(conn.target.clone())
                .or_default()
                .push(idx);
        }
        model.connections = connections;
        model.connection_extras = connection_extras;

        model
    }

    /// Entities of one kind, in dump order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> &[Entity] {
        match kind {
            EntityKind::Process => &self.processes,
            EntityKind::Stream => &self.streams,
            EntityKind::Channel => &self.channels,
        }
    }

    /// All entities: processes, then streams, then channels.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.processes
            .iter()
            .chain(self.streams.iter())
            .chain(self.channels.iter())
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, idx: usize) -> Option<&Connection> {
        self.connections.get(idx)
    }

    /// Record fields of connection `idx` outside source/target/type/direction.
    pub fn connection_extra(&self, idx: usize) -> Option<&Map<String, Value>> {
        self.connection_extras.get(idx)
    }

    pub fn entity(&self, entity: &EntityRef) -> Option<&Entity> {
        let pos = *self.position.get(entity)?;
        self.entities_of_kind(entity.kind).get(pos)
    }

    pub fn find_entity(&self, name: &str, kind: EntityKind) -> Result<&Entity> {
        self.entity(&EntityRef::new(kind, name))
            .ok_or_else(|| ExplorerError::EntityNotFound {
                name: name.to_string(),
                kind: Some(kind),
            })
    }

    /// True if an entity of any kind carries this name.
    pub fn contains_name(&self, name: &str) -> bool {
        EntityKind::ALL
            .iter()
            .any(|kind| self.position.contains_key(&EntityRef::new(*kind, name)))
    }

    /// Connections touching any entity named `name`, in dump order.
    pub fn connections_of(&self, name: &str) -> Vec<&Connection> {
        let mut idxs = BTreeSet::new();
        for kind in EntityKind::ALL {
            if let Some(list) = self.adjacency.get(&EntityRef::new(kind, name)) {
                idxs.extend(list.iter().copied());
            }
        }
        idxs.into_iter().map(|i| &self.connections[i]).collect()
    }

    /// Positions of the connections touching exactly this entity.
    pub fn connection_indices(&self, entity: &EntityRef) -> &[usize] {
        self.adjacency
            .get(entity)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn degree(&self, entity: &EntityRef) -> usize {
        self.connection_indices(entity).len()
    }

    pub fn passthrough(&self) -> &Map<String, Value> {
        &self.passthrough
    }

    pub fn entity_count(&self) -> usize {
        self.processes.len() + self.streams.len() + self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump;
    use crate::graph::Role;
    use pretty_assertions::assert_eq;

    fn sample() -> GraphModel {
        dump::parse_str(
            r#"{
              "nodes": {
                "/talker":   { "name": "/talker",   "parameters": [] },
                "/listener": { "name": "/listener", "parameters": [] },
                "/idle":     { "name": "/idle" }
              },
              "topics": {
                "/chatter": { "name": "/chatter", "type": "std_msgs/msg/String" },
                "/talker":  { "name": "/talker",  "type": "std_msgs/msg/Empty" }
              },
              "services": {},
              "connections": [
                { "type": "topic", "source_id": "/talker",  "target_id": "/chatter",  "direction": "publish" },
                { "type": "topic", "source_id": "/chatter", "target_id": "/listener", "direction": "subscribe" },
                { "type": "topic", "source_id": "/talker",  "target_id": "/listener", "direction": "subscribe" }
              ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn entities_keep_dump_order() {
        let g = sample();
        let names: Vec<&str> = g
            .entities_of_kind(EntityKind::Process)
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["/talker", "/listener", "/idle"]);
        assert_eq!(g.entity_count(), 5);
    }

    #[test]
    fn connections_of_spans_kinds_sharing_a_name() {
        let g = sample();
        // "/talker" is both a process (publishes /chatter) and a topic
        // (subscribed by /listener).
        let conns = g.connections_of("/talker");
        assert_eq!(conns.len(), 2);
        assert_eq!(conns[0].role, Role::Publish);
        assert_eq!(conns[1].medium().name, "/talker");

        assert_eq!(g.connections_of("/listener").len(), 2);
        assert!(g.connections_of("/nope").is_empty());
    }

    #[test]
    fn find_entity_reports_missing_kind() {
        let g = sample();
        assert!(g.find_entity("/chatter", EntityKind::Stream).is_ok());
        match g.find_entity("/chatter", EntityKind::Channel) {
            Err(ExplorerError::EntityNotFound { name, kind }) => {
                assert_eq!(name, "/chatter");
                assert_eq!(kind, Some(EntityKind::Channel));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn degree_counts_per_entity_not_per_name() {
        let g = sample();
        assert_eq!(g.degree(&EntityRef::new(EntityKind::Process, "/talker")), 1);
        assert_eq!(g.degree(&EntityRef::new(EntityKind::Stream, "/talker")), 1);
        assert_eq!(g.degree(&EntityRef::new(EntityKind::Process, "/idle")), 0);
        assert!(g.contains_name("/idle"));
        assert!(!g.contains_name("/ghost"));
    }
}
