//! Visible subgraph derivation.
//!
//! Filtering is connection-centric. For each connection the names in scope
//! are its two endpoint names, and
//!
//!   visible = include(names) && !exclude(names)
//!
//! where `include` passes on an empty include list. An entity is visible if
//! it is in at least one visible connection, or if it has no connections at
//! all. An entity whose connections are all hidden is hidden too.

use crate::filter::pattern::{Pattern, PatternSet};
use crate::graph::{Connection, Entity, EntityKind, EntityRef, GraphModel};

use std::collections::HashSet;
use std::sync::Arc;

/// Projection of a graph through a pattern set. Holds positions into the
/// shared model, never copies of it.
#[derive(Debug, Clone)]
pub struct VisibleSubgraph {
    graph: Arc<GraphModel>,
    entities: Vec<EntityRef>,
    connections: Vec<usize>,
}

impl PartialEq for VisibleSubgraph {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.graph, &other.graph)
            && self.entities == other.entities
            && self.connections == other.connections
    }
}

impl VisibleSubgraph {
    pub fn graph(&self) -> &Arc<GraphModel> {
        &self.graph
    }

    /// Visible entity keys: processes, then streams, then channels, each in dump order.
    pub fn entity_refs(&self) -> &[EntityRef] {
        &self.entities
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter_map(|r| self.graph.entity(r))
    }

    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities().filter(move |e| e.kind == kind)
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter_map(|i| self.graph.connection(*i))
    }

    /// Positions of the visible connections in the underlying model.
    pub fn connection_indices(&self) -> &[usize] {
        &self.connections
    }

    pub fn contains_entity(&self, entity: &EntityRef) -> bool {
        self.entities.contains(entity)
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// True when nothing was filtered out.
    pub fn is_complete(&self) -> bool {
        self.entities.len() == self.graph.entity_count()
            && self.connections.len() == self.graph.connections().len()
    }
}

fn any_match(patterns: &[Pattern], names: [&str; 2]) -> bool {
    patterns
        .iter()
        .any(|p| names.iter().any(|name| p.is_match(name)))
}

/// Include test. An empty include list admits everything.
pub fn passes_include(patterns: &PatternSet, conn: &Connection) -> bool {
    patterns.include().is_empty()
        || any_match(patterns.include(), [conn.source.name.as_str(), conn.target.name.as_str()])
}

/// Exclude test. True means the connection is hidden.
pub fn hits_exclude(patterns: &PatternSet, conn: &Connection) -> bool {
    any_match(patterns.exclude(), [conn.source.name.as_str(), conn.target.name.as_str()])
}

/// Exclude dominates include.
pub fn is_visible(patterns: &PatternSet, conn: &Connection) -> bool {
    passes_include(patterns, conn) && !hits_exclude(patterns, conn)
}

/// Derive the visible subgraph. Pure: same inputs, same output.
pub fn compute_visible(graph: &Arc<GraphModel>, patterns: &PatternSet) -> VisibleSubgraph {
    let connections: Vec<usize> = graph
        .connections()
        .iter()
        .enumerate()
        .filter(|(_, conn)| is_visible(patterns, conn))
        .map(|(idx, _)| idx)
        .collect();

    let mut touched: HashSet<&EntityRef> = HashSet::new();
    for idx in &connections {
        let conn = &graph.connections()[*idx];
        touched.insert(&conn.source);
        touched.insert(&conn.target);
    }

    let entities: Vec<EntityRef> = graph
        .entities()
        .map(|e| e.entity_ref())
        .filter(|r| touched.contains(r) || graph.degree(r) == 0)
        .collect();

    VisibleSubgraph {
        graph: Arc::clone(graph),
        entities,
        connections,
    }
}
