use crate::dump::raw::{ConnectionRecord, DumpDocument, MediumRecord, NodeRecord};
use crate::error::{ExplorerError, Result};
use crate::graph::{Attributes, Connection, Entity, EntityKind, EntityRef, GraphModel, Role};

use serde_json::{Map, Value};
use std::collections::HashSet;

/// Validate a dump document and build the immutable graph model.
///
/// Phases:
/// 1) Decode entity records per section, checking names against their keys.
/// 2) Decode connections, resolve endpoints, check role/medium agreement.
/// 3) Merge connections joining the same process and medium in the same role,
///    whichever way round the dump wrote them. The first record wins.
///
/// Nothing is returned on failure; the caller keeps whatever model it had.
pub fn parse(doc: DumpDocument) -> Result<GraphModel> {
    let DumpDocument {
        nodes,
        topics,
        services,
        connections,
        extra,
    } = doc;

    // Phase 1: entities.
    let mut entities: Vec<Entity> = Vec::new();
    let mut declared: HashSet<EntityRef> = HashSet::new();

    for (key, value) in nodes {
        let record: NodeRecord = decode(EntityKind::Process, &key, value)?;
        let name = checked_name(EntityKind::Process, &key, record.name)?;
        declared.insert(EntityRef::new(EntityKind::Process, name.clone()));
        entities.push(Entity {
            name,
            kind: EntityKind::Process,
            attributes: Attributes::Process {
                parameters: record.parameters,
            },
            extra: record.extra,
        });
    }

    for (kind, section) in [(EntityKind::Stream, topics), (EntityKind::Channel, services)] {
        for (key, value) in section {
            let record: MediumRecord = decode(kind, &key, value)?;
            let name = checked_name(kind, &key, record.name)?;
            let type_name = record.type_name.ok_or_else(|| {
                ExplorerError::malformed(format!("{} {:?} has no type", kind, key))
            })?;
            declared.insert(EntityRef::new(kind, name.clone()));
            entities.push(Entity {
                name,
                kind,
                attributes: Attributes::Medium {
                    type_name,
                    message_schema: record.message_schema,
                },
                extra: record.extra,
            });
        }
    }

    // Phase 2: connections.
    let mut out: Vec<(Connection, Map<String, Value>)> = Vec::new();
    let mut seen: HashSet<(EntityRef, EntityRef, Role)> = HashSet::new();
    let mut merged = 0usize;

    for (idx, value) in connections.into_iter().enumerate() {
        let mut record: ConnectionRecord = serde_json::from_value(value).map_err(|e| {
            ExplorerError::malformed(format!("connection #{}: {}", idx, e))
        })?;
        let extra = std::mem::take(&mut record.extra);
        let conn = resolve_connection(idx, record, &declared)?;

        // Phase 3: idempotent merge of duplicates.
        let key = (conn.process().clone(), conn.medium().clone(), conn.role);
        if seen.insert(key) {
            out.push((conn, extra));
        } else {
            merged += 1;
        }
    }

    if merged > 0 {
        tracing::debug!(merged, "merged duplicate connections");
    }
    tracing::debug!(
        entities = entities.len(),
        connections = out.len(),
        "built graph model"
    );

    Ok(GraphModel::from_parts(entities, out, extra))
}

fn decode<T: serde::de::DeserializeOwned>(kind: EntityKind, key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .map_err(|e| ExplorerError::malformed(format!("{} {:?}: {}", kind, key, e)))
}

fn checked_name(kind: EntityKind, key: &str, name: Option<String>) -> Result<String> {
    let name = name
        .ok_or_else(|| ExplorerError::malformed(format!("{} {:?} has no name", kind, key)))?;
    if name.is_empty() {
        return Err(ExplorerError::malformed(format!(
            "{} {:?} has an empty name",
            kind, key
        )));
    }
    if name != key {
        return Err(ExplorerError::malformed(format!(
            "{} keyed {:?} is named {:?}",
            kind, key, name
        )));
    }
    Ok(name)
}

fn resolve_connection(
    idx: usize,
    record: ConnectionRecord,
    declared: &HashSet<EntityRef>,
) -> Result<Connection> {
    let required = |field: Option<String>, what: &str| {
        field.ok_or_else(|| {
            ExplorerError::malformed(format!("connection #{} has no {}", idx, what))
        })
    };

    let medium = required(record.medium, "type")?;
    let source = required(record.source_id, "source_id")?;
    let target = required(record.target_id, "target_id")?;
    let direction = required(record.direction, "direction")?;

    let medium_kind = match medium.as_str() {
        "topic" => EntityKind::Stream,
        "service" => EntityKind::Channel,
        other => {
            return Err(ExplorerError::malformed(format!(
                "connection #{} has unknown type {:?}",
                idx, other
            )));
        }
    };
    let role = parse_role(&direction).ok_or_else(|| {
        ExplorerError::malformed(format!(
            "connection #{} has unknown direction {:?}",
            idx, direction
        ))
    })?;
    if role.medium_kind() != medium_kind {
        return Err(ExplorerError::malformed(format!(
            "connection #{}: direction {} does not apply to a {}",
            idx, role, medium
        )));
    }

    // Prefer the producer's orientation, then accept the reverse.
    let as_process_first = (
        EntityRef::new(EntityKind::Process, source.clone()),
        EntityRef::new(medium_kind, target.clone()),
    );
    let as_medium_first = (
        EntityRef::new(medium_kind, source.clone()),
        EntityRef::new(EntityKind::Process, target.clone()),
    );
    let candidates = if role.process_is_source() {
        [as_process_first, as_medium_first]
    } else {
        [as_medium_first, as_process_first]
    };

    for (src, dst) in candidates {
        if declared.contains(&src) && declared.contains(&dst) {
            return Ok(Connection {
                source: src,
                target: dst,
                role,
            });
        }
    }

    let missing: Vec<&str> = [source.as_str(), target.as_str()]
        .into_iter()
        .filter(|name| {
            !EntityKind::ALL
                .iter()
                .any(|k| declared.contains(&EntityRef::new(*k, *name)))
        })
        .collect();
    if missing.is_empty() {
        Err(ExplorerError::malformed(format!(
            "connection #{} ({} -> {}) must join one process and one {}",
            idx, source, target, medium_kind
        )))
    } else {
        Err(ExplorerError::malformed(format!(
            "connection #{} references undeclared endpoint(s): {}",
            idx,
            missing.join(", ")
        )))
    }
}

fn parse_role(s: &str) -> Option<Role> {
    match s {
        "publish" => Some(Role::Publish),
        "subscribe" => Some(Role::Subscribe),
        "call" => Some(Role::Call),
        "provide" => Some(Role::Provide),
        _ => None,
    }
}

