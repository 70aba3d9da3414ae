//! Typed graph layer: entities, connections and the immutable model.
//!
//! Naming follows the runtime topology:
//! - Process: an executable node
//! - Stream: a publish/subscribe topic
//! - Channel: a request/response service

pub mod model;

pub use model::GraphModel;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Process,
    Stream,
    Channel,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Process, EntityKind::Stream, EntityKind::Channel];

    /// Connection `type` string for a medium kind.
    pub fn connection_type(self) -> &'static str {
        match self {
            EntityKind::Channel => "service",
            _ => "topic",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EntityKind::Process => "process",
            EntityKind::Stream => "stream",
            EntityKind::Channel => "channel",
        })
    }
}

/// Role a process plays on a medium.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Publish,
    Subscribe,
    Call,
    Provide,
}

impl Role {
    /// Medium kind implied by the role.
    pub fn medium_kind(self) -> EntityKind {
        match self {
            Role::Publish | Role::Subscribe => EntityKind::Stream,
            Role::Call | Role::Provide => EntityKind::Channel,
        }
    }

    /// Whether the producer writes this role as process -> medium.
    pub fn process_is_source(self) -> bool {
        matches!(self, Role::Publish | Role::Call)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Publish => "publish",
            Role::Subscribe => "subscribe",
            Role::Call => "call",
            Role::Provide => "provide",
        })
    }
}

/// (kind, name) key. Names are unique within a kind, not across kinds.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityRef {
    pub kind: EntityKind,
    pub name: String,
}

impl EntityRef {
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

/// A single process parameter as captured in the dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(default)]
    pub value: Value,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,

    /// Fields beyond name/value/type (descriptors and the like).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attributes {
    /// Parameters in dump order.
    Process { parameters: Vec<Parameter> },
    /// Stream or channel schema.
    Medium {
        type_name: String,
        message_schema: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub kind: EntityKind,
    pub attributes: Attributes,

    /// Record fields outside the typed attributes, kept verbatim for export.
    pub extra: Map<String, Value>,
}

impl Entity {
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef::new(self.kind, self.name.clone())
    }

    pub fn parameters(&self) -> &[Parameter] {
        match &self.attributes {
            Attributes::Process { parameters } => parameters,
            Attributes::Medium { .. } => &[],
        }
    }
}

/// Directed relation between one process and one medium.
///
/// `source`/`target` keep the orientation the dump used; use [`Connection::process`]
/// and [`Connection::medium`] for orientation-independent access.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Connection {
    pub source: EntityRef,
    pub target: EntityRef,
    pub role: Role,
}

impl Connection {
    pub fn medium_kind(&self) -> EntityKind {
        self.role.medium_kind()
    }

    pub fn process(&self) -> &EntityRef {
        if self.source.kind == EntityKind::Process {
            &self.source
        } else {
            &self.target
        }
    }

    pub fn medium(&self) -> &EntityRef {
        if self.source.kind == EntityKind::Process {
            &self.target
        } else {
            &self.source
        }
    }

    /// Key format shared with the snapshot diff: `src -> dst(topic:publish)`.
    pub fn key(&self) -> String {
        format!(
            "{} -> {}({}:{})",
            self.source.name,
            self.target.name,
            self.medium_kind().connection_type(),
            self.role
        )
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
