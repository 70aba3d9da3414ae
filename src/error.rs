//! Error taxonomy for the graph core.
//!
//! None of these are fatal: every error leaves the controller in its
//! last-known-good state. The CLI wraps them with `anyhow` context.

use crate::graph::EntityKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The raw dump failed structural validation. No model is produced.
    #[error("malformed dump: {reason}")]
    MalformedDump { reason: String },

    /// A user-supplied pattern does not compile. The pattern set is unchanged.
    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A lookup targeted a name absent from the current graph.
    #[error("entity not found: {name}{}", kind_suffix(.kind))]
    EntityNotFound {
        name: String,
        kind: Option<EntityKind>,
    },

    /// A recompute was requested before any dump was loaded.
    #[error("no dump loaded")]
    NoDumpLoaded,
}

impl ExplorerError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        ExplorerError::MalformedDump {
            reason: reason.into(),
        }
    }
}

fn kind_suffix(kind: &Option<EntityKind>) -> String {
    kind.map(|k| format!(" ({})", k)).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
