//! Dump layer: raw snapshot document + validation into a `GraphModel`.
//!
//! This module is the sole consumer of the dump's JSON shape. It owns:
//! - DumpDocument and per-record shapes (raw)
//! - validation / normalization (parse)

pub mod parse;
pub mod raw;

pub use parse::parse;
pub use raw::DumpDocument;

use crate::error::{ExplorerError, Result};
use crate::graph::GraphModel;

use anyhow::Context;
use std::fs;
use std::path::Path;

/// Parse a dump from JSON text.
pub fn parse_str(text: &str) -> Result<GraphModel> {
    let doc: DumpDocument =
        serde_json::from_str(text).map_err(|e| ExplorerError::malformed(e.to_string()))?;
    parse(doc)
}

/// Read a dump document from disk without validating it.
pub fn read_document(path: &Path) -> anyhow::Result<DumpDocument> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read dump file {}", path.display()))?;
    let doc: DumpDocument = serde_json::from_str(&text)
        .map_err(|e| ExplorerError::malformed(e.to_string()))
        .with_context(|| format!("parse dump file {}", path.display()))?;
    Ok(doc)
}

/// Read and validate a dump file.
pub fn load_file(path: &Path) -> anyhow::Result<GraphModel> {
    let doc = read_document(path)?;
    parse(doc).with_context(|| format!("validate dump file {}", path.display()))
}
