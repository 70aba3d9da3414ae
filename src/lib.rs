//! # rosgraph-explorer
//!
//! Loads a ROS 2 graph snapshot (a JSON dump of nodes, topics, services and
//! their connections), filters it through include/exclude regex sets and
//! exports what remains.
//!
//! ## Layers
//!
//! - **dump**: raw document shapes and validation into a model
//! - **graph**: immutable `GraphModel` with lookup and adjacency indices
//! - **filter**: pattern sets and the pure visible-subgraph derivation
//! - **controller**: the Idle / Recomputing / Error session state machine
//! - **export** / **render**: dump-shaped JSON and SVG snapshots
//! - **diff**: comparison of two snapshots
//! - **config**: JSON filter presets

pub mod config;
pub mod controller;
pub mod diff;
pub mod dump;
pub mod error;
pub mod export;
pub mod filter;
pub mod graph;
pub mod render;

pub use error::{ExplorerError, Result};
