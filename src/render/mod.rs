//! Rendering seam.
//!
//! The core only needs two things from a renderer: replace the drawing with
//! a new visible subgraph, and produce a vector snapshot of what is drawn.

pub mod svg;

pub use svg::SvgRenderer;

use crate::filter::VisibleSubgraph;

pub trait Renderer {
    /// Replace the current drawing with `visible`.
    fn draw(&mut self, visible: &VisibleSubgraph);

    /// SVG document of exactly what is currently drawn.
    fn snapshot_svg(&self) -> anyhow::Result<String>;
}
