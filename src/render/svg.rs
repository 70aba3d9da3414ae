use crate::filter::VisibleSubgraph;
use crate::graph::{EntityKind, EntityRef, Role};
use crate::render::Renderer;

use std::collections::HashMap;
use std::fmt::Write as _;

const COLUMN_GAP: f32 = 140.0;
const ROW_HEIGHT: f32 = 36.0;
const BOX_HEIGHT: f32 = 24.0;
const CHAR_WIDTH: f32 = 7.0;
const PADDING: f32 = 20.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedNode {
    pub entity: EntityRef,
    pub x: f32,
    pub y: f32,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedEdge {
    pub from: (f32, f32),
    pub to: (f32, f32),
    pub role: Role,
}

/// Layered layout: streams on the left, processes in the middle, channels on
/// the right, each column in dump order.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    nodes: Vec<PlacedNode>,
    edges: Vec<PlacedEdge>,
    width: f32,
    height: f32,
}

fn column(kind: EntityKind) -> usize {
    match kind {
        EntityKind::Stream => 0,
        EntityKind::Process => 1,
        EntityKind::Channel => 2,
    }
}

fn box_width(name: &str) -> f32 {
    name.chars().count() as f32 * CHAR_WIDTH + PADDING
}

fn role_color(role: Role) -> &'static str {
    match role {
        Role::Publish => "#2b7bb9",
        Role::Subscribe => "#3a9d5d",
        Role::Call => "#c0392b",
        Role::Provide => "#d68910",
    }
}

fn kind_fill(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Process => "#eef3fb",
        EntityKind::Stream => "#eefaf1",
        EntityKind::Channel => "#fdf3e6",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

impl SvgRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[PlacedNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[PlacedEdge] {
        &self.edges
    }
}

impl Renderer for SvgRenderer {
    fn draw(&mut self, visible: &VisibleSubgraph) {
        // 1) Column widths from the longest name per column.
        let mut col_width = [0.0f32; 3];
        let mut col_rows = [0usize; 3];
        for r in visible.entity_refs() {
            let c = column(r.kind);
            col_width[c] = col_width[c].max(box_width(&r.name));
        }

        let mut col_x = [PADDING; 3];
        for c in 1..3 {
            col_x[c] = col_x[c - 1] + col_width[c - 1] + COLUMN_GAP;
        }

        // 2) Place nodes row by row.
        self.nodes.clear();
        let mut anchor: HashMap<&EntityRef, usize> = HashMap::new();
        for r in visible.entity_refs() {
            let c = column(r.kind);
            let y = PADDING + col_rows[c] as f32 * ROW_HEIGHT;
            col_rows[c] += 1;
            anchor.insert(r, self.nodes.len());
            self.nodes.push(PlacedNode {
                entity: r.clone(),
                x: col_x[c],
                y,
                width: box_width(&r.name),
            });
        }

        // 3) Edges between box sides facing each other.
        self.edges.clear();
        for conn in visible.connections() {
            let (Some(&s), Some(&t)) = (anchor.get(&conn.source), anchor.get(&conn.target)) else {
                continue;
            };
            let (src, dst) = (&self.nodes[s], &self.nodes[t]);
            let side = |n: &PlacedNode, toward: &PlacedNode| {
                let x = if toward.x > n.x { n.x + n.width } else { n.x };
                (x, n.y + BOX_HEIGHT / 2.0)
            };
            self.edges.push(PlacedEdge {
                from: side(src, dst),
                to: side(dst, src),
                role: conn.role,
            });
        }

        let rows = col_rows.iter().copied().max().unwrap_or(0);
        self.width = col_x[2] + col_width[2] + PADDING;
        self.height = PADDING * 2.0 + rows as f32 * ROW_HEIGHT;
    }

    fn snapshot_svg(&self) -> anyhow::Result<String> {
        const TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="__WIDTH__" height="__HEIGHT__" viewBox="0 0 __WIDTH__ __HEIGHT__">
<defs>
  <marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="6" markerHeight="6" orient="auto-start-reverse">
    <path d="M 0 0 L 10 5 L 0 10 z" fill="#555"/>
  </marker>
</defs>
<style>text { font-family: ui-monospace, Menlo, Consolas, monospace; font-size: 12px; }</style>
<rect width="100%" height="100%" fill="white"/>
__BODY__</svg>
"##;

        let mut body = String::new();
        for e in &self.edges {
            writeln!(
                body,
                r#"<line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}" stroke="{}" stroke-width="1.5" marker-end="url(#arrow)"><title>{}</title></line>"#,
                e.from.0,
                e.from.1,
                e.to.0,
                e.to.1,
                role_color(e.role),
                e.role
            )?;
        }
        for n in &self.nodes {
            writeln!(
                body,
                r##"<g class="{}"><rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" rx="4" fill="{}" stroke="#888"/><text x="{:.1}" y="{:.1}">{}</text></g>"##,
                n.entity.kind,
                n.x,
                n.y,
                n.width,
                BOX_HEIGHT,
                kind_fill(n.entity.kind),
                n.x + PADDING / 2.0,
                n.y + BOX_HEIGHT / 2.0 + 4.0,
                escape_xml(&n.entity.name)
            )?;
        }

        Ok(TEMPLATE
            .replace("__WIDTH__", &format!("{:.0}", self.width))
            .replace("__HEIGHT__", &format!("{:.0}", self.height))
            .replace("__BODY__", &body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dump;
    use crate::filter::{PatternSet, Which, compute_visible};
    use std::sync::Arc;

    fn graph() -> Arc<crate::graph::GraphModel> {
        Arc::new(
            dump::parse_str(
                r#"{
                  "nodes": { "/talker": { "name": "/talker" }, "/a<b>": { "name": "/a<b>" } },
                  "topics": { "/chatter": { "name": "/chatter", "type": "std_msgs/msg/String" } },
                  "services": { "/add": { "name": "/add", "type": "example_interfaces/srv/AddTwoInts" } },
                  "connections": [
                    { "type": "topic",   "source_id": "/talker", "target_id": "/chatter", "direction": "publish" },
                    { "type": "service", "source_id": "/talker", "target_id": "/add",     "direction": "call" }
                  ]
                }"#,
            )
            .unwrap(),
        )
    }

    #[test]
    fn places_kinds_in_columns() {
        let g = graph();
        let mut r = SvgRenderer::new();
        r.draw(&compute_visible(&g, &PatternSet::new()));

        let x_of = |name: &str| r.nodes().iter().find(|n| n.entity.name == name).unwrap().x;
        assert!(x_of("/chatter") < x_of("/talker"));
        assert!(x_of("/talker") < x_of("/add"));
        assert_eq!(r.edges().len(), 2);
    }

    #[test]
    fn snapshot_reflects_latest_draw() {
        let g = graph();
        let mut r = SvgRenderer::new();
        r.draw(&compute_visible(&g, &PatternSet::new()));
        let full = r.snapshot_svg().unwrap();
        assert!(full.contains(">/chatter</text>"));
        assert!(full.contains("/a&lt;b&gt;"));

        let mut s = PatternSet::new();
        s.add(Which::Exclude, "chatter").unwrap();
        r.draw(&compute_visible(&g, &s));
        let filtered = r.snapshot_svg().unwrap();
        assert!(!filtered.contains(">/chatter</text>"));
        assert!(filtered.contains(">/add</text>"));
        assert_eq!(r.edges().len(), 1);
    }
}
