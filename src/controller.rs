//! Recompute controller: the only place session state is mutated.
//!
//! States:
//! - Idle: a visible subgraph is settled (or nothing is loaded yet)
//! - Recomputing: transient, entered for every accepted event
//! - Error: a recompute was requested with no graph loaded
//!
//! Every accepted event recomputes the full visible subgraph; there is no
//! incremental path. Rejected events (malformed dump, invalid pattern,
//! unknown pick target) leave state, graph and patterns untouched.

use crate::dump::{self, DumpDocument};
use crate::error::{ExplorerError, Result};
use crate::export;
use crate::filter::{PatternSet, VisibleSubgraph, Which, compute_visible};
use crate::graph::GraphModel;
use crate::render::Renderer;

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Idle,
    Recomputing,
    Error,
}

#[derive(Debug, Clone)]
pub enum Event {
    LoadDump(DumpDocument),
    AddPattern { which: Which, text: String },
    RemovePattern { which: Which, text: String },
    AddFromEntity { which: Which, name: String },
}

pub struct Controller {
    state: State,
    graph: Option<Arc<GraphModel>>,
    patterns: PatternSet,
    visible: Option<VisibleSubgraph>,

    renderer: Option<Box<dyn Renderer>>,
    /// Bumped on every settled recompute.
    generation: u64,
    /// Generation the renderer last drew.
    drawn: Option<u64>,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self {
            state: State::Idle,
            graph: None,
            patterns: PatternSet::new(),
            visible: None,
            renderer: None,
            generation: 0,
            drawn: None,
        }
    }

    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn graph(&self) -> Option<&Arc<GraphModel>> {
        self.graph.as_ref()
    }

    /// Latest settled subgraph, if any.
    pub fn current_visible(&self) -> Option<&VisibleSubgraph> {
        self.visible.as_ref()
    }

    /// Process one event to completion.
    pub fn handle(&mut self, event: Event) -> Result<State> {
        match event {
            Event::LoadDump(doc) => {
                let graph = dump::parse(doc)?;
                self.load_graph(graph)
            }
            Event::AddPattern { which, text } => {
                self.patterns.add(which, &text)?;
                self.recompute()
            }
            Event::RemovePattern { which, text } => {
                self.patterns.remove(which, &text);
                self.recompute()
            }
            Event::AddFromEntity { which, name } => {
                let Some(graph) = self.graph.as_ref() else {
                    return self.recompute();
                };
                if !graph.contains_name(&name) {
                    tracing::warn!(entity = %name, %which, "pick-to-filter target not in graph");
                    return Err(ExplorerError::EntityNotFound { name, kind: None });
                }
                self.patterns.add_from_entity(which, &name)?;
                self.recompute()
            }
        }
    }

    /// Swap in an already built model. The old model is dropped once the
    /// last subgraph referencing it is gone.
    pub fn load_graph(&mut self, graph: GraphModel) -> Result<State> {
        self.graph = Some(Arc::new(graph));
        self.recompute()
    }

    pub fn add_pattern(&mut self, which: Which, text: &str) -> Result<State> {
        self.handle(Event::AddPattern {
            which,
            text: text.to_string(),
        })
    }

    pub fn remove_pattern(&mut self, which: Which, text: &str) -> Result<State> {
        self.handle(Event::RemovePattern {
            which,
            text: text.to_string(),
        })
    }

    pub fn add_from_entity(&mut self, which: Which, name: &str) -> Result<State> {
        self.handle(Event::AddFromEntity {
            which,
            name: name.to_string(),
        })
    }

    /// Apply a preset on top of the current patterns, recomputing once.
    pub fn apply_patterns(&mut self, preset: &PatternSet) -> Result<State> {
        self.patterns.merge(preset);
        self.recompute()
    }

    fn recompute(&mut self) -> Result<State> {
        self.state = State::Recomputing;

        let Some(graph) = self.graph.as_ref() else {
            self.state = State::Error;
            self.visible = None;
            return Err(ExplorerError::NoDumpLoaded);
        };

        let visible = compute_visible(graph, &self.patterns);
        tracing::debug!(
            entities = visible.entity_count(),
            connections = visible.connection_count(),
            include = self.patterns.include().len(),
            exclude = self.patterns.exclude().len(),
            "recomputed visible subgraph"
        );

        self.generation += 1;
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.draw(&visible);
            self.drawn = Some(self.generation);
        }
        self.visible = Some(visible);
        self.state = State::Idle;
        Ok(self.state)
    }

    fn settled(&self) -> Result<&VisibleSubgraph> {
        match (self.state, self.visible.as_ref()) {
            (State::Idle, Some(v)) => Ok(v),
            _ => Err(ExplorerError::NoDumpLoaded),
        }
    }

    /// Data export of the current visible subgraph.
    pub fn export_data(&self) -> anyhow::Result<DumpDocument> {
        export::export_data(self.settled()?)
    }

    /// Vector snapshot from the attached renderer. Redraws first if the
    /// renderer is behind the latest settled subgraph.
    pub fn export_image(&mut self) -> anyhow::Result<String> {
        let visible = self.settled()?.clone();
        let generation = self.generation;
        let Some(renderer) = self.renderer.as_mut() else {
            anyhow::bail!("no renderer attached");
        };
        if self.drawn != Some(generation) {
            renderer.draw(&visible);
            self.drawn = Some(generation);
        }
        renderer.snapshot_svg()
    }
}
