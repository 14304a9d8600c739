//! Host-facing layout engine
//!
//! Owns the simulation substrate and the active view strategy and is the
//! only surface a host embeds. Every mutation entry point follows the
//! same discipline: pause the substrate, apply the change through the
//! strategy, and let the scoped guard restart the simulation at a low
//! temperature on the way out. Hosts that want a finished layout in one
//! call pass `skip_animation` and get a synchronously settled frame.
//!
//! Anomalies in the data (unknown ids, missing focus) degrade with a log
//! line and never unwind; the fallible surface is configuration
//! validation and frame serialization only.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::LayoutConfig;
use crate::error::LayoutResult;
use crate::ring;
use crate::strategy::ViewStrategy;
use crate::substrate::Substrate;
use crate::topology::{TopologyDescriptor, ViewShape};
use crate::types::{Edge, Node, NodeMode, SortDirection, SortKey};

// =============================================================================
// ENGINE
// =============================================================================

/// Radial layout engine for one view.
pub struct LayoutEngine {
    substrate: Substrate,
    strategy: ViewStrategy,
    config: LayoutConfig,
}

impl LayoutEngine {
    /// Engine with the default tuning. The default configuration is
    /// valid by construction.
    pub fn new(descriptor: TopologyDescriptor) -> Self {
        Self::build(descriptor, LayoutConfig::default())
    }

    /// Engine with custom tuning, validated up front so a bad value
    /// fails loudly here instead of as a degenerate layout later.
    pub fn with_config(
        descriptor: TopologyDescriptor,
        config: LayoutConfig,
    ) -> LayoutResult<Self> {
        config.validate()?;
        Ok(Self::build(descriptor, config))
    }

    fn build(descriptor: TopologyDescriptor, config: LayoutConfig) -> Self {
        let substrate =
            Substrate::with_tuning(config.alpha_min, config.alpha_decay, config.damping);
        let strategy = ViewStrategy::new(descriptor, config.clone());
        Self {
            substrate,
            strategy,
            config,
        }
    }

    // =========================================================================
    // MUTATION ENTRY POINTS
    // =========================================================================

    /// Replace the data arrays and re-derive the layout. Surviving nodes
    /// keep their positions and momentum; departed ids drop all
    /// bookkeeping. With `skip_animation` the simulation is settled
    /// synchronously and the returned state is final.
    pub fn update_data(&mut self, nodes: Vec<Node>, edges: Vec<Edge>, skip_animation: bool) {
        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            skip_animation,
            "data update"
        );
        {
            let mut guard = self.substrate.pause(self.config.restart_alpha);
            self.strategy.update_data(&mut guard, nodes, edges);
            self.strategy.configure_forces(&mut guard);
        }
        if skip_animation {
            self.substrate.settle(self.config.settle_ticks);
        }
    }

    /// Flip one node between preview and detail.
    pub fn on_mode_change(&mut self, id: &str, mode: NodeMode) {
        let mut guard = self.substrate.pause(self.config.restart_alpha);
        self.strategy.on_mode_change(&mut guard, id, mode);
    }

    /// Hide or show one node.
    pub fn on_visibility_change(&mut self, id: &str, hidden: bool) {
        let mut guard = self.substrate.pause(self.config.restart_alpha);
        self.strategy.on_visibility_change(&mut guard, id, hidden);
    }

    /// Change the rank criterion for shapes whose placement is
    /// rank-driven. Deterministic shapes rank by their own rules, so the
    /// request is ignored there.
    pub fn set_sort_criterion(&mut self, key: SortKey, direction: SortDirection) {
        let caps = self.strategy.descriptor().capabilities;
        if !caps.supports_forces && !caps.supports_ranked_rings {
            warn!(
                key = key.as_str(),
                shape = self.strategy.descriptor().shape.as_str(),
                "sort criterion ignored: shape is not rank-driven"
            );
            return;
        }
        let mut guard = self.substrate.pause(self.config.restart_alpha);
        self.strategy.set_sort(&mut guard, key, direction);
    }

    /// Swap to a different view topology over the same data. Positions
    /// carry over so the new shape animates from the old one; pins on
    /// content are released first because they belong to the old shape's
    /// rules.
    pub fn set_view(&mut self, descriptor: TopologyDescriptor) {
        info!(
            from = self.strategy.descriptor().shape.as_str(),
            to = descriptor.shape.as_str(),
            "view switch"
        );
        let (width, height) = self.strategy.dims();
        let mut strategy = ViewStrategy::new(descriptor, self.config.clone());
        strategy.set_dims(width, height);
        self.strategy = strategy;

        let mut guard = self.substrate.pause(self.config.restart_alpha);
        for node in guard.nodes_mut() {
            if !node.is_focus() {
                node.unpin();
            }
        }
        self.strategy.initialize_positions(&mut guard);
        self.strategy.configure_forces(&mut guard);
    }

    /// Record the host viewport, which scales the network scatter disc.
    pub fn update_dimensions(&mut self, width: f32, height: f32) {
        debug!(width, height, "viewport dimensions updated");
        self.strategy.set_dims(width, height);
    }

    /// Halt the simulation and drop the force registry.
    pub fn stop(&mut self) {
        self.substrate.stop();
    }

    // =========================================================================
    // TICKING AND READOUT
    // =========================================================================

    /// Advance one animation step if the simulation is running. Returns
    /// whether a step was taken, so render loops know when to idle.
    pub fn tick(&mut self) -> bool {
        if !self.substrate.is_running() {
            return false;
        }
        self.substrate.tick();
        true
    }

    /// Drive a fixed number of steps regardless of the running flag.
    pub fn tick_n(&mut self, n: usize) {
        self.substrate.tick_n(n);
    }

    pub fn nodes(&self) -> &[Node] {
        self.substrate.nodes()
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.substrate.find(id)
    }

    pub fn alpha(&self) -> f32 {
        self.substrate.alpha()
    }

    pub fn is_running(&self) -> bool {
        self.substrate.is_running()
    }

    pub fn shape(&self) -> ViewShape {
        self.strategy.descriptor().shape
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Snapshot of the current layout for the host renderer.
    pub fn frame(&self) -> LayoutFrame {
        let connector_shrink = self
            .substrate
            .nodes()
            .iter()
            .find(|n| n.is_focus())
            .map(|focus| focus.radius / ring::connector_divisor(focus.group, &self.config))
            .unwrap_or(0.0);

        let nodes = self
            .substrate
            .nodes()
            .iter()
            .map(|node| PlacedNode {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                radius: node.radius,
                ring: self.strategy.ring_index(&node.id),
                angle: node.angle,
                ring_radius: node.ring_radius,
            })
            .collect();

        LayoutFrame {
            shape: self.shape(),
            connector_shrink,
            nodes,
            stats: self.stats(),
        }
    }

    /// Aggregate counts for dashboards and logs.
    pub fn stats(&self) -> LayoutStats {
        let mut by_kind: HashMap<String, usize> = HashMap::new();
        let mut by_group: HashMap<String, usize> = HashMap::new();
        for node in self.substrate.nodes() {
            *by_kind.entry(node.kind.as_str().to_string()).or_insert(0) += 1;
            *by_group.entry(node.group.as_str().to_string()).or_insert(0) += 1;
        }
        LayoutStats {
            nodes: self.substrate.nodes().len(),
            edges: self.substrate.edges().len(),
            by_kind,
            by_group,
            alpha: self.substrate.alpha(),
            running: self.substrate.is_running(),
        }
    }
}

// =============================================================================
// FRAME TYPES
// =============================================================================

/// One node as the renderer should draw it.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlacedNode {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Ring index for content nodes (fan slot + 1, tree depth, rank
    /// ring); absent for the focus and chrome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring: Option<usize>,
    /// Assigned bearing for ring members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    /// Orbit radius for ring members.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ring_radius: Option<f32>,
}

/// Complete layout snapshot handed to the host per frame.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutFrame {
    pub shape: ViewShape,
    /// Distance connector endpoints retreat into the focus node.
    pub connector_shrink: f32,
    pub nodes: Vec<PlacedNode>,
    pub stats: LayoutStats,
}

impl LayoutFrame {
    pub fn to_json(&self) -> LayoutResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Counts and simulation state for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct LayoutStats {
    pub nodes: usize,
    pub edges: usize,
    pub by_kind: HashMap<String, usize>,
    pub by_group: HashMap<String, usize>,
    pub alpha: f32,
    pub running: bool,
}
