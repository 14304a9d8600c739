//! Relaxation substrate
//!
//! A single-threaded force simulation over one owned node array and one
//! owned edge array. Strategies register named forces (or none at all and
//! rely on fixed positions); the host drives `tick()` from its frame
//! timer while `is_running()` stays true.
//!
//! Every tick runs two phases: first the registered forces perturb
//! velocities and positions, then hard pins are re-asserted so that the
//! focus node snaps back to the origin and explicitly pinned nodes snap
//! back to their exact coordinates with zero velocity. Drift under
//! repeated ticks is impossible for pinned nodes.
//!
//! Mutations (mode flips, visibility flips, data replacement) must not
//! interleave with ticking. Callers take a [`MutationGuard`] via
//! [`Substrate::pause`], mutate through it, and rely on its `Drop` to
//! restart the simulation at a low temperature on every exit path.

use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use tracing::debug;

use crate::types::{Edge, Node};

/// Default temperature floor; the simulation halts once alpha sinks
/// below it.
pub const DEFAULT_ALPHA_MIN: f32 = 0.001;
/// Default per-tick decay rate toward the target temperature.
pub const DEFAULT_ALPHA_DECAY: f32 = 0.0228;
/// Default fraction of velocity retained per tick.
pub const DEFAULT_DAMPING: f32 = 0.6;

/// Per-tick context handed to every registered force.
pub struct ForceContext<'a> {
    /// Current simulation temperature in `[alpha_min, 1]`.
    pub alpha: f32,
    /// Node id to array index, rebuilt whenever the node set is replaced.
    pub index_of: &'a HashMap<String, usize>,
}

/// A named force. Forces mutate velocities (and occasionally positions)
/// in place; the substrate integrates and clamps afterwards.
pub trait Force: Send {
    fn apply(&mut self, nodes: &mut [Node], edges: &[Edge], ctx: &ForceContext<'_>);
}

/// The owned simulation state: nodes, edges, temperature, and the force
/// registry.
pub struct Substrate {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<String, usize>,
    forces: Vec<(String, Box<dyn Force>)>,
    alpha: f32,
    alpha_target: f32,
    alpha_min: f32,
    alpha_decay: f32,
    damping: f32,
    running: bool,
}

impl fmt::Debug for Substrate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Substrate")
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .field("forces", &self.force_names())
            .field("alpha", &self.alpha)
            .field("running", &self.running)
            .finish()
    }
}

impl Default for Substrate {
    fn default() -> Self {
        Self::new()
    }
}

impl Substrate {
    pub fn new() -> Self {
        Self::with_tuning(DEFAULT_ALPHA_MIN, DEFAULT_ALPHA_DECAY, DEFAULT_DAMPING)
    }

    pub fn with_tuning(alpha_min: f32, alpha_decay: f32, damping: f32) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index: HashMap::new(),
            forces: Vec::new(),
            alpha: 1.0,
            alpha_target: 0.0,
            alpha_min,
            alpha_decay,
            damping,
            running: false,
        }
    }

    // =========================================================================
    // DATA ACCESS
    // =========================================================================

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edges_mut(&mut self) -> &mut [Edge] {
        &mut self.edges
    }

    pub fn find(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut Node> {
        let i = self.index.get(id).copied()?;
        self.nodes.get_mut(i)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Replace both arrays wholesale and rebuild the id index. Callers
    /// are expected to hold a [`MutationGuard`] while doing this.
    pub fn set_data(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.rebuild_index();
        debug!(
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "substrate data replaced"
        );
    }

    fn rebuild_index(&mut self) {
        self.index = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.clone(), i))
            .collect();
    }

    // =========================================================================
    // FORCE REGISTRY
    // =========================================================================

    /// Register a force under a name, replacing any force already
    /// registered under that name (execution order of the survivors is
    /// preserved).
    pub fn register_force(&mut self, name: &str, force: Box<dyn Force>) {
        match self.forces.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = force,
            None => self.forces.push((name.to_string(), force)),
        }
    }

    pub fn remove_force(&mut self, name: &str) {
        self.forces.retain(|(n, _)| n != name);
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    pub fn force_names(&self) -> Vec<&str> {
        self.forces.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn has_forces(&self) -> bool {
        !self.forces.is_empty()
    }

    // =========================================================================
    // SIMULATION CONTROL
    // =========================================================================

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resume ticking without touching the temperature.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Resume ticking at the given temperature (floored at `alpha_min`
    /// so the simulation does not halt on the very next tick).
    pub fn restart(&mut self, alpha: f32) {
        self.alpha = alpha.clamp(self.alpha_min, 1.0);
        self.running = true;
    }

    /// Halt the simulation and clear the force registry. Leftover named
    /// forces would silently re-engage on the next restart otherwise.
    pub fn stop(&mut self) {
        self.running = false;
        self.clear_forces();
        debug!("substrate stopped, force registry cleared");
    }

    /// Suspend ticking for a mutation. The returned guard derefs to the
    /// substrate; when it drops (on any exit path) the simulation
    /// restarts at `restart_alpha`.
    pub fn pause(&mut self, restart_alpha: f32) -> MutationGuard<'_> {
        self.running = false;
        MutationGuard {
            substrate: self,
            restart_alpha,
        }
    }

    // =========================================================================
    // TICKING
    // =========================================================================

    /// Advance one relaxation step: decay alpha, run the registered
    /// forces, integrate velocities, then re-assert every hard pin.
    /// Callable whether or not the simulation is marked running (settle
    /// loops drive it manually).
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;

        let Self {
            nodes,
            edges,
            index,
            forces,
            alpha,
            damping,
            ..
        } = self;

        let ctx = ForceContext {
            alpha: *alpha,
            index_of: index,
        };
        for (_, force) in forces.iter_mut() {
            force.apply(nodes, edges, &ctx);
        }

        for node in nodes.iter_mut() {
            if node.is_pinned() || node.is_focus() {
                continue;
            }
            node.vx *= *damping;
            node.vy *= *damping;
            node.x += node.vx;
            node.y += node.vy;
        }

        self.assert_pins();

        if self.alpha < self.alpha_min {
            self.running = false;
        }
    }

    /// Run a fixed number of synchronous ticks, used to settle a layout
    /// after a structural change without waiting on real frames.
    pub fn tick_n(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    /// Settle synchronously: run `n` ticks, drop the temperature to zero,
    /// and halt. Pins are re-asserted one final time so the frame handed
    /// to the host is exact. The force registry is preserved.
    pub fn settle(&mut self, n: usize) {
        self.tick_n(n);
        self.alpha = 0.0;
        self.running = false;
        self.assert_pins();
    }

    /// Clamp phase: the focus node returns to the origin and every
    /// pinned node returns to its exact pinned position, all with zero
    /// velocity.
    pub fn assert_pins(&mut self) {
        for node in self.nodes.iter_mut() {
            if node.is_focus() {
                node.x = 0.0;
                node.y = 0.0;
                node.vx = 0.0;
                node.vy = 0.0;
                continue;
            }
            if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
                node.x = fx;
                node.y = fy;
                node.vx = 0.0;
                node.vy = 0.0;
            }
        }
    }
}

/// Scoped stop-mutate-restart. Holds the substrate paused; restarts it
/// at a low temperature when dropped, including on early returns.
pub struct MutationGuard<'a> {
    substrate: &'a mut Substrate,
    restart_alpha: f32,
}

impl Deref for MutationGuard<'_> {
    type Target = Substrate;

    fn deref(&self) -> &Substrate {
        self.substrate
    }
}

impl DerefMut for MutationGuard<'_> {
    fn deref_mut(&mut self) -> &mut Substrate {
        self.substrate
    }
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.substrate.restart(self.restart_alpha);
    }
}
