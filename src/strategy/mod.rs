//! View placement strategy
//!
//! One strategy implementation serves every view shape. The topology
//! descriptor supplies the parts that differ (root placement, ring radius
//! rule, child arcs, capabilities); this module owns what is common to
//! all of them: the mutation entry points, the expansion/visibility
//! ledger, and the identity-keyed angular memory that keeps a view from
//! scrambling when the host replaces the data arrays.
//!
//! The shape-specific placement passes live in the submodules and are
//! selected by the descriptor's root placement rule:
//!
//! - [`fan`]: leader plus vote-ranked golden-angle siblings
//! - [`tree`]: reply trees with nested child arcs
//! - [`network`]: seeded scatter relaxed by the full force stack
//! - [`rings`]: rank-ordered concentric rings with soft targets
//!
//! Callers hold a mutation guard around every entry point that touches
//! node state; the strategy itself never starts or stops the simulation.

mod fan;
mod network;
mod rings;
mod tree;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::config::LayoutConfig;
use crate::expansion::AdjustmentLedger;
use crate::forces::{Collide, Links, ManyBody, RadialBias, RingTarget, TreeSpacing};
use crate::ring;
use crate::substrate::Substrate;
use crate::topology::{RootPlacement, TopologyDescriptor, ViewShape};
use crate::types::{Edge, Node, NodeKind, NodeMode, SortDirection, SortKey};

/// Layout extent assumed until the host reports real dimensions.
const DEFAULT_EXTENT: (f32, f32) = (1200.0, 800.0);

/// The one placement strategy, configured by a [`TopologyDescriptor`].
///
/// Holds per-identity state across data updates: golden-fan slot
/// assignments, the angle each node was placed on, each node's current
/// ring index, and the expansion/visibility ledger.
pub struct ViewStrategy {
    descriptor: TopologyDescriptor,
    config: LayoutConfig,
    ledger: AdjustmentLedger,
    /// Golden-fan slot per node id; fan siblings use it as a tie-break
    /// memory, tree roots keep theirs for life so root angles never
    /// reshuffle.
    slots: HashMap<String, usize>,
    /// Angle each content node was last placed on.
    angles: HashMap<String, f32>,
    /// Current ring index per content node (fan slot + 1, tree depth, or
    /// rank ring).
    ring_of: HashMap<String, usize>,
    /// Monotone counter for tree root slots; retired slots are never
    /// reused, which is what keeps surviving roots in place.
    next_root_slot: usize,
    sort_key: SortKey,
    sort_direction: SortDirection,
    dims: (f32, f32),
}

impl ViewStrategy {
    pub fn new(descriptor: TopologyDescriptor, config: LayoutConfig) -> Self {
        let sort_key = match descriptor.shape {
            ViewShape::ConsensusUniverse => SortKey::ConsensusRatio,
            _ => SortKey::NetVotes,
        };
        Self {
            descriptor,
            config,
            ledger: AdjustmentLedger::new(),
            slots: HashMap::new(),
            angles: HashMap::new(),
            ring_of: HashMap::new(),
            next_root_slot: 0,
            sort_key,
            sort_direction: SortDirection::Descending,
            dims: DEFAULT_EXTENT,
        }
    }

    pub fn descriptor(&self) -> &TopologyDescriptor {
        &self.descriptor
    }

    /// Ring index the node was last placed on, if it is content.
    pub fn ring_index(&self, id: &str) -> Option<usize> {
        self.ring_of.get(id).copied()
    }

    pub fn dims(&self) -> (f32, f32) {
        self.dims
    }

    pub fn set_dims(&mut self, width: f32, height: f32) {
        self.dims = (width, height);
    }

    // =========================================================================
    // PLACEMENT CONTRACT
    // =========================================================================

    /// Deterministic placement pass over the whole node set. Aborts (with
    /// a log line, keeping prior positions) when the set is empty or has
    /// no focus node.
    pub fn initialize_positions(&mut self, substrate: &mut Substrate) {
        if substrate.nodes().is_empty() {
            debug!(
                shape = self.descriptor.shape.as_str(),
                "placement skipped: empty node set"
            );
            return;
        }
        self.refresh_radii(substrate.nodes_mut());
        if ring::place_navigation_ring(substrate.nodes_mut(), &self.config.radii, &self.config)
            .is_none()
        {
            return;
        }
        match self.descriptor.root_placement {
            RootPlacement::FocusOnly => {}
            RootPlacement::LeaderFan { .. } => self.place_fan(substrate),
            RootPlacement::GoldenFan { .. } => self.place_tree(substrate),
            RootPlacement::SeededScatter => self.place_network(substrate),
            RootPlacement::RankedRings => self.place_rings(substrate),
        }
        debug!(
            shape = self.descriptor.shape.as_str(),
            nodes = substrate.nodes().len(),
            "positions initialized"
        );
    }

    /// Rebuild the force registry for the current data. Starts from a
    /// clean slate so a view that registers nothing really runs nothing.
    pub fn configure_forces(&mut self, substrate: &mut Substrate) {
        substrate.clear_forces();
        let caps = self.descriptor.capabilities;
        if caps.supports_tree {
            let parent_of = self.build_tree_index(substrate.nodes()).parent_of;
            substrate.register_force(
                "tree_spacing",
                Box::new(TreeSpacing::new(
                    self.config.tree_spacing_strength,
                    self.config.child_padding,
                    parent_of,
                )),
            );
            substrate.register_force(
                "collide",
                Box::new(Collide::new(
                    self.config.collide_padding,
                    self.config.collide_iterations,
                )),
            );
        }
        if caps.supports_forces {
            substrate.register_force(
                "charge",
                Box::new(ManyBody::new(self.config.charge_strength)),
            );
            substrate.register_force(
                "links",
                Box::new(Links::new(
                    self.config.link_distance,
                    self.config.link_strength,
                )),
            );
            let targets = self.radial_targets(substrate.nodes());
            substrate.register_force(
                "radial",
                Box::new(RadialBias::new(self.config.radial_strength, targets)),
            );
            substrate.register_force(
                "collide",
                Box::new(Collide::new(
                    self.config.collide_padding,
                    self.config.collide_iterations,
                )),
            );
        }
        if caps.supports_ranked_rings {
            let targets = self.assign_rings(substrate.nodes());
            substrate.register_force(
                "ring_target",
                Box::new(RingTarget::new(self.config.ring_target_strength, targets)),
            );
            substrate.register_force(
                "collide",
                Box::new(Collide::new(
                    self.config.collide_padding,
                    self.config.collide_iterations,
                )),
            );
        }
        if substrate.has_forces() {
            debug!(forces = ?substrate.force_names(), "force registry configured");
        }
    }

    /// Replace the data arrays, carrying kinetic state for surviving ids
    /// and dropping per-identity bookkeeping for departed ones, then run
    /// a full placement pass.
    pub fn update_data(&mut self, substrate: &mut Substrate, nodes: Vec<Node>, edges: Vec<Edge>) {
        let prior: HashMap<String, (f32, f32, f32, f32)> = substrate
            .nodes()
            .iter()
            .map(|n| (n.id.clone(), (n.x, n.y, n.vx, n.vy)))
            .collect();

        substrate.set_data(nodes, edges);

        for node in substrate.nodes_mut() {
            if let Some(&(x, y, vx, vy)) = prior.get(&node.id) {
                node.x = x;
                node.y = y;
                node.vx = vx;
                node.vy = vy;
            }
        }

        let live: HashSet<&str> = substrate.nodes().iter().map(|n| n.id.as_str()).collect();
        self.slots.retain(|id, _| live.contains(id.as_str()));
        self.angles.retain(|id, _| live.contains(id.as_str()));
        self.ring_of.retain(|id, _| live.contains(id.as_str()));
        self.ledger.retain_ids(&live);

        self.initialize_positions(substrate);
    }

    /// Preview/detail flip for one node. Unknown ids and no-op flips are
    /// ignored after a log line; the layout never throws.
    pub fn on_mode_change(&mut self, substrate: &mut Substrate, id: &str, mode: NodeMode) {
        let Some(node) = substrate.find_mut(id) else {
            warn!(%id, "mode change for unknown node, ignoring");
            return;
        };
        if node.mode == mode {
            return;
        }
        node.mode = mode;
        node.radius = self.config.radii.radius(node.kind, node.mode, node.hidden);
        let snapshot = node.clone();
        self.after_state_change(substrate, &snapshot);
    }

    /// Hide/show flip for one node. Hidden nodes shrink to the minimal
    /// constant radius and release their pin; showing restores the exact
    /// pre-hide placement because every radius is derived, not stored.
    pub fn on_visibility_change(&mut self, substrate: &mut Substrate, id: &str, hidden: bool) {
        let Some(node) = substrate.find_mut(id) else {
            warn!(%id, "visibility change for unknown node, ignoring");
            return;
        };
        if node.hidden == hidden {
            return;
        }
        node.hidden = hidden;
        node.radius = self.config.radii.radius(node.kind, node.mode, node.hidden);
        let snapshot = node.clone();
        self.after_state_change(substrate, &snapshot);
    }

    /// Change the rank criterion driving radial targets and ring
    /// assignment. The engine has already checked the capability gate.
    pub fn set_sort(&mut self, substrate: &mut Substrate, key: SortKey, direction: SortDirection) {
        self.sort_key = key;
        self.sort_direction = direction;
        debug!(
            key = key.as_str(),
            direction = direction.as_str(),
            "sort criterion changed"
        );
        self.configure_forces(substrate);
    }

    // =========================================================================
    // TRANSITION PLUMBING
    // =========================================================================

    fn after_state_change(&mut self, substrate: &mut Substrate, snapshot: &Node) {
        if snapshot.is_focus() {
            self.replace_for_focus(substrate);
            return;
        }

        let ring = self.ring_of.get(&snapshot.id).copied().unwrap_or(1);
        self.ledger.sync_node(snapshot, &self.config.radii, ring);

        if !substrate.nodes().iter().any(Node::is_focus) {
            warn!("placement skipped: no focus node in set");
            return;
        }
        match self.descriptor.root_placement {
            RootPlacement::FocusOnly => {}
            RootPlacement::LeaderFan { .. } => self.place_fan(substrate),
            RootPlacement::GoldenFan { .. } => self.replace_tree_subtree(substrate, &snapshot.id),
            // Free nodes re-settle under the forces at the guard's
            // restart temperature; only the rank targets move.
            RootPlacement::SeededScatter => self.refresh_radial_targets(substrate),
            RootPlacement::RankedRings => self.refresh_ring_targets(substrate),
        }
    }

    /// The focus node itself changed size: the navigation ring tracks its
    /// radius and every deterministic content radius absorbs the focus
    /// delta.
    fn replace_for_focus(&mut self, substrate: &mut Substrate) {
        if ring::place_navigation_ring(substrate.nodes_mut(), &self.config.radii, &self.config)
            .is_none()
        {
            return;
        }
        match self.descriptor.root_placement {
            RootPlacement::FocusOnly => {}
            RootPlacement::LeaderFan { .. } => self.place_fan(substrate),
            RootPlacement::GoldenFan { .. } => self.place_tree(substrate),
            RootPlacement::SeededScatter => self.refresh_radial_targets(substrate),
            RootPlacement::RankedRings => self.refresh_ring_targets(substrate),
        }
    }

    // =========================================================================
    // SHARED HELPERS
    // =========================================================================

    fn refresh_radii(&self, nodes: &mut [Node]) {
        for node in nodes {
            node.radius = self.config.radii.radius(node.kind, node.mode, node.hidden);
        }
    }

    /// Visible preview radius, the baseline all deltas are measured from.
    fn baseline_radius(&self, kind: NodeKind) -> f32 {
        self.config.radii.radius(kind, NodeMode::Preview, false)
    }

    /// Signed contribution of the focus node's own state to content
    /// radii: zero at full detail, negative (pulling content inward) when
    /// the focus is previewed or hidden.
    fn focus_delta(&self, nodes: &[Node]) -> f32 {
        nodes
            .iter()
            .find(|n| n.is_focus())
            .map(|focus| {
                let current = self.config.radii.radius(focus.kind, focus.mode, focus.hidden);
                let full = self.config.radii.radius(focus.kind, NodeMode::Detail, false);
                (current - full) / 2.0
            })
            .unwrap_or(0.0)
    }

    /// Scalar rank of one node under the active criterion. Missing
    /// metadata ranks as the natural zero.
    fn rank_value(&self, node: &Node) -> f64 {
        match self.sort_key {
            SortKey::NetVotes => node.metadata.net_votes.unwrap_or(0) as f64,
            SortKey::TotalVotes => node.metadata.total_votes.unwrap_or(0) as f64,
            SortKey::Recency => node
                .metadata
                .created_at
                .map(|t| t.timestamp_millis() as f64)
                .unwrap_or(0.0),
            SortKey::ConsensusRatio => node.metadata.consensus_ratio.unwrap_or(0.0),
            SortKey::Participants => f64::from(node.metadata.participant_count.unwrap_or(0)),
        }
    }

    /// Content node indexes in rank order; index 0 is the best slot.
    /// The sort is stable, so ties keep input order.
    fn ranked_content(&self, nodes: &[Node]) -> Vec<usize> {
        let mut ranked: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.kind.is_content() && !n.is_focus())
            .map(|(i, _)| i)
            .collect();
        ranked.sort_by(|&a, &b| {
            let ord = self
                .rank_value(&nodes[a])
                .partial_cmp(&self.rank_value(&nodes[b]))
                .unwrap_or(std::cmp::Ordering::Equal);
            match self.sort_direction {
                SortDirection::Descending => ord.reverse(),
                SortDirection::Ascending => ord,
            }
        });
        ranked
    }
}

/// Write a computed position. Expanded visible nodes are pinned there so
/// forces cannot disturb a node the user is reading; anything else has
/// its pin released. The focus node is handled by the ring pass and never
/// comes through here.
fn place_or_pin(node: &mut Node, x: f32, y: f32) {
    if node.mode == NodeMode::Detail && !node.hidden && !node.is_focus() {
        node.pin_at(x, y);
    } else {
        node.unpin();
        node.place(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeGroup;

    fn focus(id: &str) -> Node {
        let mut node = Node::new(id, NodeKind::Word, NodeGroup::Central);
        node.mode = NodeMode::Detail;
        node
    }

    fn alternative(id: &str, votes: i64) -> Node {
        let mut node = Node::new(id, NodeKind::Definition, NodeGroup::Alternative);
        node.metadata.net_votes = Some(votes);
        node
    }

    fn fan_strategy() -> ViewStrategy {
        ViewStrategy::new(
            TopologyDescriptor::word_definition_fan(),
            LayoutConfig::default(),
        )
    }

    fn fan_fixture() -> (ViewStrategy, Substrate) {
        let mut strategy = fan_strategy();
        let mut substrate = Substrate::new();
        strategy.update_data(
            &mut substrate,
            vec![
                focus("word"),
                alternative("alt-a", 20),
                alternative("alt-b", 9),
            ],
            Vec::new(),
        );
        (strategy, substrate)
    }

    #[test]
    fn test_default_sort_follows_shape() {
        assert_eq!(fan_strategy().sort_key, SortKey::NetVotes);
        let rings = ViewStrategy::new(
            TopologyDescriptor::consensus_universe(),
            LayoutConfig::default(),
        );
        assert_eq!(rings.sort_key, SortKey::ConsensusRatio);
    }

    #[test]
    fn test_mode_change_unknown_id_is_ignored() {
        let (mut strategy, mut substrate) = fan_fixture();
        let before: Vec<(f32, f32)> = substrate.nodes().iter().map(|n| (n.x, n.y)).collect();
        strategy.on_mode_change(&mut substrate, "ghost", NodeMode::Detail);
        let after: Vec<(f32, f32)> = substrate.nodes().iter().map(|n| (n.x, n.y)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_mode_change_maintains_ledger_lifecycle() {
        let (mut strategy, mut substrate) = fan_fixture();
        assert!(strategy.ledger.is_empty());

        strategy.on_mode_change(&mut substrate, "alt-a", NodeMode::Detail);
        let entry = strategy.ledger.get("alt-a").unwrap();
        assert_eq!(
            entry.delta,
            strategy.config.radii.expansion_delta(NodeKind::Definition)
        );

        strategy.on_mode_change(&mut substrate, "alt-a", NodeMode::Preview);
        assert!(strategy.ledger.get("alt-a").is_none());
    }

    #[test]
    fn test_visibility_change_shrinks_to_minimal_radius() {
        let (mut strategy, mut substrate) = fan_fixture();
        strategy.on_visibility_change(&mut substrate, "alt-b", true);

        let node = substrate.find("alt-b").unwrap();
        assert_eq!(node.radius, strategy.config.radii.hidden_radius);
        assert!(strategy.ledger.get("alt-b").unwrap().delta < 0.0);

        strategy.on_visibility_change(&mut substrate, "alt-b", false);
        let node = substrate.find("alt-b").unwrap();
        assert_eq!(node.radius, strategy.baseline_radius(NodeKind::Definition));
        assert!(strategy.ledger.get("alt-b").is_none());
    }

    #[test]
    fn test_update_data_prunes_departed_identity_state() {
        let (mut strategy, mut substrate) = fan_fixture();
        strategy.on_mode_change(&mut substrate, "alt-a", NodeMode::Detail);
        assert!(strategy.slots.contains_key("alt-b"));

        strategy.update_data(
            &mut substrate,
            vec![focus("word"), alternative("alt-b", 9)],
            Vec::new(),
        );

        assert!(!strategy.slots.contains_key("alt-a"));
        assert!(strategy.ledger.get("alt-a").is_none());
        assert!(strategy.ring_of.contains_key("alt-b"));
    }

    #[test]
    fn test_no_focus_aborts_content_placement() {
        let mut strategy = fan_strategy();
        let mut substrate = Substrate::new();
        strategy.update_data(&mut substrate, vec![alternative("alt-a", 3)], Vec::new());

        let node = substrate.find("alt-a").unwrap();
        assert_eq!((node.x, node.y), (0.0, 0.0));
        assert!(strategy.angles.is_empty());
    }

    #[test]
    fn test_empty_update_is_a_noop() {
        let mut strategy = fan_strategy();
        let mut substrate = Substrate::new();
        strategy.update_data(&mut substrate, Vec::new(), Vec::new());
        assert!(substrate.nodes().is_empty());
    }

    #[test]
    fn test_place_or_pin_follows_state() {
        let mut expanded = alternative("a", 0);
        expanded.mode = NodeMode::Detail;
        place_or_pin(&mut expanded, 10.0, 20.0);
        assert_eq!((expanded.fx, expanded.fy), (Some(10.0), Some(20.0)));

        let mut hidden = alternative("b", 0);
        hidden.mode = NodeMode::Detail;
        hidden.hidden = true;
        hidden.pin_at(1.0, 1.0);
        place_or_pin(&mut hidden, 10.0, 20.0);
        assert_eq!((hidden.fx, hidden.fy), (None, None));
        assert_eq!((hidden.x, hidden.y), (10.0, 20.0));

        let mut preview = alternative("c", 0);
        place_or_pin(&mut preview, 5.0, 5.0);
        assert!(!preview.is_pinned());
    }

    #[test]
    fn test_ranked_content_direction_flip() {
        let strategy = fan_strategy();
        let nodes = vec![
            alternative("low", 1),
            alternative("high", 10),
            alternative("mid", 5),
        ];
        let descending: Vec<&str> = strategy
            .ranked_content(&nodes)
            .into_iter()
            .map(|i| nodes[i].id.as_str())
            .collect();
        assert_eq!(descending, vec!["high", "mid", "low"]);

        let mut ascending_strategy = fan_strategy();
        ascending_strategy.sort_direction = SortDirection::Ascending;
        let ascending: Vec<&str> = ascending_strategy
            .ranked_content(&nodes)
            .into_iter()
            .map(|i| nodes[i].id.as_str())
            .collect();
        assert_eq!(ascending, vec!["low", "mid", "high"]);
    }

    #[test]
    fn test_focus_delta_tracks_focus_state() {
        let strategy = fan_strategy();
        let mut nodes = vec![focus("word")];
        assert_eq!(strategy.focus_delta(&nodes), 0.0);

        nodes[0].mode = NodeMode::Preview;
        let expected = -strategy.config.radii.expansion_delta(NodeKind::Word);
        assert_eq!(strategy.focus_delta(&nodes), expected);
    }
}
