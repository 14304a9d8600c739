//! Consensus universe placement
//!
//! Content ranks under the active criterion and fills concentric rings
//! whose capacity grows linearly with the ring index: six slots on the
//! first ring, twelve on the second, and so on. Each occupied ring
//! spreads its members evenly starting at twelve o'clock.
//!
//! Placement computes one target position per node. The initial pass
//! hard-places only never-seen nodes there; afterwards a soft ring
//! force carries everyone, so a rank change glides a node to its new
//! ring instead of snapping it.

use std::collections::HashMap;
use std::f32::consts::TAU;

use crate::forces::RingTarget;
use crate::geometry::{polar, TWELVE_O_CLOCK};
use crate::substrate::Substrate;
use crate::types::Node;

use super::ViewStrategy;

impl ViewStrategy {
    /// Target position per content node. Ring membership comes from rank
    /// and per-ring capacity; the radius folds in the node's own ledger
    /// delta, the sum of strictly inner deltas, and the focus delta.
    pub(crate) fn assign_rings(&mut self, nodes: &[Node]) -> HashMap<String, (f32, f32)> {
        let ranked = self.ranked_content(nodes);
        let focus_delta = self.focus_delta(nodes);

        let mut per_ring: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut remaining = ranked.iter().copied().peekable();
        let mut ring = 1usize;
        while remaining.peek().is_some() {
            let capacity = self.config.ring_capacity_base * ring;
            let members: Vec<usize> = remaining.by_ref().take(capacity).collect();
            per_ring.push((ring, members));
            ring += 1;
        }

        // Bookkeeping for every ring before any radius math, so inner
        // sums see the complete ledger.
        for (ring, members) in &per_ring {
            for &i in members {
                self.ring_of.insert(nodes[i].id.clone(), *ring);
                self.ledger.sync_node(&nodes[i], &self.config.radii, *ring);
            }
        }

        let mut targets = HashMap::with_capacity(ranked.len());
        for (ring, members) in &per_ring {
            let occupancy = members.len() as f32;
            for (slot, &i) in members.iter().enumerate() {
                let id = &nodes[i].id;
                let angle = TWELVE_O_CLOCK + slot as f32 * TAU / occupancy;
                let radius = self
                    .descriptor
                    .ring_rule
                    .radius(&self.config, *ring, members.len())
                    + self.ledger.self_delta(id)
                    + self.ledger.inner_sum(*ring, Some(id))
                    + focus_delta;
                self.angles.insert(id.clone(), angle);
                targets.insert(id.clone(), polar(angle, radius));
            }
        }
        targets
    }

    /// Initial pass: hard-place nodes that have never been positioned;
    /// everyone else glides to their target under the ring force.
    pub(crate) fn place_rings(&mut self, substrate: &mut Substrate) {
        let targets = self.assign_rings(substrate.nodes());
        for node in substrate.nodes_mut() {
            if !node.kind.is_content() || node.is_focus() {
                continue;
            }
            if node.is_pinned() || node.x != 0.0 || node.y != 0.0 {
                continue;
            }
            if let Some(&(x, y)) = targets.get(&node.id) {
                node.place(x, y);
            }
        }
    }

    /// Recompute targets and swap them into the registered ring force.
    pub(crate) fn refresh_ring_targets(&mut self, substrate: &mut Substrate) {
        let targets = self.assign_rings(substrate.nodes());
        substrate.register_force(
            "ring_target",
            Box::new(RingTarget::new(self.config.ring_target_strength, targets)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::geometry::normalize_angle;
    use crate::topology::TopologyDescriptor;
    use crate::types::{NodeGroup, NodeKind, NodeMode};

    fn focus(id: &str) -> Node {
        let mut node = Node::new(id, NodeKind::Question, NodeGroup::Central);
        node.mode = NodeMode::Detail;
        node
    }

    fn statement(id: &str, ratio: f64) -> Node {
        let mut node = Node::new(id, NodeKind::Statement, NodeGroup::Live);
        node.metadata.consensus_ratio = Some(ratio);
        node
    }

    fn ranked_set(count: usize) -> Vec<Node> {
        std::iter::once(focus("topic"))
            .chain((0..count).map(|i| {
                // s0 ranks best.
                statement(&format!("s{i}"), 1.0 - i as f64 / 100.0)
            }))
            .collect()
    }

    fn rings_fixture(nodes: Vec<Node>) -> (ViewStrategy, Substrate) {
        let mut strategy = ViewStrategy::new(
            TopologyDescriptor::consensus_universe(),
            LayoutConfig::default(),
        );
        let mut substrate = Substrate::new();
        strategy.update_data(&mut substrate, nodes, Vec::new());
        (strategy, substrate)
    }

    fn target_radius(targets: &HashMap<String, (f32, f32)>, id: &str) -> f32 {
        let (x, y) = targets[id];
        (x * x + y * y).sqrt()
    }

    #[test]
    fn test_ring_capacity_grows_linearly() {
        let (strategy, _) = rings_fixture(ranked_set(20));
        let occupancy = |ring: usize| {
            strategy
                .ring_of
                .values()
                .filter(|&&r| r == ring)
                .count()
        };
        assert_eq!(occupancy(1), 6);
        assert_eq!(occupancy(2), 12);
        assert_eq!(occupancy(3), 2);
    }

    #[test]
    fn test_best_consensus_fills_inner_ring() {
        let (strategy, _) = rings_fixture(ranked_set(8));
        for i in 0..6 {
            assert_eq!(strategy.ring_of[format!("s{i}").as_str()], 1);
        }
        assert_eq!(strategy.ring_of["s6"], 2);
        assert_eq!(strategy.ring_of["s7"], 2);
    }

    #[test]
    fn test_full_ring_spreads_evenly() {
        let (mut strategy, substrate) = rings_fixture(ranked_set(6));
        strategy.assign_rings(substrate.nodes());
        let mut angles: Vec<f32> = (0..6)
            .map(|i| normalize_angle(strategy.angles[format!("s{i}").as_str()]))
            .collect();
        angles.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in angles.windows(2) {
            assert!((pair[1] - pair[0] - TAU / 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_ring_radii_step_outward() {
        let (mut strategy, substrate) = rings_fixture(ranked_set(8));
        let config = LayoutConfig::default();
        let targets = strategy.assign_rings(substrate.nodes());
        assert!((target_radius(&targets, "s0") - config.consensus_ring_base).abs() < 1e-3);
        let second = config.consensus_ring_base + config.consensus_ring_step;
        assert!((target_radius(&targets, "s7") - second).abs() < 1e-3);
    }

    #[test]
    fn test_hiding_inner_node_pulls_outer_ring_in() {
        let (mut strategy, mut substrate) = rings_fixture(ranked_set(8));
        strategy.on_visibility_change(&mut substrate, "s0", true);

        let config = LayoutConfig::default();
        let delta = config.radii.hidden_delta(NodeKind::Statement);
        assert!(delta < 0.0);

        let targets = strategy.assign_rings(substrate.nodes());
        let expected = config.consensus_ring_base + config.consensus_ring_step + delta;
        assert!((target_radius(&targets, "s7") - expected).abs() < 1e-3);
        // Ring mates of the hidden node do not move.
        assert!((target_radius(&targets, "s1") - config.consensus_ring_base).abs() < 1e-3);
    }

    #[test]
    fn test_previewed_focus_pulls_every_ring_in() {
        let (mut strategy, mut substrate) = rings_fixture(ranked_set(8));
        strategy.on_mode_change(&mut substrate, "topic", NodeMode::Preview);

        let config = LayoutConfig::default();
        let preview = config.radii.radius(NodeKind::Question, NodeMode::Preview, false);
        let detail = config.radii.radius(NodeKind::Question, NodeMode::Detail, false);
        let focus_delta = (preview - detail) / 2.0;
        assert!(focus_delta < 0.0);

        let targets = strategy.assign_rings(substrate.nodes());
        let expected = config.consensus_ring_base + focus_delta;
        assert!((target_radius(&targets, "s0") - expected).abs() < 1e-3);
    }

    #[test]
    fn test_detail_ring_node_stays_unpinned() {
        let (mut strategy, mut substrate) = rings_fixture(ranked_set(8));
        strategy.on_mode_change(&mut substrate, "s3", NodeMode::Detail);
        assert!(!substrate.find("s3").unwrap().is_pinned());
    }
}
