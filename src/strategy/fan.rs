//! Leader-and-fan placement
//!
//! One leading content node sits just past the focus perimeter on a fixed
//! bearing; every other content node fans out vote-ranked from the
//! opposite side, each on its own slightly wider ring, walking the circle
//! in golden-angle steps so the fan stays spread at any sibling count.
//!
//! Radii are closed-form: ring radius from the descriptor's ring rule,
//! adjusted by the node's own expansion/hidden delta, the focus node's
//! delta, and the ledger sum of every delta recorded strictly inside the
//! ring. Re-running the pass with unchanged inputs reproduces positions
//! exactly, which is what makes expand/collapse and hide/show fully
//! reversible.

use std::f32::consts::PI;

use tracing::warn;

use crate::geometry::{fan_angle, polar};
use crate::substrate::Substrate;
use crate::topology::RootPlacement;
use crate::types::NodeGroup;

use super::{place_or_pin, ViewStrategy};

impl ViewStrategy {
    /// Full deterministic placement of the leader and the fan.
    pub(crate) fn place_fan(&mut self, substrate: &mut Substrate) {
        let (leader_angle, fan_start) = match self.descriptor.root_placement {
            RootPlacement::LeaderFan {
                leader_angle,
                fan_start,
            } => (leader_angle, fan_start),
            _ => (0.0, PI),
        };
        let focus_delta = self.focus_delta(substrate.nodes());
        let Some(focus_radius) = substrate
            .nodes()
            .iter()
            .find(|n| n.is_focus())
            .map(|f| f.radius)
        else {
            warn!("fan placement skipped: no focus node");
            return;
        };

        let mut leader: Option<usize> = None;
        let mut fan: Vec<usize> = Vec::new();
        for (i, node) in substrate.nodes().iter().enumerate() {
            if !node.kind.is_content() || node.is_focus() {
                continue;
            }
            match node.group {
                NodeGroup::Live if leader.is_none() => leader = Some(i),
                NodeGroup::Live => {
                    warn!(id = %node.id, "extra live node in fan view, placing in the fan");
                    fan.push(i);
                }
                _ => fan.push(i),
            }
        }

        // Rank by net votes, descending. Pre-ordering by the previous
        // slot makes the stable vote sort keep prior order on ties, so
        // equal-vote siblings never swap between passes.
        fan.sort_by_key(|&i| {
            (
                self.slots
                    .get(&substrate.nodes()[i].id)
                    .copied()
                    .unwrap_or(usize::MAX),
                i,
            )
        });
        fan.sort_by(|&a, &b| {
            let va = substrate.nodes()[a].metadata.net_votes.unwrap_or(0);
            let vb = substrate.nodes()[b].metadata.net_votes.unwrap_or(0);
            vb.cmp(&va)
        });

        // Bookkeeping for every content node first, so the inner sums
        // below see the complete ledger.
        if let Some(li) = leader {
            let snapshot = substrate.nodes()[li].clone();
            self.slots.remove(&snapshot.id);
            self.ring_of.insert(snapshot.id.clone(), 0);
            self.ledger.sync_node(&snapshot, &self.config.radii, 0);
        }
        for (slot, &i) in fan.iter().enumerate() {
            let snapshot = substrate.nodes()[i].clone();
            self.slots.insert(snapshot.id.clone(), slot);
            self.ring_of.insert(snapshot.id.clone(), slot + 1);
            self.ledger.sync_node(&snapshot, &self.config.radii, slot + 1);
        }

        // Leader: perimeter to perimeter with the focus, pushed out by
        // half its own growth when expanded.
        if let Some(li) = leader {
            let (id, kind) = {
                let node = &substrate.nodes()[li];
                (node.id.clone(), node.kind)
            };
            let distance =
                focus_radius + self.baseline_radius(kind) + self.ledger.self_delta(&id);
            let (x, y) = polar(leader_angle, distance);
            place_or_pin(&mut substrate.nodes_mut()[li], x, y);
            self.angles.insert(id, leader_angle);
        }

        // Fan: one ring per slot, golden-angle bearings.
        let count = fan.len();
        for (slot, &i) in fan.iter().enumerate() {
            let id = substrate.nodes()[i].id.clone();
            let ring = slot + 1;
            let angle = fan_angle(fan_start, slot, self.config.fan_spacing);
            let distance = self.descriptor.ring_rule.radius(&self.config, ring, count)
                + self.ledger.self_delta(&id)
                + focus_delta
                + self.ledger.inner_sum(ring, Some(&id));
            let (x, y) = polar(angle, distance);
            place_or_pin(&mut substrate.nodes_mut()[i], x, y);
            self.angles.insert(id, angle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LayoutConfig;
    use crate::topology::TopologyDescriptor;
    use crate::types::{Node, NodeKind, NodeMode};

    fn focus(id: &str) -> Node {
        let mut node = Node::new(id, NodeKind::Word, NodeGroup::Central);
        node.mode = NodeMode::Detail;
        node
    }

    fn leader(id: &str) -> Node {
        Node::new(id, NodeKind::Definition, NodeGroup::Live)
    }

    fn alternative(id: &str, votes: i64) -> Node {
        let mut node = Node::new(id, NodeKind::Definition, NodeGroup::Alternative);
        node.metadata.net_votes = Some(votes);
        node
    }

    fn fan_fixture(nodes: Vec<Node>) -> (ViewStrategy, Substrate) {
        let mut strategy = ViewStrategy::new(
            TopologyDescriptor::word_definition_fan(),
            LayoutConfig::default(),
        );
        let mut substrate = Substrate::new();
        strategy.update_data(&mut substrate, nodes, Vec::new());
        (strategy, substrate)
    }

    fn distance(substrate: &Substrate, id: &str) -> f32 {
        let node = substrate.find(id).unwrap();
        (node.x * node.x + node.y * node.y).sqrt()
    }

    #[test]
    fn test_votes_decide_slot_order() {
        let (strategy, substrate) = fan_fixture(vec![
            focus("word"),
            alternative("nine", 9),
            alternative("twenty", 20),
            alternative("fifteen", 15),
        ]);

        assert_eq!(strategy.slots["twenty"], 0);
        assert_eq!(strategy.slots["fifteen"], 1);
        assert_eq!(strategy.slots["nine"], 2);

        // Slot 0 is the innermost ring.
        assert!(distance(&substrate, "twenty") < distance(&substrate, "fifteen"));
        assert!(distance(&substrate, "fifteen") < distance(&substrate, "nine"));
    }

    #[test]
    fn test_vote_ties_keep_prior_order() {
        let (mut strategy, mut substrate) = fan_fixture(vec![
            focus("word"),
            alternative("first", 5),
            alternative("second", 5),
        ]);
        assert_eq!(strategy.slots["first"], 0);
        assert_eq!(strategy.slots["second"], 1);

        // Same votes, reversed input order: prior slots win.
        strategy.update_data(
            &mut substrate,
            vec![
                focus("word"),
                alternative("second", 5),
                alternative("first", 5),
            ],
            Vec::new(),
        );
        assert_eq!(strategy.slots["first"], 0);
        assert_eq!(strategy.slots["second"], 1);
    }

    #[test]
    fn test_leader_sits_on_focus_perimeter() {
        let (_, substrate) = fan_fixture(vec![
            focus("word"),
            leader("live"),
            alternative("alt", 1),
        ]);
        let config = LayoutConfig::default();
        let expected = config.radii.radius(NodeKind::Word, NodeMode::Detail, false)
            + config.radii.radius(NodeKind::Definition, NodeMode::Preview, false);

        let live = substrate.find("live").unwrap();
        assert!((live.x - expected).abs() < 1e-3, "leader sits at 3 o'clock");
        assert!(live.y.abs() < 1e-3);
    }

    #[test]
    fn test_fan_starts_opposite_the_leader() {
        let (strategy, _) = fan_fixture(vec![
            focus("word"),
            leader("live"),
            alternative("alt", 1),
        ]);
        assert!((strategy.angles["alt"] - PI).abs() < 1e-6);
        assert_eq!(strategy.angles["live"], 0.0);
    }

    #[test]
    fn test_expanding_leader_pushes_whole_fan_outward() {
        let (mut strategy, mut substrate) = fan_fixture(vec![
            focus("word"),
            leader("live"),
            alternative("alt-a", 8),
            alternative("alt-b", 3),
        ]);
        let before_a = distance(&substrate, "alt-a");
        let before_b = distance(&substrate, "alt-b");

        strategy.on_mode_change(&mut substrate, "live", NodeMode::Detail);

        let delta = LayoutConfig::default()
            .radii
            .expansion_delta(NodeKind::Definition);
        assert!((distance(&substrate, "alt-a") - before_a - delta).abs() < 1e-3);
        assert!((distance(&substrate, "alt-b") - before_b - delta).abs() < 1e-3);
        // The expanded leader is pinned where it was placed.
        assert!(substrate.find("live").unwrap().is_pinned());
    }

    #[test]
    fn test_expanding_inner_sibling_shifts_outer_rings_only() {
        let (mut strategy, mut substrate) = fan_fixture(vec![
            focus("word"),
            leader("live"),
            alternative("inner", 20),
            alternative("outer", 9),
        ]);
        let leader_before = distance(&substrate, "live");
        let inner_before = distance(&substrate, "inner");
        let outer_before = distance(&substrate, "outer");

        strategy.on_mode_change(&mut substrate, "inner", NodeMode::Detail);

        let delta = LayoutConfig::default()
            .radii
            .expansion_delta(NodeKind::Definition);
        // The expanded node itself moves out by half its growth; the ring
        // beyond it absorbs the same delta; the leader is untouched.
        assert!((distance(&substrate, "inner") - inner_before - delta).abs() < 1e-3);
        assert!((distance(&substrate, "outer") - outer_before - delta).abs() < 1e-3);
        assert!((distance(&substrate, "live") - leader_before).abs() < 1e-4);
    }

    #[test]
    fn test_focus_preview_pulls_content_inward() {
        let (mut strategy, mut substrate) = fan_fixture(vec![
            focus("word"),
            leader("live"),
            alternative("alt", 4),
        ]);
        let config = LayoutConfig::default();
        let leader_before = distance(&substrate, "live");
        let alt_before = distance(&substrate, "alt");

        strategy.on_mode_change(&mut substrate, "word", NodeMode::Preview);

        // The leader tracks the focus radius directly, the fan absorbs
        // half the shrink.
        let shrink = config.radii.radius(NodeKind::Word, NodeMode::Detail, false)
            - config.radii.radius(NodeKind::Word, NodeMode::Preview, false);
        assert!((leader_before - distance(&substrate, "live") - shrink).abs() < 1e-3);
        assert!((alt_before - distance(&substrate, "alt") - shrink / 2.0).abs() < 1e-3);
    }

    #[test]
    fn test_hide_then_show_restores_exactly() {
        let (mut strategy, mut substrate) = fan_fixture(vec![
            focus("word"),
            alternative("inner", 20),
            alternative("outer", 9),
        ]);
        let inner_before = (
            substrate.find("inner").unwrap().x,
            substrate.find("inner").unwrap().y,
        );
        let outer_before = distance(&substrate, "outer");

        strategy.on_visibility_change(&mut substrate, "inner", true);
        let pulled = LayoutConfig::default()
            .radii
            .hidden_delta(NodeKind::Definition);
        assert!((distance(&substrate, "outer") - (outer_before + pulled)).abs() < 1e-3);

        strategy.on_visibility_change(&mut substrate, "inner", false);
        let inner = substrate.find("inner").unwrap();
        assert!((inner.x - inner_before.0).abs() < 1e-4);
        assert!((inner.y - inner_before.1).abs() < 1e-4);
        assert!((distance(&substrate, "outer") - outer_before).abs() < 1e-4);
    }

    #[test]
    fn test_fan_survives_missing_leader() {
        let (strategy, substrate) = fan_fixture(vec![focus("word"), alternative("alt", 2)]);
        assert!(distance(&substrate, "alt") > 0.0);
        assert_eq!(strategy.ring_of["alt"], 1);
    }
}
