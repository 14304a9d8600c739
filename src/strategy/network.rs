//! Free-form network placement
//!
//! Statement graphs have no useful deterministic shape, so placement
//! here only seeds: every node that has never been placed is scattered
//! inside a centered disc at a position derived from its id alone. The
//! force stack (charge, links, radial rank bias, collision) does the
//! actual arranging while the simulation cools.
//!
//! Seeding from the id rather than from iteration order or a shared RNG
//! means a node scatters to the same spot in every session, and the
//! arrival of unrelated nodes cannot move it.

use std::collections::HashMap;
use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use crate::forces::RadialBias;
use crate::geometry::polar;
use crate::substrate::Substrate;
use crate::types::Node;

use super::ViewStrategy;

/// Namespace under which node ids are hashed into scatter seeds. Fixed:
/// changing it reshuffles the seed position of every node ever placed.
const SCATTER_NAMESPACE: Uuid = Uuid::from_u128(0x9e97_25fd_54c4_4dd0_a7f0_7f35_1b6e_d1a4);

/// Stable 64-bit scatter seed for one node id.
fn scatter_seed(id: &str) -> u64 {
    let digest = Uuid::new_v5(&SCATTER_NAMESPACE, id.as_bytes()).into_bytes();
    u64::from_le_bytes([
        digest[0], digest[1], digest[2], digest[3], digest[4], digest[5], digest[6], digest[7],
    ])
}

impl ViewStrategy {
    /// Rank bookkeeping shared by the force-driven shapes: ring index is
    /// rank + 1 under the active criterion, and the ledger tracks each
    /// node's current size state. Returns the ranked indexes.
    pub(crate) fn refresh_rank_bookkeeping(&mut self, nodes: &[Node]) -> Vec<usize> {
        let ranked = self.ranked_content(nodes);
        for (rank, &i) in ranked.iter().enumerate() {
            let node = &nodes[i];
            self.ring_of.insert(node.id.clone(), rank + 1);
            self.ledger.sync_node(node, &self.config.radii, rank + 1);
        }
        ranked
    }

    /// Seed positions for a free-form network. Only nodes still at the
    /// unplaced origin are scattered; everything else keeps the position
    /// the forces found for it.
    pub(crate) fn place_network(&mut self, substrate: &mut Substrate) {
        self.refresh_rank_bookkeeping(substrate.nodes());
        let radius = self.scatter_radius();
        for node in substrate.nodes_mut() {
            if !node.kind.is_content() || node.is_focus() {
                continue;
            }
            if node.is_pinned() || node.x != 0.0 || node.y != 0.0 {
                continue;
            }
            let mut rng = StdRng::seed_from_u64(scatter_seed(&node.id));
            let angle = rng.gen_range(0.0..TAU);
            // Square root keeps the scatter uniform over the disc's area
            // instead of bunching at the center.
            let distance = rng.gen::<f32>().sqrt() * radius;
            let (x, y) = polar(angle, distance);
            node.place(x, y);
        }
    }

    /// Per-node radial targets for the rank bias force. The best rank
    /// sits on the inner band, the worst on the outer, and an expanded
    /// node's target absorbs its own ledger delta so neighbors get room.
    pub(crate) fn radial_targets(&mut self, nodes: &[Node]) -> HashMap<String, f32> {
        let ranked = self.refresh_rank_bookkeeping(nodes);
        let count = ranked.len();
        let mut targets = HashMap::with_capacity(count);
        for (rank, &i) in ranked.iter().enumerate() {
            let band = self
                .descriptor
                .ring_rule
                .radius(&self.config, rank + 1, count);
            let id = &nodes[i].id;
            targets.insert(id.clone(), band + self.ledger.self_delta(id));
        }
        targets
    }

    /// Recompute rank targets and swap them into the registered radial
    /// force, so size changes take effect without a data update.
    pub(crate) fn refresh_radial_targets(&mut self, substrate: &mut Substrate) {
        let targets = self.radial_targets(substrate.nodes());
        substrate.register_force(
            "radial",
            Box::new(RadialBias::new(self.config.radial_strength, targets)),
        );
    }

    fn scatter_radius(&self) -> f32 {
        let (width, height) = self.dims;
        width.min(height) * 0.4
    }
}
