//! Reply-tree placement
//!
//! Adjacency comes from reply metadata, never from the edge array: each
//! content node names its parent, unresolved or cyclic references are
//! promoted to roots (a dangling reply must stay visible, not vanish).
//! Ring index equals depth, roots at 1.
//!
//! Roots fan golden-angle around the focus on the root ring; children
//! open in an angular arc centered on the parent's own bearing, offset
//! from the parent's live position so a subtree moves as a unit.
//! Previously-seen nodes keep their remembered angle when the tree is
//! re-placed, so structural updates do not reshuffle what the user is
//! already reading.

use std::collections::{HashMap, HashSet, VecDeque};

use smallvec::SmallVec;
use tracing::warn;

use crate::geometry::{fan_angle, polar, TWELVE_O_CLOCK};
use crate::substrate::Substrate;
use crate::topology::RootPlacement;
use crate::types::{Node, NodeKind};

use super::{place_or_pin, ViewStrategy};

/// Parent/child adjacency resolved from reply metadata for one pass.
pub(crate) struct TreeIndex {
    /// Child id to parent id, resolved references only.
    pub parent_of: HashMap<String, String>,
    /// Parent id to child indexes, in input order.
    pub children_of: HashMap<String, SmallVec<[usize; 4]>>,
    /// Indexes of nodes placed on the root ring.
    pub roots: Vec<usize>,
    /// Node id to depth; roots at 1.
    pub depth_of: HashMap<String, usize>,
}

/// Breadth-first depth assignment from one seed whose depth is already
/// recorded. Stops at nodes that already have a depth, which is also the
/// cycle brake.
fn assign_depths(
    nodes: &[Node],
    children_of: &HashMap<String, SmallVec<[usize; 4]>>,
    depth_of: &mut HashMap<String, usize>,
    seed: usize,
) {
    let mut queue = VecDeque::from([seed]);
    while let Some(parent_index) = queue.pop_front() {
        let Some(&parent_depth) = depth_of.get(nodes[parent_index].id.as_str()) else {
            continue;
        };
        let Some(children) = children_of.get(nodes[parent_index].id.as_str()) else {
            continue;
        };
        for &child in children {
            if !depth_of.contains_key(&nodes[child].id) {
                depth_of.insert(nodes[child].id.clone(), parent_depth + 1);
                queue.push_back(child);
            }
        }
    }
}

impl ViewStrategy {
    /// Resolve reply adjacency for the current node set. Content nodes
    /// whose parent reference is missing, self-referential, or part of a
    /// cycle are promoted to roots after a log line.
    pub(crate) fn build_tree_index(&self, nodes: &[Node]) -> TreeIndex {
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        let mut parent_of: HashMap<String, String> = HashMap::new();
        let mut children_of: HashMap<String, SmallVec<[usize; 4]>> = HashMap::new();
        let mut roots: Vec<usize> = Vec::new();

        for (i, node) in nodes.iter().enumerate() {
            if !node.kind.is_content() || node.is_focus() {
                continue;
            }
            match node.metadata.tree_parent() {
                Some(parent) if parent != node.id && ids.contains(parent) => {
                    parent_of.insert(node.id.clone(), parent.to_string());
                    children_of.entry(parent.to_string()).or_default().push(i);
                }
                Some(parent) => {
                    warn!(
                        id = %node.id,
                        parent = %parent,
                        "reply parent unresolved, promoting to root"
                    );
                    roots.push(i);
                }
                None => roots.push(i),
            }
        }

        let mut depth_of: HashMap<String, usize> = HashMap::new();
        for &root in &roots {
            depth_of.insert(nodes[root].id.clone(), 1);
        }
        for &root in &roots {
            assign_depths(nodes, &children_of, &mut depth_of, root);
        }

        // Anything still unvisited sits on a parent cycle. Break the
        // cycle at its first node in input order and walk the rest.
        for (i, node) in nodes.iter().enumerate() {
            if !node.kind.is_content() || node.is_focus() || depth_of.contains_key(&node.id) {
                continue;
            }
            warn!(id = %node.id, "reply cycle detected, promoting to root");
            if let Some(old_parent) = parent_of.remove(&node.id) {
                if let Some(children) = children_of.get_mut(&old_parent) {
                    children.retain(|c| *c != i);
                }
            }
            roots.push(i);
            depth_of.insert(node.id.clone(), 1);
            assign_depths(nodes, &children_of, &mut depth_of, i);
        }

        TreeIndex {
            parent_of,
            children_of,
            roots,
            depth_of,
        }
    }

    /// Full deterministic placement of the forest.
    pub(crate) fn place_tree(&mut self, substrate: &mut Substrate) {
        let index = self.build_tree_index(substrate.nodes());
        let focus_delta = self.focus_delta(substrate.nodes());

        // Bookkeeping for every reply before any distance math, so the
        // parent deltas and inner sums below see the complete ledger.
        for node in substrate.nodes() {
            if !node.kind.is_content() || node.is_focus() {
                continue;
            }
            let depth = index.depth_of.get(&node.id).copied().unwrap_or(1);
            self.ring_of.insert(node.id.clone(), depth);
            self.ledger.sync_node(node, &self.config.radii, depth);
        }

        let start = self.root_fan_start();
        for &root in &index.roots {
            let id = substrate.nodes()[root].id.clone();
            let slot = self.root_slot(&id);
            let angle = fan_angle(start, slot, 1.0);
            let distance = self.descriptor.ring_rule.radius(&self.config, 1, 0)
                + self.ledger.self_delta(&id)
                + focus_delta;
            let (x, y) = polar(angle, distance);
            place_or_pin(&mut substrate.nodes_mut()[root], x, y);
            self.angles.insert(id, angle);
        }

        self.place_children_breadth_first(substrate, &index, &index.roots, focus_delta);
    }

    /// Re-place one node and its descendants after a state change. Other
    /// subtrees keep their exact positions: a child's distance is
    /// measured from its own parent, so growth cascades along the parent
    /// chain and nowhere else.
    pub(crate) fn replace_tree_subtree(&mut self, substrate: &mut Substrate, changed_id: &str) {
        let index = self.build_tree_index(substrate.nodes());
        let focus_delta = self.focus_delta(substrate.nodes());
        let Some(changed_index) = substrate.index_of(changed_id) else {
            return;
        };

        if let Some(parent_id) = index.parent_of.get(changed_id).cloned() {
            let angle = self
                .angles
                .get(changed_id)
                .copied()
                .unwrap_or(TWELVE_O_CLOCK);
            let depth = index.depth_of.get(changed_id).copied().unwrap_or(1);
            let kind = substrate.nodes()[changed_index].kind;
            let (x, y) = self.tree_child_position(
                substrate,
                changed_id,
                kind,
                &parent_id,
                angle,
                depth,
                focus_delta,
            );
            place_or_pin(&mut substrate.nodes_mut()[changed_index], x, y);
        } else {
            let id = changed_id.to_string();
            let slot = self.root_slot(&id);
            let angle = fan_angle(self.root_fan_start(), slot, 1.0);
            let distance = self.descriptor.ring_rule.radius(&self.config, 1, 0)
                + self.ledger.self_delta(changed_id)
                + focus_delta;
            let (x, y) = polar(angle, distance);
            place_or_pin(&mut substrate.nodes_mut()[changed_index], x, y);
            self.angles.insert(id, angle);
        }

        self.place_children_breadth_first(substrate, &index, &[changed_index], focus_delta);
    }

    /// Walk children breadth-first from the seeds, placing each child
    /// along its remembered angle; newcomers get a fresh arc slot
    /// centered on the parent's bearing.
    fn place_children_breadth_first(
        &mut self,
        substrate: &mut Substrate,
        index: &TreeIndex,
        seeds: &[usize],
        focus_delta: f32,
    ) {
        let mut queue: VecDeque<usize> = seeds.iter().copied().collect();
        while let Some(parent_index) = queue.pop_front() {
            let parent_id = substrate.nodes()[parent_index].id.clone();
            let Some(children) = index.children_of.get(&parent_id) else {
                continue;
            };
            let arc = self.descriptor.child_arc.width(children.len());
            let parent_angle = self.angles.get(&parent_id).copied().unwrap_or_else(|| {
                let parent = &substrate.nodes()[parent_index];
                parent.y.atan2(parent.x)
            });
            let count = children.len() as f32;
            for (k, &child) in children.iter().enumerate() {
                let arc_slot = parent_angle - arc / 2.0 + arc * (k as f32 + 1.0) / (count + 1.0);
                let (child_id, child_kind) = {
                    let node = &substrate.nodes()[child];
                    (node.id.clone(), node.kind)
                };
                let angle = self.angles.get(&child_id).copied().unwrap_or(arc_slot);
                let depth = index.depth_of.get(&child_id).copied().unwrap_or(2);
                let (x, y) = self.tree_child_position(
                    substrate,
                    &child_id,
                    child_kind,
                    &parent_id,
                    angle,
                    depth,
                    focus_delta,
                );
                place_or_pin(&mut substrate.nodes_mut()[child], x, y);
                self.angles.insert(child_id, angle);
                queue.push_back(child);
            }
        }
    }

    /// Child position: preferred form offsets from the parent's live
    /// position, so subtrees stay visually clustered and growth shifts
    /// exactly the chain below it. When the parent cannot be found the
    /// child falls back to an absolute depth ring driven by the global
    /// ledger cascade.
    #[allow(clippy::too_many_arguments)]
    fn tree_child_position(
        &self,
        substrate: &Substrate,
        child_id: &str,
        child_kind: NodeKind,
        parent_id: &str,
        angle: f32,
        depth: usize,
        focus_delta: f32,
    ) -> (f32, f32) {
        if let Some(parent) = substrate.find(parent_id) {
            let distance = self.baseline_radius(parent.kind)
                + self.ledger.self_delta(parent_id)
                + self.baseline_radius(child_kind)
                + self.ledger.self_delta(child_id)
                + self.config.child_padding;
            let (dx, dy) = polar(angle, distance);
            (parent.x + dx, parent.y + dy)
        } else {
            let distance = self.descriptor.ring_rule.radius(&self.config, depth, 0)
                + self.ledger.self_delta(child_id)
                + self.ledger.inner_sum(depth, Some(child_id))
                + focus_delta;
            polar(angle, distance)
        }
    }

    fn root_fan_start(&self) -> f32 {
        match self.descriptor.root_placement {
            RootPlacement::GoldenFan { start } => start,
            _ => TWELVE_O_CLOCK,
        }
    }

    /// Persistent golden slot for a root. Slots are handed out once per
    /// id and never reused, so surviving roots keep their bearing across
    /// updates.
    fn root_slot(&mut self, id: &str) -> usize {
        if let Some(&slot) = self.slots.get(id) {
            return slot;
        }
        let slot = self.next_root_slot;
        self.next_root_slot += 1;
        self.slots.insert(id.to_string(), slot);
        slot
    }
}
