//! Expansion and visibility bookkeeping
//!
//! Each node that is currently expanded (detail mode) or hidden carries a
//! signed radius delta relative to its visible preview size. Outer rings
//! sum the deltas of every entry at a strictly smaller ring index so that
//! growth inside the layout pushes the outside outward and shrinkage pulls
//! it inward. Entries are keyed by node id and survive data updates until
//! the node reverts to visible preview or leaves the set.

use std::collections::{HashMap, HashSet};

use crate::geometry::RadiusTable;
use crate::types::{Node, NodeMode};

/// One bookkeeping entry: where the node sits and how far its current
/// radius deviates from visible preview, halved (the placement rules work
/// in half-deltas so a grown node's perimeter, not its center, stays put).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentEntry {
    pub ring_index: usize,
    pub delta: f32,
}

/// Identity-keyed delta ledger shared by the fan and tree placement rules.
#[derive(Debug, Clone, Default)]
pub struct AdjustmentLedger {
    entries: HashMap<String, AdjustmentEntry>,
}

impl AdjustmentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the delta for a node, replacing any prior entry. A zero
    /// delta removes the entry instead (the node is back at baseline).
    pub fn record(&mut self, id: &str, ring_index: usize, delta: f32) {
        if delta.abs() < f32::EPSILON {
            self.entries.remove(id);
        } else {
            self.entries
                .insert(id.to_string(), AdjustmentEntry { ring_index, delta });
        }
    }

    /// Derive and record the entry for a node from its current state.
    ///
    /// The delta is half the difference between the node's current radius
    /// and its visible-preview radius: positive when expanded, negative
    /// when hidden, zero (entry removed) when back to visible preview.
    pub fn sync_node(&mut self, node: &Node, radii: &RadiusTable, ring_index: usize) {
        let current = radii.radius(node.kind, node.mode, node.hidden);
        let baseline = radii.radius(node.kind, NodeMode::Preview, false);
        self.record(&node.id, ring_index, (current - baseline) / 2.0);
    }

    /// The node's own delta, zero if it has no entry.
    pub fn self_delta(&self, id: &str) -> f32 {
        self.entries.get(id).map(|e| e.delta).unwrap_or(0.0)
    }

    /// Sum of deltas over every entry at a strictly smaller ring index,
    /// optionally excluding one node id. This is the outward cascade: a
    /// node's placement radius absorbs all growth and shrinkage recorded
    /// inside it, regardless of which subtree the change happened in.
    pub fn inner_sum(&self, ring_index: usize, exclude: Option<&str>) -> f32 {
        self.entries
            .iter()
            .filter(|(id, entry)| {
                entry.ring_index < ring_index && exclude != Some(id.as_str())
            })
            .map(|(_, entry)| entry.delta)
            .sum()
    }

    /// Re-home an entry after a data update moved the node to a different
    /// ring (e.g. a reply's depth changed). No-op if the node has no entry.
    pub fn update_ring_index(&mut self, id: &str, ring_index: usize) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.ring_index = ring_index;
        }
    }

    /// Drop entries for nodes no longer present.
    pub fn retain_ids(&mut self, live: &HashSet<&str>) {
        self.entries.retain(|id, _| live.contains(id.as_str()));
    }

    pub fn get(&self, id: &str) -> Option<&AdjustmentEntry> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
