//! Force implementations
//!
//! Small, direct O(n²) passes. Node sets here are view-sized (tens, not
//! thousands), so none of the forces use spatial indexing. Each force
//! collects its displacements first and applies them second, so reads of
//! other nodes' positions never observe a half-applied pass.

use std::collections::HashMap;

use crate::substrate::{Force, ForceContext};
use crate::types::{Edge, Node};

/// Direction and length between two points, with a deterministic
/// fallback direction for coincident points.
fn separation(ax: f32, ay: f32, bx: f32, by: f32) -> (f32, f32, f32) {
    let dx = bx - ax;
    let dy = by - ay;
    let dist = (dx * dx + dy * dy).sqrt();
    if dist < 1e-6 {
        (1e-3, 0.0, 1e-3)
    } else {
        (dx, dy, dist)
    }
}

// =============================================================================
// MANY-BODY REPULSION
// =============================================================================

/// Pairwise inverse-square repulsion. Positive strength pushes nodes
/// apart.
pub struct ManyBody {
    pub strength: f32,
}

impl ManyBody {
    pub fn new(strength: f32) -> Self {
        Self { strength }
    }
}

impl Force for ManyBody {
    fn apply(&mut self, nodes: &mut [Node], _edges: &[Edge], ctx: &ForceContext<'_>) {
        let positions: Vec<(f32, f32)> = nodes.iter().map(|n| (n.x, n.y)).collect();
        let mut deltas = vec![(0.0f32, 0.0f32); nodes.len()];

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                let (ax, ay) = positions[i];
                let (bx, by) = positions[j];
                let (dx, dy, dist) = separation(ax, ay, bx, by);
                let push = self.strength * ctx.alpha / (dist * dist);
                let ux = dx / dist;
                let uy = dy / dist;
                deltas[i].0 -= ux * push;
                deltas[i].1 -= uy * push;
                deltas[j].0 += ux * push;
                deltas[j].1 += uy * push;
            }
        }

        for (node, (dvx, dvy)) in nodes.iter_mut().zip(deltas) {
            node.vx += dvx;
            node.vy += dvy;
        }
    }
}

// =============================================================================
// EDGE SPRINGS
// =============================================================================

/// Spring along every edge toward a resting distance. Per-edge strength
/// in `[0, 1]` scales the pull.
pub struct Links {
    pub distance: f32,
    pub strength: f32,
}

impl Links {
    pub fn new(distance: f32, strength: f32) -> Self {
        Self { distance, strength }
    }
}

impl Force for Links {
    fn apply(&mut self, nodes: &mut [Node], edges: &[Edge], ctx: &ForceContext<'_>) {
        let mut deltas = vec![(0.0f32, 0.0f32); nodes.len()];

        for edge in edges {
            let (Some(&si), Some(&ti)) = (
                ctx.index_of.get(&edge.source),
                ctx.index_of.get(&edge.target),
            ) else {
                continue;
            };
            let (sx, sy) = (nodes[si].x, nodes[si].y);
            let (tx, ty) = (nodes[ti].x, nodes[ti].y);
            let (dx, dy, dist) = separation(sx, sy, tx, ty);

            let k = self.strength * edge.strength.unwrap_or(1.0);
            let stretch = (dist - self.distance) / dist * k * ctx.alpha;
            let mx = dx * stretch * 0.5;
            let my = dy * stretch * 0.5;

            deltas[si].0 += mx;
            deltas[si].1 += my;
            deltas[ti].0 -= mx;
            deltas[ti].1 -= my;
        }

        for (node, (dvx, dvy)) in nodes.iter_mut().zip(deltas) {
            node.vx += dvx;
            node.vy += dvy;
        }
    }
}

// =============================================================================
// OVERLAP RELIEF
// =============================================================================

/// Separates overlapping node circles by moving both apart along their
/// center line, split evenly, repeated for a few passes per tick.
pub struct Collide {
    pub padding: f32,
    pub iterations: usize,
}

impl Collide {
    pub fn new(padding: f32, iterations: usize) -> Self {
        Self { padding, iterations }
    }
}

impl Force for Collide {
    fn apply(&mut self, nodes: &mut [Node], _edges: &[Edge], _ctx: &ForceContext<'_>) {
        for _ in 0..self.iterations.max(1) {
            let snapshot: Vec<(f32, f32, f32)> =
                nodes.iter().map(|n| (n.x, n.y, n.radius)).collect();
            let mut moves = vec![(0.0f32, 0.0f32); nodes.len()];
            let mut any = false;

            for i in 0..snapshot.len() {
                for j in (i + 1)..snapshot.len() {
                    let (ax, ay, ar) = snapshot[i];
                    let (bx, by, br) = snapshot[j];
                    let (dx, dy, dist) = separation(ax, ay, bx, by);
                    let clearance = ar + br + self.padding;
                    if dist >= clearance {
                        continue;
                    }
                    any = true;
                    let overlap = (clearance - dist) / 2.0;
                    let ux = dx / dist;
                    let uy = dy / dist;
                    moves[i].0 -= ux * overlap;
                    moves[i].1 -= uy * overlap;
                    moves[j].0 += ux * overlap;
                    moves[j].1 += uy * overlap;
                }
            }

            if !any {
                break;
            }
            for (node, (mx, my)) in nodes.iter_mut().zip(moves) {
                node.x += mx;
                node.y += my;
            }
        }
    }
}

// =============================================================================
// RANK-DRIVEN RADIAL BIAS
// =============================================================================

/// Pulls each listed node toward a per-node target distance from the
/// origin. Nodes without a target entry are left alone.
pub struct RadialBias {
    pub strength: f32,
    pub targets: HashMap<String, f32>,
}

impl RadialBias {
    pub fn new(strength: f32, targets: HashMap<String, f32>) -> Self {
        Self { strength, targets }
    }
}

impl Force for RadialBias {
    fn apply(&mut self, nodes: &mut [Node], _edges: &[Edge], ctx: &ForceContext<'_>) {
        for node in nodes.iter_mut() {
            let Some(&target) = self.targets.get(&node.id) else {
                continue;
            };
            let (dx, dy, dist) = separation(0.0, 0.0, node.x, node.y);
            let k = (target - dist) * self.strength * ctx.alpha / dist;
            node.vx += dx * k;
            node.vy += dy * k;
        }
    }
}

// =============================================================================
// RING/ANGLE TARGET
// =============================================================================

/// Soft pull toward an assigned point, used by ranked-ring layouts so
/// nodes settle near their slot without being pinned to it.
pub struct RingTarget {
    pub strength: f32,
    pub targets: HashMap<String, (f32, f32)>,
}

impl RingTarget {
    pub fn new(strength: f32, targets: HashMap<String, (f32, f32)>) -> Self {
        Self { strength, targets }
    }
}

impl Force for RingTarget {
    fn apply(&mut self, nodes: &mut [Node], _edges: &[Edge], ctx: &ForceContext<'_>) {
        for node in nodes.iter_mut() {
            let Some(&(tx, ty)) = self.targets.get(&node.id) else {
                continue;
            };
            node.vx += (tx - node.x) * self.strength * ctx.alpha;
            node.vy += (ty - node.y) * self.strength * ctx.alpha;
        }
    }
}

// =============================================================================
// PARENT-DISTANCE MAINTENANCE
// =============================================================================

/// Nudges each reply toward its ideal distance from its parent (both
/// radii plus a fixed padding) instead of pinning it there, leaving room
/// for overlap relief to act before convergence.
pub struct TreeSpacing {
    pub strength: f32,
    pub padding: f32,
    pub parent_of: HashMap<String, String>,
}

impl TreeSpacing {
    pub fn new(strength: f32, padding: f32, parent_of: HashMap<String, String>) -> Self {
        Self {
            strength,
            padding,
            parent_of,
        }
    }
}

impl Force for TreeSpacing {
    fn apply(&mut self, nodes: &mut [Node], _edges: &[Edge], ctx: &ForceContext<'_>) {
        let mut nudges: Vec<(usize, f32, f32)> = Vec::new();

        for (ci, child) in nodes.iter().enumerate() {
            if child.is_pinned() || child.is_focus() {
                continue;
            }
            let Some(parent_id) = self.parent_of.get(&child.id) else {
                continue;
            };
            let Some(&pi) = ctx.index_of.get(parent_id) else {
                continue;
            };
            let parent = &nodes[pi];

            let ideal = parent.radius + child.radius + self.padding;
            let (dx, dy, dist) = separation(parent.x, parent.y, child.x, child.y);
            let k = (ideal - dist) * self.strength * ctx.alpha / dist;
            nudges.push((ci, dx * k, dy * k));
        }

        for (ci, dvx, dvy) in nudges {
            nodes[ci].vx += dvx;
            nodes[ci].vy += dvy;
        }
    }
}
