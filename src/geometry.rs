//! Geometry primitives for radial placement
//!
//! Pure functions only: golden-angle fans, polar conversion, and the
//! radius-by-state lookup every other module derives sizes from.

use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI, TAU};

use crate::types::{NodeKind, NodeMode};

/// pi * (3 - sqrt(5)): the n-th sibling placed at `n` multiples of this
/// angle is near-uniformly spread on the circle for every prefix length,
/// so fans stay stable as siblings are added incrementally.
pub const GOLDEN_ANGLE: f32 = PI * (3.0 - 2.236_068);

/// Screen-space "12 o'clock" (+y points down, angles clockwise).
pub const TWELVE_O_CLOCK: f32 = -FRAC_PI_2;

/// Angle of the n-th sibling in a golden-angle fan.
///
/// `spacing` widens (>1) or narrows (<1) the fan when the sibling count
/// calls for it; 1.0 is the plain golden-angle walk.
pub fn fan_angle(start: f32, index: usize, spacing: f32) -> f32 {
    start + GOLDEN_ANGLE * index as f32 * spacing
}

/// Polar to Cartesian in layout space.
pub fn polar(angle: f32, radius: f32) -> (f32, f32) {
    (radius * angle.cos(), radius * angle.sin())
}

/// Normalize an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let a = angle % TAU;
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

/// Radius lookup table: a pure, total function of `(kind, mode, hidden)`.
///
/// `hidden` takes precedence (the minimal constant), then detail mode
/// (largest), else the preview size. Base sizes are hand-tuned per kind;
/// `scale` is a uniform multiplier for responsive hosts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RadiusTable {
    /// Radius of any hidden node, regardless of kind or mode.
    pub hidden_radius: f32,
    /// Uniform multiplier applied to the per-kind base sizes.
    pub scale: f32,
}

impl Default for RadiusTable {
    fn default() -> Self {
        Self {
            hidden_radius: 12.0,
            scale: 1.0,
        }
    }
}

impl RadiusTable {
    fn preview_of(kind: NodeKind) -> f32 {
        match kind {
            NodeKind::Word => 70.0,
            NodeKind::Definition => 55.0,
            NodeKind::Question => 70.0,
            NodeKind::Answer => 55.0,
            NodeKind::Statement => 55.0,
            NodeKind::Comment => 40.0,
            NodeKind::CommentForm => 45.0,
            NodeKind::Navigation => 32.0,
            NodeKind::ControlHub => 90.0,
        }
    }

    fn detail_of(kind: NodeKind) -> f32 {
        match kind {
            NodeKind::Word => 160.0,
            NodeKind::Definition => 130.0,
            NodeKind::Question => 160.0,
            NodeKind::Answer => 130.0,
            NodeKind::Statement => 130.0,
            NodeKind::Comment => 100.0,
            NodeKind::CommentForm => 110.0,
            NodeKind::Navigation => 46.0,
            NodeKind::ControlHub => 140.0,
        }
    }

    /// The radius of a node in the given state.
    pub fn radius(&self, kind: NodeKind, mode: NodeMode, hidden: bool) -> f32 {
        if hidden {
            return self.hidden_radius;
        }
        let base = match mode {
            NodeMode::Detail => Self::detail_of(kind),
            NodeMode::Preview => Self::preview_of(kind),
        };
        base * self.scale
    }

    /// Outward push registered when a node of this kind expands:
    /// half the detail/preview size difference.
    pub fn expansion_delta(&self, kind: NodeKind) -> f32 {
        (Self::detail_of(kind) - Self::preview_of(kind)) * self.scale / 2.0
    }

    /// Inward pull registered when a node of this kind hides:
    /// half the preview/hidden size difference, negative.
    pub fn hidden_delta(&self, kind: NodeKind) -> f32 {
        -(Self::preview_of(kind) * self.scale - self.hidden_radius) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT_KINDS: [NodeKind; 7] = [
        NodeKind::Word,
        NodeKind::Definition,
        NodeKind::Question,
        NodeKind::Answer,
        NodeKind::Statement,
        NodeKind::Comment,
        NodeKind::CommentForm,
    ];

    #[test]
    fn test_golden_angle_value() {
        let expected = PI * (3.0 - 5.0_f32.sqrt());
        assert!((GOLDEN_ANGLE - expected).abs() < 1e-5);
        assert!((GOLDEN_ANGLE - 2.399_963).abs() < 1e-4);
    }

    #[test]
    fn test_fan_angle_walks_in_golden_steps() {
        let a0 = fan_angle(0.0, 0, 1.0);
        let a1 = fan_angle(0.0, 1, 1.0);
        let a2 = fan_angle(0.0, 2, 1.0);
        assert_eq!(a0, 0.0);
        assert!((a1 - GOLDEN_ANGLE).abs() < 1e-6);
        assert!((a2 - 2.0 * GOLDEN_ANGLE).abs() < 1e-6);

        let wide = fan_angle(1.0, 3, 1.5);
        assert!((wide - (1.0 + GOLDEN_ANGLE * 4.5)).abs() < 1e-5);
    }

    #[test]
    fn test_polar_twelve_o_clock_points_up() {
        let (x, y) = polar(TWELVE_O_CLOCK, 100.0);
        assert!(x.abs() < 1e-4);
        assert!((y + 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_normalize_angle_wraps_negatives() {
        assert!((normalize_angle(-FRAC_PI_2) - (TAU - FRAC_PI_2)).abs() < 1e-6);
        assert!((normalize_angle(TAU + 1.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_radius_ordering_per_content_kind() {
        let table = RadiusTable::default();
        for kind in CONTENT_KINDS {
            let detail = table.radius(kind, NodeMode::Detail, false);
            let preview = table.radius(kind, NodeMode::Preview, false);
            let hidden = table.radius(kind, NodeMode::Preview, true);
            assert!(detail > preview, "{:?}: detail must exceed preview", kind);
            assert!(preview > hidden, "{:?}: preview must exceed hidden", kind);
        }
    }

    #[test]
    fn test_hidden_overrides_mode() {
        let table = RadiusTable::default();
        assert_eq!(
            table.radius(NodeKind::Word, NodeMode::Detail, true),
            table.hidden_radius
        );
    }

    #[test]
    fn test_deltas_signed_as_documented() {
        let table = RadiusTable::default();
        for kind in CONTENT_KINDS {
            assert!(table.expansion_delta(kind) > 0.0);
            assert!(table.hidden_delta(kind) < 0.0);
        }
        // Expansion delta is half the detail/preview gap.
        assert_eq!(table.expansion_delta(NodeKind::Comment), (100.0 - 40.0) / 2.0);
    }
}
