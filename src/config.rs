//! Layout configuration
//!
//! All tunable sizes, gaps, and force parameters in one place, with
//! defaults matched to the stock view shapes. Hosts override via struct
//! update or the builder-style setters and validate before use.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use crate::error::{LayoutError, LayoutResult};
use crate::geometry::RadiusTable;

/// Configuration for the radial layout engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LayoutConfig {
    /// Radius-by-state lookup shared by every shape.
    pub radii: RadiusTable,

    // =========================================================================
    // NAVIGATION RING
    // =========================================================================
    /// Gap between the focus perimeter and the navigation ring.
    pub navigation_gap: f32,
    /// Smaller gap used when the focus is the control hub.
    pub control_gap: f32,
    /// Divisor applied to the focus radius when computing where a
    /// connector line touches the focus perimeter.
    pub focus_connector_shrink: f32,
    /// Connector shrink divisor for the control-hub focus.
    pub control_connector_shrink: f32,

    // =========================================================================
    // VOTE-RANKED FAN
    // =========================================================================
    /// Base ring distance of the first alternative slot.
    pub fan_base_step: f32,
    /// Per-slot ring growth: `ring = base * (1 + slot * increment)`.
    pub fan_increment: f32,
    /// Golden-angle spacing multiplier for alternatives.
    pub fan_spacing: f32,

    // =========================================================================
    // REPLY TREE
    // =========================================================================
    /// Ring distance of depth-1 replies.
    pub root_ring_radius: f32,
    /// Ring growth per depth level (absolute fallback path).
    pub tree_ring_step: f32,
    /// Padding added to the parent/child radii when computing the ideal
    /// parent distance.
    pub child_padding: f32,

    // =========================================================================
    // FREE NETWORK
    // =========================================================================
    /// Innermost target radius for the rank-driven radial bias.
    pub network_inner_radius: f32,
    /// Outermost target radius for the rank-driven radial bias.
    pub network_outer_radius: f32,

    // =========================================================================
    // CONSENSUS RINGS
    // =========================================================================
    /// Radius of consensus ring 1.
    pub consensus_ring_base: f32,
    /// Radius growth per consensus ring.
    pub consensus_ring_step: f32,
    /// Ring k holds roughly `ring_capacity_base * k` nodes.
    pub ring_capacity_base: usize,

    // =========================================================================
    // FORCES
    // =========================================================================
    /// Pairwise repulsion strength (positive pushes nodes apart).
    pub charge_strength: f32,
    /// Resting length of edge springs.
    pub link_distance: f32,
    /// Edge spring stiffness in (0, 1].
    pub link_strength: f32,
    /// Extra clearance enforced between node perimeters.
    pub collide_padding: f32,
    /// Overlap-relief passes per tick.
    pub collide_iterations: usize,
    /// Pull toward the rank-assigned radius (free network).
    pub radial_strength: f32,
    /// Pull toward the assigned ring/angle point (consensus rings).
    pub ring_target_strength: f32,
    /// Per-tick nudge toward the ideal parent distance (reply tree).
    pub tree_spacing_strength: f32,

    // =========================================================================
    // RELAXATION
    // =========================================================================
    /// Temperature floor the simulation decays toward.
    pub alpha_min: f32,
    /// Per-tick decay rate toward the target temperature.
    pub alpha_decay: f32,
    /// Velocity retained per tick after integration.
    pub damping: f32,
    /// Synchronous ticks run when a data update skips animation.
    pub settle_ticks: usize,
    /// Temperature the simulation restarts at after a guarded mutation;
    /// near-zero so re-entry does not visibly jump.
    pub restart_alpha: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            radii: RadiusTable::default(),

            navigation_gap: 110.0,
            control_gap: 40.0,
            focus_connector_shrink: 9.0,
            control_connector_shrink: 18.0,

            fan_base_step: 230.0,
            fan_increment: 0.18,
            fan_spacing: 1.0,

            root_ring_radius: 260.0,
            tree_ring_step: 150.0,
            child_padding: 24.0,

            network_inner_radius: 180.0,
            network_outer_radius: 620.0,

            consensus_ring_base: 240.0,
            consensus_ring_step: 150.0,
            ring_capacity_base: 6,

            charge_strength: 180.0,
            link_distance: 160.0,
            link_strength: 0.4,
            collide_padding: 6.0,
            collide_iterations: 2,
            radial_strength: 0.08,
            ring_target_strength: 0.06,
            tree_spacing_strength: 0.12,

            alpha_min: 0.001,
            alpha_decay: 0.0228,
            damping: 0.6,
            settle_ticks: 120,
            restart_alpha: 0.05,
        }
    }
}

impl LayoutConfig {
    pub fn with_radii(mut self, radii: RadiusTable) -> Self {
        self.radii = radii;
        self
    }

    pub fn with_navigation_gap(mut self, gap: f32) -> Self {
        self.navigation_gap = gap;
        self
    }

    pub fn with_settle_ticks(mut self, ticks: usize) -> Self {
        self.settle_ticks = ticks;
        self
    }

    /// Check that the configuration is usable before handing it to an
    /// engine.
    pub fn validate(&self) -> LayoutResult<()> {
        fn positive(name: &str, value: f32) -> LayoutResult<()> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(LayoutError::InvalidConfig {
                    message: format!("{} must be positive, got {}", name, value),
                })
            }
        }

        positive("radii.hidden_radius", self.radii.hidden_radius)?;
        positive("radii.scale", self.radii.scale)?;
        positive("navigation_gap", self.navigation_gap)?;
        positive("control_gap", self.control_gap)?;
        positive("focus_connector_shrink", self.focus_connector_shrink)?;
        positive("control_connector_shrink", self.control_connector_shrink)?;
        positive("fan_base_step", self.fan_base_step)?;
        positive("root_ring_radius", self.root_ring_radius)?;
        positive("tree_ring_step", self.tree_ring_step)?;
        positive("consensus_ring_base", self.consensus_ring_base)?;
        positive("consensus_ring_step", self.consensus_ring_step)?;
        positive("link_distance", self.link_distance)?;

        if self.network_outer_radius <= self.network_inner_radius {
            return Err(LayoutError::InvalidConfig {
                message: format!(
                    "network_outer_radius ({}) must exceed network_inner_radius ({})",
                    self.network_outer_radius, self.network_inner_radius
                ),
            });
        }
        if self.ring_capacity_base == 0 {
            return Err(LayoutError::InvalidConfig {
                message: "ring_capacity_base must be at least 1".to_string(),
            });
        }
        if !(0.0..1.0).contains(&self.alpha_decay) || self.alpha_decay <= 0.0 {
            return Err(LayoutError::InvalidConfig {
                message: format!("alpha_decay must be in (0, 1), got {}", self.alpha_decay),
            });
        }
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(LayoutError::InvalidConfig {
                message: format!("damping must be in [0, 1], got {}", self.damping),
            });
        }
        Ok(())
    }
}

/// Child-arc rule for tree shapes: arc width grows with child count and
/// is clamped to `[min, max]`. Radians.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChildArc {
    pub per_child: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for ChildArc {
    fn default() -> Self {
        Self {
            per_child: 0.3 * PI,
            min: 0.5 * PI,
            max: 1.5 * PI,
        }
    }
}

impl ChildArc {
    /// Arc width for a node with `count` children.
    pub fn width(&self, count: usize) -> f32 {
        (count as f32 * self.per_child).clamp(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_negative_gap_rejected() {
        let config = LayoutConfig {
            navigation_gap: -5.0,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("navigation_gap"));
    }

    #[test]
    fn test_inverted_network_band_rejected() {
        let config = LayoutConfig {
            network_inner_radius: 700.0,
            network_outer_radius: 600.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_child_arc_clamps() {
        let arc = ChildArc::default();
        assert!((arc.width(1) - 0.5 * PI).abs() < 1e-6);
        assert!((arc.width(3) - 0.9 * PI).abs() < 1e-6);
        assert!((arc.width(50) - 1.5 * PI).abs() < 1e-6);
    }
}
