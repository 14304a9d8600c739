//! View topology descriptors
//!
//! One strategy implementation serves every view; what differs between a
//! word-definition fan and a consensus universe is captured here as data:
//! how leading content is placed around the focus, how a ring index maps
//! to a radius, how wide a child arc opens, and which capabilities (tree
//! bookkeeping, force relaxation, ranked rings) the view opts into.
//!
//! Hosts pick one of the six presets and hand it to the engine; exotic
//! hosts can assemble a custom descriptor from the same parts.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::{ChildArc, LayoutConfig};
use crate::geometry::TWELVE_O_CLOCK;

/// Which of the known view families a descriptor belongs to. Purely a
/// tag: behavior comes from the descriptor fields, not from this enum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViewShape {
    SingleFocus,
    WordDefinition,
    QuestionAnswer,
    ReplyTree,
    StatementNetwork,
    ConsensusUniverse,
}

impl ViewShape {
    /// Parse an external tag, falling back to the single-focus shape on
    /// anything unknown.
    pub fn parse(tag: &str) -> Self {
        match tag {
            "single_focus" => ViewShape::SingleFocus,
            "word_definition" => ViewShape::WordDefinition,
            "question_answer" => ViewShape::QuestionAnswer,
            "reply_tree" => ViewShape::ReplyTree,
            "statement_network" => ViewShape::StatementNetwork,
            "consensus_universe" => ViewShape::ConsensusUniverse,
            other => {
                warn!(shape = %other, "unknown view shape, defaulting to single_focus");
                ViewShape::SingleFocus
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewShape::SingleFocus => "single_focus",
            ViewShape::WordDefinition => "word_definition",
            ViewShape::QuestionAnswer => "question_answer",
            ViewShape::ReplyTree => "reply_tree",
            ViewShape::StatementNetwork => "statement_network",
            ViewShape::ConsensusUniverse => "consensus_universe",
        }
    }
}

/// What a view opts into. Mutating operations consult these instead of
/// matching on the shape tag: sort criteria only apply to rank-driven
/// views, tree bookkeeping only to views that resolve reply parents, and
/// so on.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Capabilities {
    /// Resolve reply parents, assign depths, and keep subtrees spaced.
    pub supports_tree: bool,
    /// Run the free relaxation stack (charge, links, collision, radial
    /// bias) until equilibrium.
    pub supports_forces: bool,
    /// Assign nodes to concentric rank rings and pull them toward their
    /// ring targets.
    pub supports_ranked_rings: bool,
}

/// How the leading content of a view is placed around the focus.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum RootPlacement {
    /// Focus and navigation ring only; no content placement at all.
    FocusOnly,
    /// One leading node on a fixed bearing, every other content node in
    /// a golden-angle fan.
    LeaderFan { leader_angle: f32, fan_start: f32 },
    /// Tree roots in a golden-angle fan; descendants nest in arcs.
    GoldenFan { start: f32 },
    /// Deterministic per-id scatter, then force relaxation.
    SeededScatter,
    /// Rank-ordered concentric rings.
    RankedRings,
}

/// Maps a 1-based ring index to a radius. Every deterministic radius in
/// the crate funnels through this so a descriptor fully decides the
/// radial profile of its view.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RingRadiusRule {
    /// `fan_base_step * (1 + slot * fan_increment)`, slot = ring - 1.
    /// Each fan sibling gets its own slightly wider ring.
    FanSteps,
    /// `root_ring_radius + (ring - 1) * tree_ring_step`: even spacing
    /// per tree depth.
    DepthSteps,
    /// Linear band between the network's inner and outer radius; `count`
    /// is the number of ranked nodes sharing the band.
    RankBand,
    /// `consensus_ring_base + (ring - 1) * consensus_ring_step`.
    ConsensusRings,
}

impl RingRadiusRule {
    /// Radius for `ring` (1-based). `count` only matters for the rank
    /// band, where ranks interpolate across a fixed annulus.
    pub fn radius(&self, config: &LayoutConfig, ring: usize, count: usize) -> f32 {
        let step = ring.saturating_sub(1) as f32;
        match self {
            RingRadiusRule::FanSteps => config.fan_base_step * (1.0 + step * config.fan_increment),
            RingRadiusRule::DepthSteps => config.root_ring_radius + step * config.tree_ring_step,
            RingRadiusRule::RankBand => {
                if count <= 1 {
                    return config.network_inner_radius;
                }
                let t = step / (count - 1) as f32;
                config.network_inner_radius
                    + (config.network_outer_radius - config.network_inner_radius) * t
            }
            RingRadiusRule::ConsensusRings => {
                config.consensus_ring_base + step * config.consensus_ring_step
            }
        }
    }
}

/// Everything that distinguishes one view from another, as plain data.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct TopologyDescriptor {
    pub shape: ViewShape,
    pub capabilities: Capabilities,
    pub root_placement: RootPlacement,
    pub ring_rule: RingRadiusRule,
    pub child_arc: ChildArc,
}

impl TopologyDescriptor {
    /// A lone focus node with its navigation ring. Used by dashboards
    /// and as the fallback for unknown shape tags.
    pub fn single_focus() -> Self {
        Self {
            shape: ViewShape::SingleFocus,
            capabilities: Capabilities::default(),
            root_placement: RootPlacement::FocusOnly,
            ring_rule: RingRadiusRule::FanSteps,
            child_arc: ChildArc::default(),
        }
    }

    /// A word with its live definition leading at 3 o'clock and the
    /// alternatives fanned out vote-ranked from the opposite side.
    pub fn word_definition_fan() -> Self {
        Self {
            shape: ViewShape::WordDefinition,
            capabilities: Capabilities::default(),
            root_placement: RootPlacement::LeaderFan {
                leader_angle: 0.0,
                fan_start: PI,
            },
            ring_rule: RingRadiusRule::FanSteps,
            child_arc: ChildArc::default(),
        }
    }

    /// A question with its answers, structurally the same fan as the
    /// word-definition view.
    pub fn question_answer_fan() -> Self {
        Self {
            shape: ViewShape::QuestionAnswer,
            ..Self::word_definition_fan()
        }
    }

    /// Threaded replies: roots fanned around the focus, children nested
    /// in arcs, with spacing and collision forces keeping subtrees
    /// readable.
    pub fn reply_tree() -> Self {
        Self {
            shape: ViewShape::ReplyTree,
            capabilities: Capabilities {
                supports_tree: true,
                ..Capabilities::default()
            },
            root_placement: RootPlacement::GoldenFan {
                start: TWELVE_O_CLOCK,
            },
            ring_rule: RingRadiusRule::DepthSteps,
            child_arc: ChildArc::default(),
        }
    }

    /// Free-form statement network: deterministic scatter, then charge,
    /// link, collision, and rank-biased radial forces settle it.
    pub fn statement_network() -> Self {
        Self {
            shape: ViewShape::StatementNetwork,
            capabilities: Capabilities {
                supports_forces: true,
                ..Capabilities::default()
            },
            root_placement: RootPlacement::SeededScatter,
            ring_rule: RingRadiusRule::RankBand,
            child_arc: ChildArc::default(),
        }
    }

    /// Consensus-ranked concentric rings, innermost ring holding the
    /// highest-ranked nodes, with a soft pull toward each ring target.
    pub fn consensus_universe() -> Self {
        Self {
            shape: ViewShape::ConsensusUniverse,
            capabilities: Capabilities {
                supports_ranked_rings: true,
                ..Capabilities::default()
            },
            root_placement: RootPlacement::RankedRings,
            ring_rule: RingRadiusRule::ConsensusRings,
            child_arc: ChildArc::default(),
        }
    }

    /// Preset lookup by shape tag.
    pub fn for_shape(shape: ViewShape) -> Self {
        match shape {
            ViewShape::SingleFocus => Self::single_focus(),
            ViewShape::WordDefinition => Self::word_definition_fan(),
            ViewShape::QuestionAnswer => Self::question_answer_fan(),
            ViewShape::ReplyTree => Self::reply_tree(),
            ViewShape::StatementNetwork => Self::statement_network(),
            ViewShape::ConsensusUniverse => Self::consensus_universe(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_tags_round_trip() {
        let shapes = [
            ViewShape::SingleFocus,
            ViewShape::WordDefinition,
            ViewShape::QuestionAnswer,
            ViewShape::ReplyTree,
            ViewShape::StatementNetwork,
            ViewShape::ConsensusUniverse,
        ];
        for shape in shapes {
            assert_eq!(ViewShape::parse(shape.as_str()), shape);
        }
        assert_eq!(ViewShape::parse("garbage"), ViewShape::SingleFocus);
    }

    #[test]
    fn test_presets_carry_expected_capabilities() {
        assert_eq!(
            TopologyDescriptor::single_focus().capabilities,
            Capabilities::default()
        );
        assert!(TopologyDescriptor::reply_tree().capabilities.supports_tree);
        assert!(
            TopologyDescriptor::statement_network()
                .capabilities
                .supports_forces
        );
        assert!(
            TopologyDescriptor::consensus_universe()
                .capabilities
                .supports_ranked_rings
        );
        // Fans are fully deterministic: no capabilities at all.
        let fan = TopologyDescriptor::word_definition_fan();
        assert_eq!(fan.capabilities, Capabilities::default());
    }

    #[test]
    fn test_question_fan_matches_word_fan_structurally() {
        let word = TopologyDescriptor::word_definition_fan();
        let question = TopologyDescriptor::question_answer_fan();
        assert_eq!(word.root_placement, question.root_placement);
        assert_eq!(word.ring_rule, question.ring_rule);
        assert_ne!(word.shape, question.shape);
    }

    #[test]
    fn test_fan_steps_widen_per_slot() {
        let config = LayoutConfig::default();
        let rule = RingRadiusRule::FanSteps;
        let first = rule.radius(&config, 1, 10);
        let second = rule.radius(&config, 2, 10);
        assert_eq!(first, config.fan_base_step);
        assert!(
            (second - config.fan_base_step * (1.0 + config.fan_increment)).abs() < 1e-4
        );
    }

    #[test]
    fn test_depth_steps_linear_in_depth() {
        let config = LayoutConfig::default();
        let rule = RingRadiusRule::DepthSteps;
        assert_eq!(rule.radius(&config, 1, 0), config.root_ring_radius);
        assert_eq!(
            rule.radius(&config, 3, 0),
            config.root_ring_radius + 2.0 * config.tree_ring_step
        );
    }

    #[test]
    fn test_rank_band_spans_the_annulus() {
        let config = LayoutConfig::default();
        let rule = RingRadiusRule::RankBand;
        assert_eq!(rule.radius(&config, 1, 5), config.network_inner_radius);
        assert_eq!(rule.radius(&config, 5, 5), config.network_outer_radius);
        // A single node sits on the inner edge.
        assert_eq!(rule.radius(&config, 1, 1), config.network_inner_radius);

        let middle = rule.radius(&config, 3, 5);
        assert!(middle > config.network_inner_radius);
        assert!(middle < config.network_outer_radius);
    }

    #[test]
    fn test_consensus_rings_step_outward() {
        let config = LayoutConfig::default();
        let rule = RingRadiusRule::ConsensusRings;
        assert_eq!(rule.radius(&config, 1, 0), config.consensus_ring_base);
        assert_eq!(
            rule.radius(&config, 2, 0) - rule.radius(&config, 1, 0),
            config.consensus_ring_step
        );
    }

    #[test]
    fn test_for_shape_round_trips_presets() {
        let tree = TopologyDescriptor::for_shape(ViewShape::ReplyTree);
        assert_eq!(tree, TopologyDescriptor::reply_tree());
    }
}
