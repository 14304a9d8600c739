//! Navigation ring placement
//!
//! Shared by every view shape: the focus node is pinned to the origin and
//! its navigation controls are pinned on a surrounding ring at equal
//! angular steps, starting from 12 o'clock and walking clockwise (screen
//! coordinates, +y down). Forces never touch these nodes afterwards; the
//! substrate's clamp phase re-asserts the pins tick after tick.
//!
//! Each member records its `{angle, ring_radius}` pair on the node so the
//! rendering layer can draw connector lines from the ring back to a point
//! near the focus centre (see [`connector_anchor`]).

use std::f32::consts::TAU;

use smallvec::SmallVec;
use tracing::warn;

use crate::config::LayoutConfig;
use crate::geometry::{polar, RadiusTable, TWELVE_O_CLOCK};
use crate::types::{Node, NodeGroup};

/// One placed navigation control.
#[derive(Debug, Clone, PartialEq)]
pub struct RingSlot {
    pub id: String,
    /// Angle from the +x axis, clockwise on screen.
    pub angle: f32,
    /// Distance of the ring from the origin.
    pub ring_radius: f32,
}

/// Result of a ring placement pass: which node anchors the ring and where
/// its controls ended up.
#[derive(Debug, Clone, PartialEq)]
pub struct RingPlacement {
    pub focus_id: String,
    pub focus_group: NodeGroup,
    /// Focus radius at placement time, already refreshed from the table.
    pub focus_radius: f32,
    pub ring_radius: f32,
    pub slots: SmallVec<[RingSlot; 8]>,
}

/// Pin the focus node at the origin and its navigation controls on a ring
/// around it.
///
/// The ring sits at `focus_radius + gap`, where the gap depends on the
/// focus role: control hubs pack their controls tighter than content
/// views do. Members are spread at exactly `2π / N` steps from 12
/// o'clock, in array order.
///
/// Returns `None` (after logging) when the set has no focus node; the
/// whole placement pass is skipped in that case so existing positions
/// survive. With several focus candidates the first wins.
pub fn place_navigation_ring(
    nodes: &mut [Node],
    radii: &RadiusTable,
    config: &LayoutConfig,
) -> Option<RingPlacement> {
    let Some(focus_index) = nodes.iter().position(Node::is_focus) else {
        warn!("navigation ring skipped: no focus node in set");
        return None;
    };
    let extras = nodes.iter().filter(|n| n.is_focus()).count() - 1;
    if extras > 0 {
        warn!(
            extras,
            first = %nodes[focus_index].id,
            "multiple focus nodes in set, keeping the first at the origin"
        );
    }

    let (focus_group, focus_radius) = {
        let focus = &mut nodes[focus_index];
        focus.radius = radii.radius(focus.kind, focus.mode, focus.hidden);
        focus.pin_at(0.0, 0.0);
        (focus.group, focus.radius)
    };

    let gap = match focus_group {
        NodeGroup::ControlHub => config.control_gap,
        _ => config.navigation_gap,
    };
    let ring_radius = focus_radius + gap;

    let members: SmallVec<[usize; 8]> = nodes
        .iter()
        .enumerate()
        .filter(|(_, n)| n.group == NodeGroup::Navigation)
        .map(|(i, _)| i)
        .collect();

    let mut slots: SmallVec<[RingSlot; 8]> = SmallVec::new();
    if !members.is_empty() {
        let step = TAU / members.len() as f32;
        for (slot, &member_index) in members.iter().enumerate() {
            let angle = TWELVE_O_CLOCK + slot as f32 * step;
            let (x, y) = polar(angle, ring_radius);
            let node = &mut nodes[member_index];
            node.radius = radii.radius(node.kind, node.mode, node.hidden);
            node.pin_at(x, y);
            node.angle = Some(angle);
            node.ring_radius = Some(ring_radius);
            slots.push(RingSlot {
                id: node.id.clone(),
                angle,
                ring_radius,
            });
        }
    }

    Some(RingPlacement {
        focus_id: nodes[focus_index].id.clone(),
        focus_group,
        focus_radius,
        ring_radius,
        slots,
    })
}

/// Divisor applied to the focus radius when computing connector anchor
/// points. Empirical: content focus nodes look right with their
/// connectors meeting at radius / 9, the denser control hubs at
/// radius / 18.
pub fn connector_divisor(focus_group: NodeGroup, config: &LayoutConfig) -> f32 {
    match focus_group {
        NodeGroup::ControlHub => config.control_connector_shrink,
        _ => config.focus_connector_shrink,
    }
}

/// Point where the connector line for a ring member at `angle` touches
/// the focus node, shrunk toward the centre by the per-role divisor.
pub fn connector_anchor(
    focus_radius: f32,
    focus_group: NodeGroup,
    angle: f32,
    config: &LayoutConfig,
) -> (f32, f32) {
    polar(angle, focus_radius / connector_divisor(focus_group, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::normalize_angle;
    use crate::types::{NodeKind, NodeMode};

    fn focus(id: &str) -> Node {
        let mut node = Node::new(id, NodeKind::Word, NodeGroup::Central);
        node.mode = NodeMode::Detail;
        node
    }

    fn control(id: &str) -> Node {
        Node::new(id, NodeKind::Navigation, NodeGroup::Navigation)
    }

    fn ring_fixture(controls: usize) -> Vec<Node> {
        let mut nodes = vec![focus("word")];
        for i in 0..controls {
            nodes.push(control(&format!("nav-{i}")));
        }
        nodes
    }

    #[test]
    fn test_focus_pinned_at_origin() {
        let mut nodes = ring_fixture(3);
        let placement =
            place_navigation_ring(&mut nodes, &RadiusTable::default(), &LayoutConfig::default())
                .unwrap();

        assert_eq!(placement.focus_id, "word");
        assert_eq!((nodes[0].x, nodes[0].y), (0.0, 0.0));
        assert_eq!((nodes[0].fx, nodes[0].fy), (Some(0.0), Some(0.0)));
    }

    #[test]
    fn test_members_spread_uniformly_from_twelve_o_clock() {
        let mut nodes = ring_fixture(5);
        let placement =
            place_navigation_ring(&mut nodes, &RadiusTable::default(), &LayoutConfig::default())
                .unwrap();

        assert_eq!(placement.slots.len(), 5);
        assert!((placement.slots[0].angle - TWELVE_O_CLOCK).abs() < 1e-6);

        let step = TAU / 5.0;
        for pair in placement.slots.windows(2) {
            let gap = normalize_angle(pair[1].angle - pair[0].angle);
            assert!((gap - step).abs() < 1e-5, "gap {gap} != step {step}");
        }
    }

    #[test]
    fn test_ring_radius_tracks_focus_radius_and_gap() {
        let config = LayoutConfig::default();
        let radii = RadiusTable::default();

        let mut nodes = ring_fixture(2);
        let placement = place_navigation_ring(&mut nodes, &radii, &config).unwrap();
        let detail_word = radii.radius(NodeKind::Word, NodeMode::Detail, false);
        assert_eq!(placement.ring_radius, detail_word + config.navigation_gap);

        // Members remember their geometry for the connector pass.
        assert_eq!(nodes[1].ring_radius, Some(placement.ring_radius));
        assert!(nodes[1].angle.is_some());
        assert!(nodes[1].is_pinned());
    }

    #[test]
    fn test_control_hub_uses_tighter_gap_and_divisor() {
        let config = LayoutConfig::default();
        let radii = RadiusTable::default();

        let mut nodes = vec![
            Node::new("hub", NodeKind::ControlHub, NodeGroup::ControlHub),
            control("nav-0"),
        ];
        let placement = place_navigation_ring(&mut nodes, &radii, &config).unwrap();

        let hub_radius = radii.radius(NodeKind::ControlHub, NodeMode::Preview, false);
        assert_eq!(placement.ring_radius, hub_radius + config.control_gap);
        assert_eq!(
            connector_divisor(placement.focus_group, &config),
            config.control_connector_shrink
        );
    }

    #[test]
    fn test_no_focus_skips_placement() {
        let mut nodes = vec![control("nav-0")];
        let before = (nodes[0].x, nodes[0].y);
        let placement =
            place_navigation_ring(&mut nodes, &RadiusTable::default(), &LayoutConfig::default());
        assert!(placement.is_none());
        assert_eq!((nodes[0].x, nodes[0].y), before);
        assert!(!nodes[0].is_pinned());
    }

    #[test]
    fn test_multiple_focus_first_wins() {
        let mut nodes = vec![focus("first"), focus("second"), control("nav-0")];
        let placement =
            place_navigation_ring(&mut nodes, &RadiusTable::default(), &LayoutConfig::default())
                .unwrap();
        assert_eq!(placement.focus_id, "first");
        assert_eq!((nodes[0].fx, nodes[0].fy), (Some(0.0), Some(0.0)));
        // The second candidate is left where it was, not pinned to the origin.
        assert_eq!((nodes[1].fx, nodes[1].fy), (None, None));
    }

    #[test]
    fn test_empty_ring_still_pins_focus() {
        let mut nodes = vec![focus("word")];
        let placement =
            place_navigation_ring(&mut nodes, &RadiusTable::default(), &LayoutConfig::default())
                .unwrap();
        assert!(placement.slots.is_empty());
        assert!(nodes[0].is_pinned());
    }

    #[test]
    fn test_connector_anchor_on_shrunk_perimeter() {
        let config = LayoutConfig::default();
        let (x, y) = connector_anchor(90.0, NodeGroup::Central, 0.0, &config);
        assert!((x - 90.0 / config.focus_connector_shrink).abs() < 1e-5);
        assert!(y.abs() < 1e-5);
    }
}
