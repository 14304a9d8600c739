//! Radial layout engine for interactive knowledge graphs
//!
//! Computes 2-D positions for the node-and-edge views of a discussion
//! graph: a fixed central focus, an evenly spaced navigation ring, and
//! content arranged per view shape (vote-ranked fans, recursive reply
//! trees, free-form force networks, consensus-ranked concentric rings).
//!
//! ## Architecture
//! One engine owns one simulation substrate and one view strategy:
//! Host data -> ViewStrategy placement -> Substrate relaxation -> Frame
//!
//! Every topology is a [`TopologyDescriptor`]: a root placement rule, a
//! ring radius rule, a child arc, and a capability set. The strategy
//! dispatches on the descriptor, so adding a view shape is descriptor
//! composition, not a new strategy type. Live mutations run under a
//! scoped stop-mutate-restart guard, and per-identity bookkeeping keeps
//! placements stable while the host replaces data underneath.
//!
//! ## Quick Start
//!
//! ```rust
//! use radial_layout::{
//!     LayoutEngine, Node, NodeGroup, NodeKind, NodeMode, TopologyDescriptor,
//! };
//!
//! let mut engine = LayoutEngine::new(TopologyDescriptor::word_definition_fan());
//!
//! let mut word = Node::new("word", NodeKind::Word, NodeGroup::Central);
//! word.mode = NodeMode::Detail;
//! let definition = Node::new("def", NodeKind::Definition, NodeGroup::Live);
//!
//! engine.update_data(vec![word, definition], Vec::new(), true);
//!
//! let frame = engine.frame();
//! assert_eq!(frame.nodes.len(), 2);
//! let word = engine.find("word").unwrap();
//! assert_eq!((word.x, word.y), (0.0, 0.0));
//! ```

// Typed errors for the fallible surface
pub mod error;

// Node, edge, and role vocabulary
pub mod types;

// Tunable distances, strengths, and radius tables
pub mod config;

// Angle and radius primitives
pub mod geometry;

// Expansion/visibility adjustment ledger
pub mod expansion;

// Force simulation substrate and mutation guard
pub mod substrate;

// The pluggable force implementations
pub mod forces;

// Focus pinning and the navigation ring
pub mod ring;

// View topology descriptors and presets
pub mod topology;

// The one placement strategy, shaped by a descriptor
pub mod strategy;

// Host-facing engine and frame types
pub mod engine;

// Public surface for embedding hosts
pub use config::{ChildArc, LayoutConfig};
pub use engine::{LayoutEngine, LayoutFrame, LayoutStats, PlacedNode};
pub use error::{LayoutError, LayoutResult};
pub use expansion::{AdjustmentEntry, AdjustmentLedger};
pub use forces::{Collide, Links, ManyBody, RadialBias, RingTarget, TreeSpacing};
pub use geometry::{
    fan_angle, normalize_angle, polar, RadiusTable, GOLDEN_ANGLE, TWELVE_O_CLOCK,
};
pub use ring::{connector_anchor, connector_divisor, place_navigation_ring, RingPlacement};
pub use strategy::ViewStrategy;
pub use substrate::{Force, ForceContext, MutationGuard, Substrate};
pub use topology::{Capabilities, RingRadiusRule, RootPlacement, TopologyDescriptor, ViewShape};
pub use types::{
    Edge, EdgeKind, Node, NodeGroup, NodeKind, NodeMetadata, NodeMode, SortDirection, SortKey,
};
