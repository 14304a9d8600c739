//! Node and edge records for radial layout
//!
//! These types are the intermediate representation handed to the engine by
//! the data-fetch layer and handed back, positioned, to the rendering
//! layer. Role dispatch is carried by closed enums set at construction
//! time; the engine never inspects free-form metadata to decide placement.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Content/type tag for a node, from a closed catalogue.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Word,
    Definition,
    Question,
    Answer,
    #[default]
    Statement,
    Comment,
    /// Ephemeral inline reply form; placed like a comment.
    CommentForm,
    Navigation,
    /// Central control hub shown in the dashboard-style view.
    ControlHub,
}

impl NodeKind {
    /// Parse a string tag into a kind. Unrecognized tags fall back to
    /// [`NodeKind::Statement`] with a warning rather than failing.
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "word" => NodeKind::Word,
            "definition" => NodeKind::Definition,
            "question" | "openquestion" | "open_question" => NodeKind::Question,
            "answer" => NodeKind::Answer,
            "statement" => NodeKind::Statement,
            "comment" | "reply" => NodeKind::Comment,
            "comment_form" | "comment-form" | "reply_form" => NodeKind::CommentForm,
            "navigation" | "nav" => NodeKind::Navigation,
            "control_hub" | "control" | "dashboard" => NodeKind::ControlHub,
            other => {
                warn!("unknown node kind '{}', defaulting to statement", other);
                NodeKind::Statement
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Word => "word",
            NodeKind::Definition => "definition",
            NodeKind::Question => "question",
            NodeKind::Answer => "answer",
            NodeKind::Statement => "statement",
            NodeKind::Comment => "comment",
            NodeKind::CommentForm => "comment_form",
            NodeKind::Navigation => "navigation",
            NodeKind::ControlHub => "control_hub",
        }
    }

    /// Content kinds carry user material and participate in fan/tree/ring
    /// placement; navigation and the control hub do not.
    pub fn is_content(&self) -> bool {
        !matches!(self, NodeKind::Navigation | NodeKind::ControlHub)
    }
}

/// Placement role for a node. This is the auxiliary role marker used for
/// gap and connector selection; it is deliberately separate from
/// [`NodeKind`] so that, for example, a word node can be the central focus
/// in one view and an ordinary content node in another.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeGroup {
    /// The single node a view is centered on; pinned at the origin.
    Central,
    /// Control-hub focus variant: smaller navigation gap, larger
    /// connector shrink divisor.
    ControlHub,
    /// Navigation ring member.
    Navigation,
    /// Leading / primary content (fan leader, tree replies, network
    /// statements).
    #[default]
    Live,
    /// Ranked secondary content (fan alternatives).
    Alternative,
}

impl NodeGroup {
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "central" | "focus" => NodeGroup::Central,
            "control_hub" | "control" => NodeGroup::ControlHub,
            "navigation" | "nav" => NodeGroup::Navigation,
            "live" => NodeGroup::Live,
            "alternative" | "alt" => NodeGroup::Alternative,
            other => {
                warn!("unknown node group '{}', defaulting to live", other);
                NodeGroup::Live
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeGroup::Central => "central",
            NodeGroup::ControlHub => "control_hub",
            NodeGroup::Navigation => "navigation",
            NodeGroup::Live => "live",
            NodeGroup::Alternative => "alternative",
        }
    }

    /// Whether this role makes the node the view focus.
    pub fn is_focus(&self) -> bool {
        matches!(self, NodeGroup::Central | NodeGroup::ControlHub)
    }
}

/// Display mode; governs the derived radius.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum NodeMode {
    #[default]
    Preview,
    Detail,
}

impl NodeMode {
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "detail" | "expanded" => NodeMode::Detail,
            "preview" | "collapsed" => NodeMode::Preview,
            other => {
                warn!("unknown node mode '{}', defaulting to preview", other);
                NodeMode::Preview
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeMode::Preview => "preview",
            NodeMode::Detail => "detail",
        }
    }
}

/// Relationship tag for an edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Reply,
    Keyword,
    #[default]
    Direct,
}

impl EdgeKind {
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "reply" | "comment" => EdgeKind::Reply,
            "keyword" | "shared_keyword" => EdgeKind::Keyword,
            "direct" | "related" => EdgeKind::Direct,
            other => {
                warn!("unknown edge kind '{}', defaulting to direct", other);
                EdgeKind::Direct
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Reply => "reply",
            EdgeKind::Keyword => "keyword",
            EdgeKind::Direct => "direct",
        }
    }
}

/// Rank key for the free-network radial bias and the consensus rings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    NetVotes,
    TotalVotes,
    Recency,
    ConsensusRatio,
    Participants,
}

impl SortKey {
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "net_votes" | "netvotes" | "votes" => SortKey::NetVotes,
            "total_votes" | "totalvotes" | "activity" => SortKey::TotalVotes,
            "recency" | "chronological" | "created" => SortKey::Recency,
            "consensus_ratio" | "consensus" => SortKey::ConsensusRatio,
            "participants" | "participant_count" => SortKey::Participants,
            other => {
                warn!("unknown sort key '{}', defaulting to net_votes", other);
                SortKey::NetVotes
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::NetVotes => "net_votes",
            SortKey::TotalVotes => "total_votes",
            SortKey::Recency => "recency",
            SortKey::ConsensusRatio => "consensus_ratio",
            SortKey::Participants => "participants",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

impl SortDirection {
    pub fn parse(tag: &str) -> Self {
        match tag.to_lowercase().as_str() {
            "asc" | "ascending" => SortDirection::Ascending,
            "desc" | "descending" => SortDirection::Descending,
            other => {
                warn!("unknown sort direction '{}', defaulting to descending", other);
                SortDirection::Descending
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Descending => "desc",
            SortDirection::Ascending => "asc",
        }
    }
}

/// Free-form per-node data consumed by ranking and tree resolution.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NodeMetadata {
    /// Net votes (positive minus negative).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub net_votes: Option<i64>,

    /// Total votes cast, independent of direction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_votes: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    /// Primary parent reference for tree-shaped views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    /// Secondary parent reference; consulted when `parent_id` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,

    /// Agreement ratio in [0, 1] for consensus ranking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consensus_ratio: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_count: Option<u32>,
}

impl NodeMetadata {
    /// Resolve the tree parent reference, primary first.
    pub fn tree_parent(&self) -> Option<&str> {
        self.parent_id
            .as_deref()
            .or(self.reply_to.as_deref())
    }
}

/// A node record. Positions are in layout space: the focus node sits at
/// the origin, +x right, +y down, angles clockwise from the +x axis.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Node {
    pub id: String,
    pub kind: NodeKind,
    pub group: NodeGroup,
    pub mode: NodeMode,
    #[serde(default)]
    pub hidden: bool,

    /// Derived from `(kind, mode, hidden)`; refreshed by the engine on
    /// every data update and state transition.
    #[serde(default)]
    pub radius: f32,

    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub vx: f32,
    #[serde(default)]
    pub vy: f32,

    /// Pinned position; present only while the node must not move under
    /// relaxation. Re-asserted at the end of every tick.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fx: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fy: Option<f32>,

    /// Ring angle stored for navigation members; the rendering layer uses
    /// it to compute connector-line endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ring_radius: Option<f32>,

    #[serde(default)]
    pub metadata: NodeMetadata,
}

impl Node {
    pub fn new(id: impl Into<String>, kind: NodeKind, group: NodeGroup) -> Self {
        Self {
            id: id.into(),
            kind,
            group,
            ..Default::default()
        }
    }

    pub fn is_focus(&self) -> bool {
        self.group.is_focus()
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    /// Authoritatively place the node: position set, velocity zeroed.
    pub fn place(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    /// Place and pin in one step.
    pub fn pin_at(&mut self, x: f32, y: f32) {
        self.place(x, y);
        self.fx = Some(x);
        self.fy = Some(y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

/// An edge record. End points are node ids; edges whose end points are
/// missing from the current node set are skipped by every consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub kind: EdgeKind,

    /// Attraction modulation in [0, 1]; only force-based shapes read it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strength: Option<f32>,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            kind,
            strength: None,
        }
    }

    pub fn with_strength(mut self, strength: f32) -> Self {
        self.strength = Some(strength.clamp(0.0, 1.0));
        self
    }
}
