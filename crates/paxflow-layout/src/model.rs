use crate::overflow::OverflowGeometry;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque key of a real diagram entity (a trip, a station stop).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pseudo-nodes standing in for passengers that enter or leave the modeled window.
///
/// Variant order is the stacking order: `Boarding` and `Previous` lead the source side,
/// `Future` and `Exiting` trail the target side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentinelTag {
    Boarding,
    Previous,
    Future,
    Exiting,
}

impl SentinelTag {
    pub const ALL: [SentinelTag; 4] = [
        SentinelTag::Boarding,
        SentinelTag::Previous,
        SentinelTag::Future,
        SentinelTag::Exiting,
    ];

    pub fn side(self) -> Side {
        match self {
            SentinelTag::Boarding | SentinelTag::Previous => Side::Source,
            SentinelTag::Future | SentinelTag::Exiting => Side::Target,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SentinelTag::Boarding => "boarding",
            SentinelTag::Previous => "previous",
            SentinelTag::Future => "future",
            SentinelTag::Exiting => "exiting",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for SentinelTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodeId {
    Real { id: EntityId },
    Sentinel { tag: SentinelTag },
}

impl NodeId {
    pub fn real(id: impl Into<EntityId>) -> Self {
        Self::Real { id: id.into() }
    }

    pub fn sentinel(tag: SentinelTag) -> Self {
        Self::Sentinel { tag }
    }

    pub fn as_real(&self) -> Option<&EntityId> {
        match self {
            Self::Real { id } => Some(id),
            Self::Sentinel { .. } => None,
        }
    }

    pub fn as_sentinel(&self) -> Option<SentinelTag> {
        match self {
            Self::Real { .. } => None,
            Self::Sentinel { tag } => Some(*tag),
        }
    }

    pub fn is_sentinel(&self) -> bool {
        matches!(self, Self::Sentinel { .. })
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real { id } => write!(f, "{id}"),
            Self::Sentinel { tag } => write!(f, "<{tag}>"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Target => f.write_str("target"),
        }
    }
}

/// Total stacking order of a node. Derived `Ord` puts leading sentinels first, then real
/// nodes by display time, then trailing sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StackKey {
    Leading(SentinelTag),
    At(i64),
    Trailing(SentinelTag),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    pub id: NodeId,
    /// Unix seconds. Ignored for sentinels, which sort by their tag.
    #[serde(default)]
    pub display_time: i64,
    pub occupancy: f64,
    #[serde(default)]
    pub capacity: f64,
}

impl NodeSpec {
    pub fn real(
        id: impl Into<EntityId>,
        display_time: i64,
        occupancy: f64,
        capacity: f64,
    ) -> Self {
        Self {
            id: NodeId::real(id),
            display_time,
            occupancy,
            capacity,
        }
    }

    pub fn sentinel(tag: SentinelTag, occupancy: f64) -> Self {
        Self {
            id: NodeId::sentinel(tag),
            display_time: 0,
            occupancy,
            capacity: 0.0,
        }
    }

    pub fn stacking_key(&self) -> StackKey {
        match self.id.as_sentinel() {
            None => StackKey::At(self.display_time),
            Some(tag) => match tag.side() {
                Side::Source => StackKey::Leading(tag),
                Side::Target => StackKey::Trailing(tag),
            },
        }
    }

    /// Strictly more passengers than seats. Sentinels have no ceiling.
    pub fn is_overflowing(&self) -> bool {
        !self.id.is_sentinel() && self.occupancy > self.capacity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSpec {
    pub id: u64,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub value: f64,
}

impl LinkSpec {
    pub fn new(id: u64, from: NodeId, to: NodeId, value: f64) -> Self {
        Self {
            id,
            from_node_id: from,
            to_node_id: to,
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: NodeId,
    pub side: Side,
    /// Stacking index shared by both sides when rows are paired.
    pub rank: usize,
    pub occupancy: f64,
    pub capacity: f64,
    pub backdrop_extent: f64,
    pub body_extent: f64,
    pub backdrop_start: f64,
    pub backdrop_end: f64,
    pub body_start: f64,
    pub body_end: f64,
    pub overflowing: bool,
    pub link_sum_out: f64,
    pub link_sum_in: f64,
    pub load_ratio: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_offset: Option<f64>,
    /// Within-capacity and overflow bars; set only for overflowing nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overflow: Option<OverflowGeometry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLink {
    pub id: u64,
    pub from_node_id: NodeId,
    pub to_node_id: NodeId,
    pub value: f64,
    pub extent: f64,
    pub start_offset_at_source: f64,
    pub start_offset_at_target: f64,
    /// Position within the source node's slice list, 0 = nearest the body end.
    pub source_order_key: usize,
    pub target_order_key: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Diagnostic {
    #[serde(rename_all = "camelCase")]
    UnresolvedEndpoint {
        link_id: u64,
        side: Side,
        node_id: NodeId,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowLayout {
    pub source_layout: Vec<LayoutNode>,
    pub target_layout: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    pub total_extent: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

impl FlowLayout {
    pub fn node(&self, side: Side, id: &NodeId) -> Option<&LayoutNode> {
        let nodes = match side {
            Side::Source => &self.source_layout,
            Side::Target => &self.target_layout,
        };
        nodes.iter().find(|n| &n.id == id)
    }

    pub fn link(&self, id: u64) -> Option<&LayoutLink> {
        self.links.iter().find(|l| l.id == id)
    }
}
