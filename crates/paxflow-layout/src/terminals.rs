//! Sentinel synthesis: flow records whose endpoints have no real counterpart on a side are
//! routed to the `boarding`/`previous` (source) or `future`/`exiting` (target) pseudo-nodes.

use crate::error::{Result, check_quantity};
use crate::model::{EntityId, LinkSpec, NodeId, NodeSpec, SentinelTag};
use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashSet};
use serde::{Deserialize, Serialize};

/// Inclusive time range (unix seconds) the diagram models.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }
}

/// One end of a raw flow record. `id` names the trip, `time` its scheduled event at the station.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(default)]
    pub id: Option<EntityId>,
    #[serde(default)]
    pub time: Option<i64>,
}

impl Endpoint {
    pub fn trip(id: impl Into<EntityId>, time: i64) -> Self {
        Self {
            id: Some(id.into()),
            time: Some(time),
        }
    }

    /// An endpoint without a trip, e.g. passengers starting or ending their journey here.
    pub fn open() -> Self {
        Self::default()
    }

    pub fn at(time: i64) -> Self {
        Self {
            id: None,
            time: Some(time),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRecord {
    pub from: Endpoint,
    pub to: Endpoint,
    pub value: f64,
}

impl FlowRecord {
    pub fn new(from: Endpoint, to: Endpoint, value: f64) -> Self {
        Self { from, to, value }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowGraph {
    pub source_nodes: Vec<NodeSpec>,
    pub target_nodes: Vec<NodeSpec>,
    pub links: Vec<LinkSpec>,
}

/// Resolves the `from` end of a flow against the real source nodes.
pub fn classify_source(
    endpoint: &Endpoint,
    known: &FxHashSet<&EntityId>,
    window: TimeWindow,
) -> NodeId {
    if let Some(id) = endpoint.id.as_ref().filter(|id| known.contains(id)) {
        return NodeId::Real { id: id.clone() };
    }
    match endpoint.time {
        Some(t) if t < window.start => NodeId::sentinel(SentinelTag::Previous),
        _ => NodeId::sentinel(SentinelTag::Boarding),
    }
}

/// Resolves the `to` end of a flow against the real target nodes.
pub fn classify_target(
    endpoint: &Endpoint,
    known: &FxHashSet<&EntityId>,
    window: TimeWindow,
) -> NodeId {
    if let Some(id) = endpoint.id.as_ref().filter(|id| known.contains(id)) {
        return NodeId::Real { id: id.clone() };
    }
    match endpoint.time {
        Some(t) if t > window.end => NodeId::sentinel(SentinelTag::Future),
        _ => NodeId::sentinel(SentinelTag::Exiting),
    }
}

/// Builds the node and link sets for one diagram.
///
/// Every endpoint is classified once; the resulting ids feed both the sentinel totals and the
/// links, so a link can never point at a sentinel that was computed differently. Records that
/// resolve to the same (from, to) pair are merged by summing their values. Sentinel nodes in
/// the inputs are ignored; only synthesized sentinels with a positive total are emitted.
pub fn synthesize(
    source_nodes: &[NodeSpec],
    target_nodes: &[NodeSpec],
    flows: &[FlowRecord],
    window: TimeWindow,
) -> Result<FlowGraph> {
    let sources = real_ids(source_nodes);
    let targets = real_ids(target_nodes);

    let mut totals = [0.0_f64; 4];
    let mut merged: IndexMap<(NodeId, NodeId), f64, FxBuildHasher> = IndexMap::default();
    for (i, flow) in flows.iter().enumerate() {
        check_quantity("value", || format!("flow record #{i}"), flow.value)?;
        let from = classify_source(&flow.from, &sources, window);
        let to = classify_target(&flow.to, &targets, window);
        for tag in [from.as_sentinel(), to.as_sentinel()].into_iter().flatten() {
            totals[tag.index()] += flow.value;
        }
        *merged.entry((from, to)).or_insert(0.0) += flow.value;
    }

    let present = |tag: SentinelTag| totals[tag.index()] > 0.0;
    let sentinel_nodes = |tags: [SentinelTag; 2]| {
        tags.into_iter()
            .filter(|&tag| present(tag))
            .map(|tag| NodeSpec::sentinel(tag, totals[tag.index()]))
            .collect::<Vec<_>>()
    };

    let mut source = sentinel_nodes([SentinelTag::Boarding, SentinelTag::Previous]);
    source.extend(real_nodes(source_nodes));
    let mut target = real_nodes(target_nodes);
    target.extend(sentinel_nodes([SentinelTag::Future, SentinelTag::Exiting]));

    let endpoint_present = |id: &NodeId| id.as_sentinel().is_none_or(present);
    let links: Vec<LinkSpec> = merged
        .into_iter()
        .filter(|((from, to), _)| endpoint_present(from) && endpoint_present(to))
        .enumerate()
        .map(|(i, ((from, to), value))| LinkSpec::new(i as u64, from, to, value))
        .collect();

    let graph = FlowGraph {
        source_nodes: source,
        target_nodes: target,
        links,
    };

    tracing::debug!(
        flows = flows.len(),
        links = graph.links.len(),
        boarding = totals[SentinelTag::Boarding.index()],
        previous = totals[SentinelTag::Previous.index()],
        future = totals[SentinelTag::Future.index()],
        exiting = totals[SentinelTag::Exiting.index()],
        "synthesized flow graph"
    );
    Ok(graph)
}

fn real_ids(nodes: &[NodeSpec]) -> FxHashSet<&EntityId> {
    nodes.iter().filter_map(|n| n.id.as_real()).collect()
}

fn real_nodes(nodes: &[NodeSpec]) -> Vec<NodeSpec> {
    nodes.iter().filter(|n| !n.id.is_sentinel()).cloned().collect()
}
