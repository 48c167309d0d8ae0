#![forbid(unsafe_code)]

//! Headless layout for passenger-flow diagrams.
//!
//! Nodes (trips or stops) are stacked as capacity backdrops with an occupancy body in front;
//! links are ribbons whose thickness is proportional to the passengers they carry. The engine
//! is a pure function of its inputs and returns plain data for a separate render step.
//!
//! The time-of-day charts live in [`timeline`] and [`vertical`].

mod links;
mod stack;

pub mod config;
pub mod error;
pub mod model;
pub mod overflow;
pub mod scale;
pub mod terminals;
pub mod timeline;
pub mod vertical;

pub use config::{Axis, LayoutConfig, SideAlignment, TimeAxis};
pub use error::{Error, Result};
pub use model::{
    Diagnostic, EntityId, FlowLayout, LayoutLink, LayoutNode, LinkSpec, NodeId, NodeSpec,
    SentinelTag, Side, StackKey,
};
pub use overflow::{OverflowGeometry, Segment, node_overflow};
pub use terminals::{Endpoint, FlowGraph, FlowRecord, TimeWindow, synthesize};
pub use timeline::{
    ClockTime, SectionSpec, SegmentKind, TimelineConfig, TimelineLayout, TimelineSegment,
    layout_sections, segment_width, time_to_x,
};
pub use vertical::{VerticalBar, VerticalConfig, VerticalLayout, layout_vertical};

use error::check_quantity;
use rustc_hash::FxHashMap;
use std::borrow::Cow;

/// Lays out one diagram.
///
/// Links whose endpoints are not among the given nodes are dropped and reported in
/// [`FlowLayout::diagnostics`]. Sentinels with zero occupancy are left out. Negative or
/// non-finite quantities and duplicate node ids on a side are rejected.
pub fn compute_layout(
    source_nodes: &[NodeSpec],
    target_nodes: &[NodeSpec],
    links: &[LinkSpec],
    config: &LayoutConfig,
) -> Result<FlowLayout> {
    config.validate()?;
    let source_nodes = without_empty_sentinels(source_nodes, Side::Source);
    let target_nodes = without_empty_sentinels(target_nodes, Side::Target);
    let (source_nodes, target_nodes) = (source_nodes.as_ref(), target_nodes.as_ref());
    let source_index = index_side(source_nodes, Side::Source)?;
    let target_index = index_side(target_nodes, Side::Target)?;
    for link in links {
        check_quantity("value", || format!("link {}", link.id), link.value)?;
    }

    let mut diagnostics = Vec::new();
    let incidence = links::resolve(links, &source_index, &target_index, &mut diagnostics);
    let mut stacked = stack::stack(source_nodes, target_nodes, links, &incidence, config);
    let layout_links = links::allocate(links, &incidence, &stacked, config);

    if let Axis::Time(axis) = config.axis {
        for (i, spec) in source_nodes.iter().enumerate() {
            stacked.source_node_mut(i).time_offset = time_offset(spec, &axis)?;
        }
        for (i, spec) in target_nodes.iter().enumerate() {
            stacked.target_node_mut(i).time_offset = time_offset(spec, &axis)?;
        }
    }

    for node in stacked.source.iter_mut().chain(stacked.target.iter_mut()) {
        node.overflow = node_overflow(node, config.overflow_gap);
    }

    tracing::debug!(
        sources = stacked.source.len(),
        targets = stacked.target.len(),
        links = layout_links.len(),
        dropped = diagnostics.len(),
        total_extent = stacked.total_extent,
        "computed flow layout"
    );

    Ok(FlowLayout {
        source_layout: stacked.source,
        target_layout: stacked.target,
        links: layout_links,
        total_extent: stacked.total_extent,
        diagnostics,
    })
}

/// [`compute_layout`] over a synthesized graph.
pub fn layout_graph(graph: &FlowGraph, config: &LayoutConfig) -> Result<FlowLayout> {
    compute_layout(
        &graph.source_nodes,
        &graph.target_nodes,
        &graph.links,
        config,
    )
}

/// Sentinels without passengers get no row.
fn without_empty_sentinels(nodes: &[NodeSpec], side: Side) -> Cow<'_, [NodeSpec]> {
    let is_empty = |n: &NodeSpec| n.id.is_sentinel() && n.occupancy == 0.0;
    if !nodes.iter().any(is_empty) {
        return Cow::Borrowed(nodes);
    }
    let kept: Vec<NodeSpec> = nodes.iter().filter(|n| !is_empty(n)).cloned().collect();
    tracing::trace!(%side, skipped = nodes.len() - kept.len(), "skipped empty sentinels");
    Cow::Owned(kept)
}

fn index_side(nodes: &[NodeSpec], side: Side) -> Result<FxHashMap<&NodeId, usize>> {
    let mut index = FxHashMap::default();
    index.reserve(nodes.len());
    for (i, node) in nodes.iter().enumerate() {
        let owner = || format!("{side} node {}", node.id);
        check_quantity("occupancy", owner, node.occupancy)?;
        check_quantity("capacity", owner, node.capacity)?;
        if index.insert(&node.id, i).is_some() {
            return Err(Error::DuplicateNode {
                side,
                id: node.id.to_string(),
            });
        }
    }
    Ok(index)
}

fn time_offset(node: &NodeSpec, axis: &TimeAxis) -> Result<Option<f64>> {
    if node.id.is_sentinel() {
        return Ok(None);
    }
    let clock = ClockTime::from_timestamp(node.display_time, axis.utc_offset_seconds).ok_or_else(
        || Error::InvalidTimestamp {
            owner: format!("display time of node {}", node.id),
            seconds: node.display_time,
        },
    )?;
    Ok(Some(time_to_x(
        axis.width,
        clock.hour,
        clock.minute,
        axis.frame_hours,
    )))
}
