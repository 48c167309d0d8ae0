use crate::config::LayoutConfig;
use crate::model::{Diagnostic, LayoutLink, LayoutNode, LinkSpec, NodeId, Side};
use crate::scale::scale;
use crate::stack::Stacked;
use rustc_hash::FxHashMap;

/// A link whose endpoints were found; indices point into the input slices.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved {
    pub link: usize,
    pub source: usize,
    pub target: usize,
}

/// Resolved links grouped per node, in input order.
#[derive(Debug, Default)]
pub(crate) struct Incidence {
    pub resolved: Vec<Resolved>,
    pub outgoing: Vec<Vec<usize>>,
    pub incoming: Vec<Vec<usize>>,
}

impl Incidence {
    pub fn values<'a>(
        &'a self,
        links: &'a [LinkSpec],
        group: &'a [usize],
    ) -> impl Iterator<Item = f64> + 'a {
        group.iter().map(move |&r| links[self.resolved[r].link].value)
    }
}

pub(crate) fn resolve(
    links: &[LinkSpec],
    source_index: &FxHashMap<&NodeId, usize>,
    target_index: &FxHashMap<&NodeId, usize>,
    diagnostics: &mut Vec<Diagnostic>,
) -> Incidence {
    let mut incidence = Incidence {
        resolved: Vec::with_capacity(links.len()),
        outgoing: vec![Vec::new(); source_index.len()],
        incoming: vec![Vec::new(); target_index.len()],
    };

    for (i, link) in links.iter().enumerate() {
        let Some(&source) = source_index.get(&link.from_node_id) else {
            unresolved(link, Side::Source, &link.from_node_id, diagnostics);
            continue;
        };
        let Some(&target) = target_index.get(&link.to_node_id) else {
            unresolved(link, Side::Target, &link.to_node_id, diagnostics);
            continue;
        };
        let r = incidence.resolved.len();
        incidence.resolved.push(Resolved {
            link: i,
            source,
            target,
        });
        incidence.outgoing[source].push(r);
        incidence.incoming[target].push(r);
    }
    incidence
}

fn unresolved(
    link: &LinkSpec,
    side: Side,
    node_id: &NodeId,
    diagnostics: &mut Vec<Diagnostic>,
) {
    tracing::warn!(link = link.id, %side, node = %node_id, "dropping link with unknown endpoint");
    diagnostics.push(Diagnostic::UnresolvedEndpoint {
        link_id: link.id,
        side,
        node_id: node_id.clone(),
    });
}

#[derive(Debug, Clone, Copy, Default)]
struct Slice {
    extent: f64,
    at_source: f64,
    at_target: f64,
    source_order: usize,
    target_order: usize,
}

/// Assigns every surviving link its thickness and its slice on both endpoints.
///
/// Per node, links are ordered by the stacking rank of their other endpoint, highest rank
/// first, and laid out contiguously from the body end upwards. Zero-value links are dropped.
pub(crate) fn allocate(
    links: &[LinkSpec],
    incidence: &Incidence,
    stacked: &Stacked,
    config: &LayoutConfig,
) -> Vec<LayoutLink> {
    let mut slices: Vec<Slice> = incidence
        .resolved
        .iter()
        .map(|r| Slice {
            extent: scale(links[r.link].value, config.scale_factor, config.min_link_extent),
            ..Slice::default()
        })
        .collect();

    for (i, group) in incidence.outgoing.iter().enumerate() {
        let node = stacked.source_node(i);
        let ordered = order_by_rank(group, |r| stacked.target_node(incidence.resolved[r].target));
        for (k, (r, center)) in walk(node, &ordered, &slices).into_iter().enumerate() {
            slices[r].at_source = center;
            slices[r].source_order = k;
        }
    }

    for (i, group) in incidence.incoming.iter().enumerate() {
        let node = stacked.target_node(i);
        let ordered = order_by_rank(group, |r| stacked.source_node(incidence.resolved[r].source));
        for (k, (r, center)) in walk(node, &ordered, &slices).into_iter().enumerate() {
            slices[r].at_target = center;
            slices[r].target_order = k;
        }
    }

    let mut out = Vec::with_capacity(slices.len());
    for (r, slice) in slices.iter().enumerate() {
        let link = &links[incidence.resolved[r].link];
        if slice.extent <= 0.0 {
            tracing::trace!(link = link.id, "discarding zero-value link");
            continue;
        }
        out.push(LayoutLink {
            id: link.id,
            from_node_id: link.from_node_id.clone(),
            to_node_id: link.to_node_id.clone(),
            value: link.value,
            extent: slice.extent,
            start_offset_at_source: slice.at_source,
            start_offset_at_target: slice.at_target,
            source_order_key: slice.source_order,
            target_order_key: slice.target_order,
        });
    }
    out
}

fn order_by_rank<'a>(group: &[usize], other: impl Fn(usize) -> &'a LayoutNode) -> Vec<usize> {
    let mut ordered = group.to_vec();
    // `sort_by` is stable, so equal ranks keep input order.
    ordered.sort_by(|&a, &b| other(b).rank.cmp(&other(a).rank));
    ordered
}

/// Stacks the slices of `ordered` from the body end upwards, returning each slice center.
fn walk(node: &LayoutNode, ordered: &[usize], slices: &[Slice]) -> Vec<(usize, f64)> {
    let mut offset = 0.0;
    let mut centers = Vec::with_capacity(ordered.len());
    for &r in ordered {
        let extent = slices[r].extent;
        if extent <= 0.0 {
            continue;
        }
        centers.push((r, node.body_end - offset - extent / 2.0));
        offset += extent;
    }
    centers
}
