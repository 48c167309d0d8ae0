use crate::config::{LayoutConfig, SideAlignment};
use crate::links::Incidence;
use crate::model::{LayoutNode, LinkSpec, NodeId, NodeSpec, Side, StackKey};
use crate::scale::{clamp_excess, load_ratio, scale_raw};
use rustc_hash::FxHashMap;

/// Node sizes before placement.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Measure {
    pub backdrop: f64,
    pub body: f64,
    pub link_sum: f64,
    /// How far the body reaches past the backdrop; zero unless overflowing.
    pub overflow: f64,
}

/// Sizes one node. Whatever the minimum link thickness adds to the links touching the node is
/// added to both of its extents, so the clamped slices still fit the body.
pub(crate) fn measure(
    node: &NodeSpec,
    link_values: impl IntoIterator<Item = f64>,
    config: &LayoutConfig,
) -> Measure {
    let factor = config.scale_factor;
    let mut link_sum = 0.0;
    let mut compensation = 0.0;
    for value in link_values {
        link_sum += value;
        compensation += clamp_excess(value, factor, config.min_link_extent);
    }

    let body = at_least(
        node.occupancy,
        scale_raw(node.occupancy, factor) + compensation,
        config.min_node_extent,
    );
    // Sentinels carry no capacity; their backdrop mirrors the body so the row reserves room.
    let backdrop = if node.id.is_sentinel() {
        body
    } else {
        at_least(
            node.capacity,
            scale_raw(node.capacity, factor) + compensation,
            config.min_node_extent,
        )
    };
    let overflow = if node.is_overflowing() {
        (body - backdrop).max(0.0)
    } else {
        0.0
    };

    Measure {
        backdrop,
        body,
        link_sum,
        overflow,
    }
}

fn at_least(value: f64, extent: f64, min_extent: f64) -> f64 {
    if value > 0.0 {
        extent.max(min_extent)
    } else {
        extent
    }
}

#[derive(Debug, Clone, Copy)]
struct Row {
    key: StackKey,
    source: Option<usize>,
    target: Option<usize>,
}

/// Both sides after the sweep, each in stacking order.
#[derive(Debug)]
pub(crate) struct Stacked {
    pub source: Vec<LayoutNode>,
    pub target: Vec<LayoutNode>,
    source_position: Vec<usize>,
    target_position: Vec<usize>,
    pub total_extent: f64,
}

impl Stacked {
    /// Layout of the source node at input index `i`.
    pub fn source_node(&self, i: usize) -> &LayoutNode {
        &self.source[self.source_position[i]]
    }

    pub fn target_node(&self, i: usize) -> &LayoutNode {
        &self.target[self.target_position[i]]
    }

    pub fn source_node_mut(&mut self, i: usize) -> &mut LayoutNode {
        &mut self.source[self.source_position[i]]
    }

    pub fn target_node_mut(&mut self, i: usize) -> &mut LayoutNode {
        &mut self.target[self.target_position[i]]
    }
}

pub(crate) fn stack(
    source: &[NodeSpec],
    target: &[NodeSpec],
    links: &[LinkSpec],
    incidence: &Incidence,
    config: &LayoutConfig,
) -> Stacked {
    let source_measures: Vec<Measure> = source
        .iter()
        .zip(&incidence.outgoing)
        .map(|(node, group)| measure(node, incidence.values(links, group), config))
        .collect();
    let target_measures: Vec<Measure> = target
        .iter()
        .zip(&incidence.incoming)
        .map(|(node, group)| measure(node, incidence.values(links, group), config))
        .collect();

    let mut sweep = Sweep {
        source,
        target,
        source_measures: &source_measures,
        target_measures: &target_measures,
        padding: config.padding,
        out: Stacked {
            source: Vec::with_capacity(source.len()),
            target: Vec::with_capacity(target.len()),
            source_position: vec![0; source.len()],
            target_position: vec![0; target.len()],
            total_extent: 0.0,
        },
    };

    let bottom = match config.alignment {
        SideAlignment::Paired => sweep.place(&paired_rows(source, target)),
        SideAlignment::Independent => {
            let left = sweep.place(&single_rows(source, Side::Source));
            let right = sweep.place(&single_rows(target, Side::Target));
            left.max(right)
        }
    };

    let mut out = sweep.out;
    out.total_extent = bottom + config.padding;
    out
}

/// Rows are the union of both sides keyed by node id, stably sorted by stacking key.
fn paired_rows(source: &[NodeSpec], target: &[NodeSpec]) -> Vec<Row> {
    let mut rows: Vec<Row> = Vec::with_capacity(source.len() + target.len());
    let mut by_id: FxHashMap<&NodeId, usize> = FxHashMap::default();
    for (i, node) in source.iter().enumerate() {
        by_id.insert(&node.id, rows.len());
        rows.push(Row {
            key: node.stacking_key(),
            source: Some(i),
            target: None,
        });
    }
    for (i, node) in target.iter().enumerate() {
        match by_id.get(&node.id) {
            Some(&r) => rows[r].target = Some(i),
            None => rows.push(Row {
                key: node.stacking_key(),
                source: None,
                target: Some(i),
            }),
        }
    }
    rows.sort_by_key(|row| row.key);
    rows
}

fn single_rows(nodes: &[NodeSpec], side: Side) -> Vec<Row> {
    let mut rows: Vec<Row> = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| Row {
            key: node.stacking_key(),
            source: (side == Side::Source).then_some(i),
            target: (side == Side::Target).then_some(i),
        })
        .collect();
    rows.sort_by_key(|row| row.key);
    rows
}

struct Sweep<'a> {
    source: &'a [NodeSpec],
    target: &'a [NodeSpec],
    source_measures: &'a [Measure],
    target_measures: &'a [Measure],
    padding: f64,
    out: Stacked,
}

impl Sweep<'_> {
    /// Places `rows` top to bottom and returns the lowest backdrop end (0 for no rows).
    ///
    /// Within a row the shorter backdrop is centered on the taller one. An overflowing body
    /// reaches above its backdrop, so the row is pushed down far enough for that overflow to
    /// clear the previous row.
    fn place(&mut self, rows: &[Row]) -> f64 {
        let mut cursor = 0.0_f64;
        for (rank, row) in rows.iter().enumerate() {
            let measures = [
                row.source.map(|i| self.source_measures[i]),
                row.target.map(|i| self.target_measures[i]),
            ];
            let tallest = measures
                .iter()
                .flatten()
                .map(|m| m.backdrop)
                .fold(0.0, f64::max);
            let reach = measures
                .iter()
                .flatten()
                .map(|m| m.overflow + m.backdrop / 2.0)
                .fold(0.0, f64::max);
            let full_padding = (reach - tallest / 2.0).max(0.0);
            let gap = if rank == 0 { 0.0 } else { self.padding };
            let row_start = cursor + gap + full_padding;

            cursor = row_start;
            if let Some(i) = row.source {
                let node = layout_node(
                    &self.source[i],
                    Side::Source,
                    rank,
                    &measures[0],
                    row_start,
                    tallest,
                );
                cursor = cursor.max(node.backdrop_end);
                self.out.source_position[i] = self.out.source.len();
                self.out.source.push(node);
            }
            if let Some(i) = row.target {
                let node = layout_node(
                    &self.target[i],
                    Side::Target,
                    rank,
                    &measures[1],
                    row_start,
                    tallest,
                );
                cursor = cursor.max(node.backdrop_end);
                self.out.target_position[i] = self.out.target.len();
                self.out.target.push(node);
            }
        }
        cursor
    }
}

fn layout_node(
    spec: &NodeSpec,
    side: Side,
    rank: usize,
    measure: &Option<Measure>,
    row_start: f64,
    tallest: f64,
) -> LayoutNode {
    let m = measure.unwrap_or_default();
    let start = row_start + (tallest - m.backdrop) / 2.0;
    let end = start + m.backdrop;
    let (link_sum_out, link_sum_in) = match side {
        Side::Source => (m.link_sum, 0.0),
        Side::Target => (0.0, m.link_sum),
    };
    LayoutNode {
        id: spec.id.clone(),
        side,
        rank,
        occupancy: spec.occupancy,
        capacity: spec.capacity,
        backdrop_extent: m.backdrop,
        body_extent: m.body,
        backdrop_start: start,
        backdrop_end: end,
        body_start: (end - m.body).max(0.0),
        body_end: end,
        overflowing: spec.is_overflowing(),
        link_sum_out,
        link_sum_in,
        load_ratio: if spec.id.is_sentinel() {
            0.0
        } else {
            load_ratio(spec.occupancy, spec.capacity)
        },
        time_offset: None,
        overflow: None,
    }
}
