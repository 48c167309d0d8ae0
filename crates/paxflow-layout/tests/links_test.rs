use paxflow_layout::{
    FlowLayout, LayoutConfig, LayoutLink, LinkSpec, NodeId, NodeSpec, Side, compute_layout,
};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn link(id: u64, from: &str, to: &str, value: f64) -> LinkSpec {
    LinkSpec::new(id, NodeId::real(from), NodeId::real(to), value)
}

fn fan_out() -> FlowLayout {
    let source = vec![NodeSpec::real("S", 0, 100.0, 200.0)];
    let target = vec![
        NodeSpec::real("T1", 10, 60.0, 100.0),
        NodeSpec::real("T2", 20, 40.0, 100.0),
    ];
    let links = vec![link(0, "S", "T1", 60.0), link(1, "S", "T2", 40.0)];
    compute_layout(&source, &target, &links, &LayoutConfig::station()).unwrap()
}

/// Sum of the link extents leaving (or entering) each node.
fn assert_fill(layout: &FlowLayout) {
    for node in &layout.source_layout {
        let sum: f64 = layout
            .links
            .iter()
            .filter(|l| l.from_node_id == node.id)
            .map(|l| l.extent)
            .sum();
        assert!(approx(sum, node.body_extent), "{}: {sum} vs {}", node.id, node.body_extent);
    }
    for node in &layout.target_layout {
        let sum: f64 = layout
            .links
            .iter()
            .filter(|l| l.to_node_id == node.id)
            .map(|l| l.extent)
            .sum();
        assert!(approx(sum, node.body_extent), "{}: {sum} vs {}", node.id, node.body_extent);
    }
}

#[test]
fn links_keep_input_order() {
    let layout = fan_out();
    let ids: Vec<u64> = layout.links.iter().map(|l| l.id).collect();
    assert_eq!(ids, vec![0, 1]);
}

#[test]
fn later_targets_sit_nearest_the_body_end() {
    let layout = fan_out();
    let to_t1 = layout.link(0).unwrap();
    let to_t2 = layout.link(1).unwrap();

    assert_eq!(to_t2.extent, 10.0);
    assert_eq!(to_t2.start_offset_at_source, 45.0);
    assert_eq!(to_t2.source_order_key, 0);

    assert_eq!(to_t1.extent, 15.0);
    assert_eq!(to_t1.start_offset_at_source, 32.5);
    assert_eq!(to_t1.source_order_key, 1);

    let t1 = layout.node(Side::Target, &NodeId::real("T1")).unwrap();
    assert_eq!((t1.backdrop_start, t1.backdrop_end), (70.0, 95.0));
    assert_eq!(to_t1.start_offset_at_target, 87.5);
    assert_eq!(to_t1.target_order_key, 0);
}

#[test]
fn consistent_flows_fill_every_body() {
    assert_fill(&fan_out());
}

#[test]
fn clamped_links_are_compensated_in_the_body() {
    let source = vec![NodeSpec::real("S", 0, 6.0, 6.0)];
    let target = vec![
        NodeSpec::real("A", 1, 2.0, 10.0),
        NodeSpec::real("B", 2, 2.0, 10.0),
        NodeSpec::real("C", 3, 2.0, 10.0),
    ];
    let links = vec![
        link(0, "S", "A", 2.0),
        link(1, "S", "B", 2.0),
        link(2, "S", "C", 2.0),
    ];
    let layout = compute_layout(&source, &target, &links, &LayoutConfig::station()).unwrap();

    assert!(layout.links.iter().all(|l| l.extent == 2.0));
    let s = &layout.source_layout[0];
    assert_eq!(s.body_extent, 6.0);
    assert_eq!(s.backdrop_extent, 6.0);
    assert_fill(&layout);
}

#[test]
fn slices_are_contiguous() {
    let source = vec![NodeSpec::real("S", 0, 75.0, 120.0)];
    let target: Vec<NodeSpec> = (0..3_i64)
        .map(|i| NodeSpec::real(format!("T{i}"), i + 1, 30.0, 60.0))
        .collect();
    let links: Vec<LinkSpec> = (0..3_u64)
        .map(|i| link(i, "S", &format!("T{i}"), 20.0 + 5.0 * i as f64))
        .collect();
    let layout = compute_layout(&source, &target, &links, &LayoutConfig::station()).unwrap();
    let s = &layout.source_layout[0];

    let mut slices: Vec<&LayoutLink> = layout.links.iter().collect();
    slices.sort_by_key(|l| l.source_order_key);
    let mut end = s.body_end;
    for l in slices {
        assert!(approx(l.start_offset_at_source + l.extent / 2.0, end));
        end -= l.extent;
    }
    assert!(approx(end, s.body_start));
}

#[test]
fn zero_value_links_are_discarded() {
    let source = vec![NodeSpec::real("S", 0, 40.0, 200.0)];
    let target = vec![
        NodeSpec::real("T1", 10, 0.0, 100.0),
        NodeSpec::real("T2", 20, 40.0, 100.0),
    ];
    let links = vec![link(0, "S", "T1", 0.0), link(1, "S", "T2", 40.0)];
    let layout = compute_layout(&source, &target, &links, &LayoutConfig::station()).unwrap();

    assert_eq!(layout.links.len(), 1);
    let kept = &layout.links[0];
    assert_eq!(kept.id, 1);
    assert_eq!(kept.source_order_key, 0);
    assert_eq!(kept.start_offset_at_source, 45.0);
}

#[test]
fn incoming_links_follow_source_rank() {
    let source = vec![
        NodeSpec::real("A", 10, 20.0, 40.0),
        NodeSpec::real("B", 20, 20.0, 40.0),
    ];
    let target = vec![NodeSpec::real("T", 30, 40.0, 80.0)];
    let links = vec![link(0, "A", "T", 20.0), link(1, "B", "T", 20.0)];
    let layout = compute_layout(&source, &target, &links, &LayoutConfig::station()).unwrap();

    assert_eq!(layout.link(1).unwrap().target_order_key, 0);
    assert_eq!(layout.link(0).unwrap().target_order_key, 1);
    let t = &layout.target_layout[0];
    assert_eq!(layout.link(1).unwrap().start_offset_at_target, t.body_end - 2.5);
    assert_fill(&layout);
}
