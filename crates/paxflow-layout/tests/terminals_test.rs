use paxflow_layout::{
    Endpoint, Error, FlowRecord, LayoutConfig, LinkSpec, NodeId, NodeSpec, SentinelTag, Side,
    TimeWindow, layout_graph, synthesize,
};

const WINDOW: TimeWindow = TimeWindow {
    start: 1_000,
    end: 2_000,
};

fn sentinel(tag: SentinelTag) -> NodeId {
    NodeId::sentinel(tag)
}

fn nodes() -> (Vec<NodeSpec>, Vec<NodeSpec>) {
    (
        vec![NodeSpec::real("ICE 1", 1_200, 22.0, 400.0)],
        vec![NodeSpec::real("RE 2", 1_500, 20.0, 300.0)],
    )
}

fn flows() -> Vec<FlowRecord> {
    vec![
        FlowRecord::new(Endpoint::trip("ICE 1", 900), Endpoint::trip("RE 2", 1_500), 10.0),
        FlowRecord::new(Endpoint::open(), Endpoint::trip("RE 2", 1_500), 5.0),
        FlowRecord::new(Endpoint::trip("X", 500), Endpoint::trip("RE 2", 1_500), 3.0),
        FlowRecord::new(Endpoint::trip("ICE 1", 900), Endpoint::trip("Y", 2_500), 4.0),
        FlowRecord::new(Endpoint::trip("ICE 1", 900), Endpoint::open(), 6.0),
        FlowRecord::new(Endpoint::trip("ICE 1", 900), Endpoint::trip("RE 2", 1_500), 2.0),
    ]
}

#[test]
fn unmatched_endpoints_become_sentinels() {
    let (source, target) = nodes();
    let graph = synthesize(&source, &target, &flows(), WINDOW).unwrap();

    let ids = |nodes: &[NodeSpec]| nodes.iter().map(|n| (n.id.clone(), n.occupancy)).collect::<Vec<_>>();
    assert_eq!(
        ids(&graph.source_nodes),
        vec![
            (sentinel(SentinelTag::Boarding), 5.0),
            (sentinel(SentinelTag::Previous), 3.0),
            (NodeId::real("ICE 1"), 22.0),
        ]
    );
    assert_eq!(
        ids(&graph.target_nodes),
        vec![
            (NodeId::real("RE 2"), 20.0),
            (sentinel(SentinelTag::Future), 4.0),
            (sentinel(SentinelTag::Exiting), 6.0),
        ]
    );
}

#[test]
fn identical_pairs_are_merged_and_renumbered() {
    let (source, target) = nodes();
    let graph = synthesize(&source, &target, &flows(), WINDOW).unwrap();
    assert_eq!(
        graph.links,
        vec![
            LinkSpec::new(0, NodeId::real("ICE 1"), NodeId::real("RE 2"), 12.0),
            LinkSpec::new(1, sentinel(SentinelTag::Boarding), NodeId::real("RE 2"), 5.0),
            LinkSpec::new(2, sentinel(SentinelTag::Previous), NodeId::real("RE 2"), 3.0),
            LinkSpec::new(3, NodeId::real("ICE 1"), sentinel(SentinelTag::Future), 4.0),
            LinkSpec::new(4, NodeId::real("ICE 1"), sentinel(SentinelTag::Exiting), 6.0),
        ]
    );
}

#[test]
fn window_edges_are_inside() {
    let (source, target) = nodes();
    let flows = vec![
        FlowRecord::new(Endpoint::trip("X", 1_000), Endpoint::trip("Y", 2_000), 1.0),
        FlowRecord::new(Endpoint::at(999), Endpoint::at(2_001), 1.0),
    ];
    let graph = synthesize(&source, &target, &flows, WINDOW).unwrap();
    assert_eq!(
        graph.links,
        vec![
            LinkSpec::new(0, sentinel(SentinelTag::Boarding), sentinel(SentinelTag::Exiting), 1.0),
            LinkSpec::new(1, sentinel(SentinelTag::Previous), sentinel(SentinelTag::Future), 1.0),
        ]
    );
}

#[test]
fn empty_sentinels_are_suppressed() {
    let (source, target) = nodes();
    let flows = vec![
        FlowRecord::new(Endpoint::trip("ICE 1", 900), Endpoint::trip("RE 2", 1_500), 10.0),
        FlowRecord::new(Endpoint::open(), Endpoint::trip("RE 2", 1_500), 0.0),
    ];
    let graph = synthesize(&source, &target, &flows, WINDOW).unwrap();
    assert!(graph.source_nodes.iter().all(|n| !n.id.is_sentinel()));
    assert!(graph.target_nodes.iter().all(|n| !n.id.is_sentinel()));
    assert_eq!(graph.links.len(), 1);

    let layout = layout_graph(&graph, &LayoutConfig::station()).unwrap();
    assert!(
        layout
            .source_layout
            .iter()
            .chain(&layout.target_layout)
            .all(|n| !n.id.is_sentinel())
    );
}

#[test]
fn sentinels_in_the_input_are_replaced() {
    let (mut source, target) = nodes();
    source.push(NodeSpec::sentinel(SentinelTag::Boarding, 99.0));
    let graph = synthesize(&source, &target, &flows(), WINDOW).unwrap();
    let boarding: Vec<&NodeSpec> = graph
        .source_nodes
        .iter()
        .filter(|n| n.id == sentinel(SentinelTag::Boarding))
        .collect();
    assert_eq!(boarding.len(), 1);
    assert_eq!(boarding[0].occupancy, 5.0);
}

#[test]
fn negative_flows_are_rejected() {
    let (source, target) = nodes();
    let flows = vec![FlowRecord::new(Endpoint::open(), Endpoint::open(), -1.0)];
    let err = synthesize(&source, &target, &flows, WINDOW).unwrap_err();
    assert!(matches!(err, Error::NegativeValue { field: "value", .. }));
}

#[test]
fn synthesized_graph_lays_out_with_sentinels_at_the_edges() {
    let (source, target) = nodes();
    let graph = synthesize(&source, &target, &flows(), WINDOW).unwrap();
    let layout = layout_graph(&graph, &LayoutConfig::station()).unwrap();

    assert!(layout.diagnostics.is_empty());
    assert_eq!(layout.links.len(), 5);
    assert_eq!(layout.source_layout[0].id, sentinel(SentinelTag::Boarding));
    assert_eq!(
        layout.target_layout.last().map(|n| &n.id),
        Some(&sentinel(SentinelTag::Exiting))
    );

    // Sentinels are sized by their flow, so their bodies are exactly filled.
    for tag in [SentinelTag::Boarding, SentinelTag::Previous] {
        let node = layout.node(Side::Source, &sentinel(tag)).unwrap();
        let sum: f64 = layout
            .links
            .iter()
            .filter(|l| l.from_node_id == node.id)
            .map(|l| l.extent)
            .sum();
        assert!((sum - node.body_extent).abs() < 1e-9);
    }
}

#[test]
fn graph_json_uses_tagged_ids() {
    let (source, target) = nodes();
    let graph = synthesize(&source, &target, &flows(), WINDOW).unwrap();
    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(
        json["sourceNodes"][0]["id"],
        serde_json::json!({ "kind": "sentinel", "tag": "boarding" })
    );
    assert_eq!(json["links"][0]["fromNodeId"]["id"], "ICE 1");
}
