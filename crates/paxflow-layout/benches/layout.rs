use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use paxflow_layout::{
    Endpoint, FlowGraph, FlowRecord, LayoutConfig, NodeSpec, TimeWindow, layout_graph, synthesize,
};
use std::hint::black_box;
use std::time::Duration;

const WINDOW: TimeWindow = TimeWindow {
    start: 36_000,
    end: 43_200,
};

/// A station with `trips` arriving and departing trips and a dense transfer pattern, plus
/// passengers starting, ending or passing through outside the window.
fn build_station(trips: usize, fanout: usize) -> FlowGraph {
    let time = |i: usize| WINDOW.start + (i as i64 * 7_200) / trips as i64;
    let arriving: Vec<NodeSpec> = (0..trips)
        .map(|i| NodeSpec::real(format!("in{i}"), time(i), 0.0, 400.0 + (i % 5) as f64 * 100.0))
        .collect();
    let departing: Vec<NodeSpec> = (0..trips)
        .map(|i| NodeSpec::real(format!("out{i}"), time(i) + 300, 0.0, 500.0))
        .collect();

    let mut flows = Vec::new();
    for i in 0..trips {
        let from = Endpoint::trip(format!("in{i}"), time(i));
        for k in 1..=fanout {
            let to = i + k;
            if to >= trips {
                break;
            }
            let value = ((i * 31 + k * 17) % 90 + 1) as f64;
            flows.push(FlowRecord::new(
                from.clone(),
                Endpoint::trip(format!("out{to}"), time(to)),
                value,
            ));
        }
        flows.push(FlowRecord::new(from.clone(), Endpoint::open(), 12.0));
        flows.push(FlowRecord::new(
            Endpoint::open(),
            Endpoint::trip(format!("out{i}"), time(i)),
            9.0,
        ));
        flows.push(FlowRecord::new(
            Endpoint::at(WINDOW.start - 600),
            Endpoint::at(WINDOW.end + 600),
            3.0,
        ));
    }

    let mut graph = synthesize(&arriving, &departing, &flows, WINDOW).expect("valid station");
    // Occupancy matches the flows so the bodies are exactly filled.
    for node in graph.source_nodes.iter_mut().chain(graph.target_nodes.iter_mut()) {
        if node.id.is_sentinel() {
            continue;
        }
        node.occupancy = graph
            .links
            .iter()
            .filter(|l| l.from_node_id == node.id || l.to_node_id == node.id)
            .map(|l| l.value)
            .sum();
    }
    graph
}

fn bench_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("layout");
    group.measurement_time(Duration::from_secs(5));

    let cases = [("station_20_f3", 20usize, 3usize), ("station_200_f6", 200, 6)];
    for (name, trips, fanout) in cases {
        let graph = build_station(trips, fanout);
        group.bench_with_input(BenchmarkId::new("compute_layout", name), &graph, |b, graph| {
            b.iter(|| {
                let layout = layout_graph(black_box(graph), &LayoutConfig::station());
                black_box(layout.map(|l| l.total_extent).unwrap_or_default());
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_layout);
criterion_main!(benches);
