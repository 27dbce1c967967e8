//! Criterion benchmarks for the connection graph and path finder.
//!
//! Uses a generated multi-tier matrix: sources feed the first tier, every
//! switcher in a tier feeds every switcher in the next, and displays hang
//! off the last tier. Two axes:
//!
//! - **Build** - graph validation and indexing
//! - **Search** - `find_paths()` and `has_paths()` across tier counts
//!
//! Run with: `cargo bench -p switchyard-core`
#![allow(missing_docs)]

use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use switchyard_core::{
    Connection, ConnectionGraph, ConnectionType, ConnectionUsages, DeviceControlInfo, EndpointInfo,
    PathBuilder, PathFinder, RoomId,
};

const WIDTH: u32 = 8;
const TIERS: &[u32] = &[2, 4, 8];

const SOURCE_BASE: u32 = 1;
const DISPLAY_BASE: u32 = 9000;

fn switcher(tier: u32, index: u32) -> DeviceControlInfo {
    DeviceControlInfo::new(1000 * (tier + 1) + index, 0)
}

// ---------------------------------------------------------------------------
// Matrix constructor
// ---------------------------------------------------------------------------

fn matrix(tiers: u32) -> (Vec<Connection>, Vec<DeviceControlInfo>) {
    let av = ConnectionType::AUDIO | ConnectionType::VIDEO;
    let mut connections = Vec::new();
    let mut next_id = 1;
    let mut add = |src: EndpointInfo, dst: EndpointInfo| {
        connections.push(Connection::new(next_id, src, dst, av));
        next_id += 1;
    };

    for s in 0..WIDTH {
        let source = EndpointInfo::new(SOURCE_BASE + s, 0, 1);
        add(source, switcher(0, s).endpoint(100));
    }
    for tier in 0..tiers - 1 {
        for k in 0..WIDTH {
            for j in 0..WIDTH {
                add(switcher(tier, k).endpoint(j + 1), switcher(tier + 1, j).endpoint(k + 1));
            }
        }
    }
    for d in 0..WIDTH {
        add(
            switcher(tiers - 1, d).endpoint(100),
            EndpointInfo::new(DISPLAY_BASE + d, 0, 1),
        );
    }

    let midpoints = (0..tiers)
        .flat_map(|tier| (0..WIDTH).map(move |k| switcher(tier, k)))
        .collect();
    (connections, midpoints)
}

fn finder(tiers: u32) -> PathFinder {
    let (connections, midpoints) = matrix(tiers);
    let graph = ConnectionGraph::builder()
        .connections(connections)
        .midpoints(midpoints)
        .build()
        .unwrap();
    PathFinder::new(Arc::new(graph), Arc::new(ConnectionUsages::new()))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("graph/build");

    for &tiers in TIERS {
        let (connections, midpoints) = matrix(tiers);
        group.bench_with_input(BenchmarkId::from_parameter(tiers), &tiers, |b, _| {
            b.iter(|| {
                let graph = ConnectionGraph::builder()
                    .connections(connections.iter().cloned())
                    .midpoints(midpoints.iter().copied())
                    .build()
                    .unwrap();
                black_box(graph);
            });
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("path/search");

    for &tiers in TIERS {
        let finder = finder(tiers);
        let query = PathBuilder::new()
            .source(EndpointInfo::new(SOURCE_BASE, 0, 1))
            .destination(EndpointInfo::new(DISPLAY_BASE + WIDTH - 1, 0, 1))
            .of_type(ConnectionType::AUDIO | ConnectionType::VIDEO)
            .in_room(RoomId(1))
            .build();

        group.bench_with_input(BenchmarkId::new("find_paths", tiers), &tiers, |b, _| {
            b.iter(|| black_box(finder.find_paths([black_box(&query)])));
        });
        group.bench_with_input(BenchmarkId::new("has_paths", tiers), &tiers, |b, _| {
            b.iter(|| black_box(finder.has_paths([black_box(&query)])));
        });
    }

    group.finish();
}

fn bench_fan_out(c: &mut Criterion) {
    let mut group = c.benchmark_group("path/fan_out");
    let finder = finder(4);
    let queries: Vec<_> = (0..WIDTH)
        .map(|s| {
            PathBuilder::new()
                .source(EndpointInfo::new(SOURCE_BASE + s, 0, 1))
                .destination_group((0..WIDTH).map(|d| EndpointInfo::new(DISPLAY_BASE + d, 0, 1)))
                .of_type(ConnectionType::VIDEO)
                .build()
        })
        .collect();

    group.bench_function("all_sources", |b| {
        b.iter(|| black_box(finder.find_paths(queries.iter())));
    });

    group.finish();
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

criterion_group!(benches, bench_build, bench_search, bench_fan_out);
criterion_main!(benches);
