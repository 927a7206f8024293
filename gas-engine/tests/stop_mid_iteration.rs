/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A vertex program that signals forever runs until `stop()` is called from
//! another thread; the engine must abort promptly rather than spin forever.

use std::sync::atomic::Ordering;
use std::time::Duration;

use gas_engine::engine::SyncEngine;
use gas_engine::status::ExecStatus;
use gas_graph::combine::Combinable;
use gas_graph::ids::EdgeDirection;
use gas_graph::in_memory::InMemoryGraph;
use gas_graph::local_cluster::LocalCluster;
use gas_graph::program::{Context, EdgeRef, VertexProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Wake;

impl Combinable for Wake {
    fn combine(self, _other: Self) -> Self {
        Wake
    }
}

/// Pings its single neighbor every iteration, forever, so the only way this
/// run terminates is cooperative cancellation.
#[derive(Clone)]
struct Forever;

impl VertexProgram for Forever {
    type VertexData = u64;
    type Message = Wake;
    type Gather = Wake;

    fn init(&mut self, _ctx: &mut Context<Wake>, _vertex: &mut u64) {}

    fn recv_message(&mut self, _ctx: &mut Context<Wake>, vertex: &mut u64, _msg: Wake) {
        *vertex += 1;
    }

    fn gather_edges(&self) -> EdgeDirection {
        EdgeDirection::In
    }

    fn gather(&self, _vertex: &u64, _edge: EdgeRef<u64>) -> Wake {
        Wake
    }

    fn apply(&mut self, _ctx: &mut Context<Wake>, _vertex: &mut u64, _gathered: Option<Wake>) {}

    fn scatter_edges(&self) -> EdgeDirection {
        EdgeDirection::Out
    }

    fn scatter(&self, ctx: &mut Context<Wake>, _vertex: &u64, edge: EdgeRef<u64>) {
        ctx.signal(edge.neighbor, Wake).unwrap();
    }
}

#[test]
fn stop_aborts_an_unbounded_run_promptly() {
    // Two vertices signaling each other back and forth, forever.
    let arcs: Vec<(u64, u64)> = vec![(0, 1), (1, 0)];
    let mut graphs = InMemoryGraph::partition(1, 2, &arcs, |_g| 0u64);
    let graph = graphs.remove(0);
    let rpc = LocalCluster::new(1).remove(0);

    let mut engine = SyncEngine::new(rpc, graph, Forever, 2);
    engine.initialize().unwrap();
    engine.signal_all(Wake).unwrap();
    let stop_handle = engine.stop_handle();

    let status = std::thread::scope(|scope| {
        scope.spawn(move || {
            std::thread::sleep(Duration::from_millis(20));
            stop_handle.store(true, Ordering::SeqCst);
        });
        engine.run().unwrap()
    });

    assert_eq!(status, ExecStatus::ForcedAbort);
}
