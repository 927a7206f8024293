/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Running without any initial signal terminates immediately: no vertex is
//! ever activated, so `apply` is never called.

use gas_engine::engine::SyncEngine;
use gas_engine::status::ExecStatus;
use gas_graph::combine::Combinable;
use gas_graph::ids::EdgeDirection;
use gas_graph::in_memory::InMemoryGraph;
use gas_graph::local_cluster::LocalCluster;
use gas_graph::program::{Context, EdgeRef, VertexProgram};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Unit;

impl Combinable for Unit {
    fn combine(self, _other: Self) -> Self {
        Unit
    }
}

#[derive(Clone)]
struct NeverActivated;

impl VertexProgram for NeverActivated {
    type VertexData = u64;
    type Message = Unit;
    type Gather = Unit;

    fn init(&mut self, _ctx: &mut Context<Unit>, _vertex: &mut u64) {}
    fn recv_message(&mut self, _ctx: &mut Context<Unit>, _vertex: &mut u64, _msg: Unit) {}
    fn gather_edges(&self) -> EdgeDirection {
        EdgeDirection::In
    }
    fn gather(&self, _vertex: &u64, _edge: EdgeRef<u64>) -> Unit {
        Unit
    }
    fn apply(&mut self, _ctx: &mut Context<Unit>, _vertex: &mut u64, _gathered: Option<Unit>) {
        panic!("apply must never run without a signal");
    }
    fn scatter_edges(&self) -> EdgeDirection {
        EdgeDirection::Out
    }
    fn scatter(&self, _ctx: &mut Context<Unit>, _vertex: &u64, _edge: EdgeRef<u64>) {
        panic!("scatter must never run without a signal");
    }
}

#[test]
fn no_signal_terminates_with_zero_applies() {
    let arcs: Vec<(u64, u64)> = vec![(0, 1), (1, 2)];
    let mut graphs = InMemoryGraph::partition(1, 3, &arcs, |_g| 0u64);
    let graph = graphs.remove(0);
    let rpc = LocalCluster::new(1).remove(0);

    let mut engine = SyncEngine::new(rpc, graph, NeverActivated, 2);
    engine.initialize().unwrap();
    let status = engine.run().unwrap();

    assert_eq!(status, ExecStatus::NoMoreTasks);
    assert_eq!(engine.last_update_count(), 0);
}
