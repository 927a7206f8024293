/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A machine that masters no vertex at all must still drive every
//! collective call `run()` makes in lockstep with its peers, contributing
//! zero applies of its own — but it is not idle: it hosts mirrors of the
//! two vertices touching the one edge it happens to own, and it is the
//! machine that actually performs both scatters in this run, using vertex
//! data synced to it by each master's post-apply broadcast.

use gas_engine::engine::SyncEngine;
use gas_engine::status::ExecStatus;
use gas_graph::combine::Combinable;
use gas_graph::graph::DistributedGraph;
use gas_graph::ids::{EdgeDirection, GlobalId};
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

#[derive(Clone)]
struct Relay;

impl VertexProgram for Relay {
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
fn an_idle_master_still_completes_every_barrier_and_hosts_real_mirror_work() {
    // 4 machines, 3 vertices, one directed edge. Vertex masters land on
    // procs 0, 1, 2 (id % 4); proc 3 masters nothing. The edge (1, 2) hashes
    // to proc 3 under `edge_owner`, so proc 3 ends up resident for both of
    // its endpoints as mirrors, and is the only machine with the local edge
    // data needed to actually perform either scatter.
    let arcs: Vec<(u64, u64)> = vec![(1, 2)];
    let graphs = InMemoryGraph::partition(4, 3, &arcs, |_g| 0u64);
    let clusters = LocalCluster::new(4);

    let idle = &graphs[3];
    assert!(
        (0..idle.num_local_vertices()).all(|l| !idle.is_master(l)),
        "proc 3 must master nothing for this scenario"
    );
    assert!(
        idle.num_local_vertices() > 0,
        "proc 3 must still host mirrors, not be entirely empty"
    );

    let results: Vec<(ExecStatus, u64, Vec<(u64, u64)>)> = std::thread::scope(|scope| {
        let handles: Vec<_> = graphs
            .into_iter()
            .zip(clusters)
            .map(|(graph, rpc)| {
                scope.spawn(move || {
                    let mut engine = SyncEngine::new(rpc, graph, Relay, 2);
                    engine.initialize().unwrap();
                    let owns_source = engine
                        .graph()
                        .to_local(GlobalId(1))
                        .is_some_and(|local| engine.graph().is_master(local));
                    if owns_source {
                        engine.signal(GlobalId(1), Wake).unwrap();
                    }
                    let status = engine.run().unwrap();
                    let g = engine.graph();
                    let local_data: Vec<(u64, u64)> = (0..g.num_local_vertices())
                        .map(|l| (g.to_global(l).0, g.vertex_data(l)))
                        .collect();
                    (status, engine.last_update_count(), local_data)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for (status, last_update_count, _) in &results {
        assert_eq!(*status, ExecStatus::NoMoreTasks);
        // Exactly vertex 1 and vertex 2 each apply once, both on masters
        // other than the idle proc.
        assert_eq!(*last_update_count, 2);
    }

    // Proc 3 (the idle master) is the 4th result, matching partition order.
    let (_, _, idle_data) = &results[3];
    let mirrored_1 = idle_data.iter().find(|(g, _)| *g == 1).map(|(_, d)| *d);
    let mirrored_2 = idle_data.iter().find(|(g, _)| *g == 2).map(|(_, d)| *d);
    assert_eq!(mirrored_1, Some(1), "proc 3's mirror of vertex 1 should see its master's post-apply data");
    assert_eq!(mirrored_2, Some(1), "proc 3's mirror of vertex 2 should see its master's post-apply data");
}
