/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A reference [`DistributedGraph`] implementation backed by adjacency
//! lists, grounded on the teacher's `VecGraph`/`LabeledVecGraph` (successor
//! lists built from an arc iterator). Used by tests and examples; not a
//! production graph store.

use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use rayon::prelude::*;

use crate::graph::DistributedGraph;
use crate::ids::{EdgeDirection, GlobalId, ProcId};

/// One machine's partition of an in-memory graph.
///
/// Vertices are assigned a master via `global_id % num_procs`. Edges are
/// assigned to exactly one machine via a simple hash of their endpoints
/// (vertex-cut placement); that machine then hosts a replica (master or
/// mirror) of both endpoints, exactly as `spec.md` §4.5 P2 requires ("If
/// `l` is a mirror: after processing all its edges on this machine...").
pub struct InMemoryGraph<D: Clone + Send + Sync + 'static> {
    local_proc: ProcId,
    num_procs: usize,
    global_ids: Vec<GlobalId>,
    local_index: HashMap<GlobalId, usize>,
    mirrors: Vec<Vec<ProcId>>,
    out_edges: Vec<Vec<usize>>,
    in_edges: Vec<Vec<usize>>,
    vertex_data: Vec<RwLock<D>>,
}

fn master_of_global(global: u64, num_procs: usize) -> ProcId {
    ProcId((global % num_procs as u64) as u32)
}

fn edge_owner(u: u64, v: u64, num_procs: usize) -> ProcId {
    let h = u.wrapping_mul(0x9E3779B97F4A7C15).wrapping_add(v);
    ProcId((h % num_procs as u64) as u32)
}

impl<D: Clone + Send + Sync + 'static> InMemoryGraph<D> {
    /// Partitions a graph with `num_vertices` vertices and the given arc
    /// list across `num_procs` machines, returning one [`InMemoryGraph`]
    /// per machine. `init_data` builds the initial vertex value for a given
    /// global id.
    pub fn partition(
        num_procs: usize,
        num_vertices: u64,
        arcs: &[(u64, u64)],
        init_data: impl Fn(u64) -> D + Sync,
    ) -> Vec<InMemoryGraph<D>> {
        assert!(num_procs > 0);

        let mut resident: Vec<BTreeSet<u64>> = vec![BTreeSet::new(); num_procs];
        for g in 0..num_vertices {
            resident[master_of_global(g, num_procs).0 as usize].insert(g);
        }
        for &(u, v) in arcs {
            let p = edge_owner(u, v, num_procs).0 as usize;
            resident[p].insert(u);
            resident[p].insert(v);
        }

        // Each proc's local view is built independently from `resident`/`arcs`,
        // so the per-proc construction fans out across `rayon`'s pool the
        // same way the teacher's own per-node passes do.
        (0..num_procs)
            .into_par_iter()
            .map(|p| {
                let mut global_ids = Vec::with_capacity(resident[p].len());
                let mut local_index = HashMap::with_capacity(resident[p].len());
                for &g in &resident[p] {
                    local_index.insert(GlobalId(g), global_ids.len());
                    global_ids.push(GlobalId(g));
                }
                let n = global_ids.len();

                let mut out_edges = vec![Vec::new(); n];
                let mut in_edges = vec![Vec::new(); n];
                for &(u, v) in arcs {
                    if edge_owner(u, v, num_procs).0 as usize == p {
                        let lu = local_index[&GlobalId(u)];
                        let lv = local_index[&GlobalId(v)];
                        out_edges[lu].push(lv);
                        in_edges[lv].push(lu);
                    }
                }

                let mut mirrors = vec![Vec::new(); n];
                for (l, gid) in global_ids.iter().enumerate() {
                    if master_of_global(gid.0, num_procs).0 as usize == p {
                        mirrors[l] = (0..num_procs)
                            .filter(|&q| q != p && resident[q].contains(&gid.0))
                            .map(|q| ProcId(q as u32))
                            .collect();
                    }
                }

                let vertex_data = global_ids.iter().map(|g| RwLock::new(init_data(g.0))).collect();

                InMemoryGraph {
                    local_proc: ProcId(p as u32),
                    num_procs,
                    global_ids,
                    local_index,
                    mirrors,
                    out_edges,
                    in_edges,
                    vertex_data,
                }
            })
            .collect()
    }
}

impl<D: Clone + Send + Sync + 'static> DistributedGraph for InMemoryGraph<D> {
    type VertexData = D;

    fn local_proc(&self) -> ProcId {
        self.local_proc
    }

    fn num_local_vertices(&self) -> usize {
        self.global_ids.len()
    }

    fn to_global(&self, local: usize) -> GlobalId {
        self.global_ids[local]
    }

    fn to_local(&self, global: GlobalId) -> Option<usize> {
        self.local_index.get(&global).copied()
    }

    fn is_master(&self, local: usize) -> bool {
        master_of_global(self.global_ids[local].0, self.num_procs) == self.local_proc
    }

    fn master_of(&self, global: GlobalId) -> Option<ProcId> {
        Some(master_of_global(global.0, self.num_procs))
    }

    fn mirrors_of(&self, local: usize) -> &[ProcId] {
        &self.mirrors[local]
    }

    fn edges(&self, local: usize, direction: EdgeDirection) -> Box<dyn Iterator<Item = usize> + '_> {
        match direction {
            EdgeDirection::None => Box::new(std::iter::empty()),
            EdgeDirection::Out => Box::new(self.out_edges[local].iter().copied()),
            EdgeDirection::In => Box::new(self.in_edges[local].iter().copied()),
            EdgeDirection::All => Box::new(
                self.out_edges[local]
                    .iter()
                    .chain(self.in_edges[local].iter())
                    .copied(),
            ),
        }
    }

    fn vertex_data(&self, local: usize) -> D {
        self.vertex_data[local].read().unwrap().clone()
    }

    fn set_vertex_data(&self, local: usize, data: D) {
        *self.vertex_data[local].write().unwrap() = data;
    }
}
