/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The distributed graph partition: an external collaborator consumed, not
//! designed, by the engine. See `spec.md` §1.

use crate::ids::{EdgeDirection, GlobalId, ProcId};

/// The local view of a graph partitioned across a cluster.
///
/// Implementations provide local↔global vertex id mapping, per-vertex
/// mastership, mirror sets, edge adjacency, and vertex-data storage for the
/// `N` local vertices (masters and mirrors) hosted on this machine. Local
/// ids are dense `usize`s in `[0, num_local_vertices())`.
pub trait DistributedGraph: Send + Sync {
    /// The authoritative/replicated per-vertex value.
    type VertexData: Clone + Send + Sync + 'static;

    /// The process this graph partition belongs to.
    fn local_proc(&self) -> ProcId;

    /// Number of local vertices (masters and mirrors combined).
    fn num_local_vertices(&self) -> usize;

    /// Maps a local vertex id to its global id.
    fn to_global(&self, local: usize) -> GlobalId;

    /// Maps a global vertex id to a local id, if the vertex (as master or
    /// mirror) lives on this machine.
    fn to_local(&self, global: GlobalId) -> Option<usize>;

    /// True if this machine is the authoritative owner of `local`.
    fn is_master(&self, local: usize) -> bool;

    /// The process that owns the master replica of `global`.
    fn master_of(&self, global: GlobalId) -> Option<ProcId>;

    /// The processes hosting mirrors of `local`. Only meaningful when
    /// `is_master(local)` holds; empty otherwise.
    fn mirrors_of(&self, local: usize) -> &[ProcId];

    /// Local ids of the neighbors reachable from `local` in the requested
    /// direction. `EdgeDirection::None` yields an empty iterator.
    fn edges(&self, local: usize, direction: EdgeDirection) -> Box<dyn Iterator<Item = usize> + '_>;

    /// Returns a snapshot of the current value of `local`'s vertex data.
    ///
    /// Implementations back this with interior mutability (e.g. a per-slot
    /// `RwLock`) so that many workers can read concurrently while the
    /// engine writes disjoint vertices from other threads in the same
    /// phase; the engine never calls `set_vertex_data` and `vertex_data` for
    /// the same `local` concurrently from two threads.
    fn vertex_data(&self, local: usize) -> Self::VertexData;

    fn set_vertex_data(&self, local: usize, data: Self::VertexData);
}
