/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The opaque, user-supplied vertex program.
//!
//! This module defines the single capability set a vertex program exposes to
//! the engine — `init`, `recv_message`, `gather_edges`, `gather`, `apply`,
//! `scatter_edges`, `scatter` — plus the [`Context`] handle programs use to
//! read the current iteration and signal neighbors. The engine resolves this
//! capability set once, at engine-type instantiation (`SyncEngine<R, G, P>`),
//! rather than performing dynamic dispatch on every call.

use crate::combine::Combinable;
use crate::error::GraphError;
use crate::ids::{EdgeDirection, GlobalId};

/// Routes a signaled message to the machine that owns its target vertex.
///
/// Implemented by the engine's per-iteration message router; never
/// implemented by user code.
pub trait MessageRouter<M> {
    fn route(&mut self, target: GlobalId, msg: M) -> Result<(), GraphError>;
}

/// The handle passed to a vertex program during `gather`, `apply`, and
/// `scatter`.
///
/// `Context` must not be retained across a barrier: it borrows the engine's
/// per-iteration message router, which is only valid for the phase in which
/// it was handed out.
pub struct Context<'a, M> {
    router: &'a mut dyn MessageRouter<M>,
    iteration: usize,
}

impl<'a, M> Context<'a, M> {
    pub fn new(router: &'a mut dyn MessageRouter<M>, iteration: usize) -> Self {
        Self { router, iteration }
    }

    /// The engine's current iteration counter (read-only).
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Routes `msg` to `target` through the correct exchange, whether
    /// `target` is local or lives on a remote machine.
    pub fn signal(&mut self, target: GlobalId, msg: M) -> Result<(), GraphError> {
        self.router.route(target, msg)
    }
}

/// A neighbor reached while gathering or scattering, along with a snapshot
/// of the vertex data carried on this machine's replica of it.
pub struct EdgeRef<D> {
    pub neighbor: GlobalId,
    pub neighbor_data: D,
    pub direction: EdgeDirection,
}

/// The user vertex program: an opaque, polymorphic capability set resolved
/// once per `SyncEngine` instantiation.
///
/// A `VertexProgram` instance is the per-vertex state carried in
/// [`VertexProgramStore`](../gas_engine/vertex_program_store/struct.VertexProgramStore.html);
/// the engine clones it to mirrors via the program exchange.
pub trait VertexProgram: Clone + Send + Sync + 'static {
    /// The type of the per-vertex value stored in the graph (read/written by
    /// `apply`, replicated to mirrors by the data exchange).
    type VertexData: Clone + Send + Sync + 'static;
    /// The type combined into `message_slot`.
    type Message: Combinable;
    /// The type combined into `gather_slot`.
    type Gather: Combinable;

    /// Called once per vertex before the first iteration. Must not signal
    /// any vertex: the engine clears `active_next` immediately afterwards so
    /// that init alone never activates a vertex.
    fn init(&mut self, ctx: &mut Context<Self::Message>, vertex: &mut Self::VertexData);

    /// Called on the master when a combined message is delivered at the
    /// start of an iteration.
    fn recv_message(
        &mut self,
        ctx: &mut Context<Self::Message>,
        vertex: &mut Self::VertexData,
        msg: Self::Message,
    );

    /// The edge direction(s) to gather over for this vertex. `None` skips
    /// gather entirely.
    fn gather_edges(&self) -> EdgeDirection;

    /// Computes the partial gather contribution of a single edge.
    fn gather(&self, vertex: &Self::VertexData, edge: EdgeRef<Self::VertexData>) -> Self::Gather;

    /// Applies the combined gather result, mutating `vertex` in place.
    /// `gathered` is `None` when `gather_edges()` is `EdgeDirection::None`.
    fn apply(
        &mut self,
        ctx: &mut Context<Self::Message>,
        vertex: &mut Self::VertexData,
        gathered: Option<Self::Gather>,
    );

    /// The edge direction(s) to scatter over for this vertex. `None` skips
    /// scatter entirely.
    fn scatter_edges(&self) -> EdgeDirection;

    /// Scatters along a single edge, optionally signaling the neighbor via
    /// `ctx`.
    fn scatter(
        &self,
        ctx: &mut Context<Self::Message>,
        vertex: &Self::VertexData,
        edge: EdgeRef<Self::VertexData>,
    );
}
