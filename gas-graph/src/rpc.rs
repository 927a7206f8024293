/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The RPC substrate: an external collaborator consumed, not designed, by
//! the engine. See `spec.md` §1 and §6 ("Exchange wire payloads").

use crate::error::GraphError;
use crate::ids::ProcId;

/// Identifies which of the four per-iteration exchanges a batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    /// `(global_vid, program_state)` broadcast from masters to mirrors.
    Program,
    /// `(global_vid, vertex_data)` broadcast from masters to mirrors.
    VertexData,
    /// `(global_vid, message)` routed to the owning master.
    Message,
    /// `(global_vid, gather_partial)` routed from mirrors to the owning
    /// master.
    GatherPartial,
}

/// A channel tag scoped to one iteration, so batches from iteration `k` are
/// never confused with batches from iteration `k + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelTag {
    pub kind: ChannelKind,
    pub iteration: usize,
}

impl ChannelTag {
    pub fn new(kind: ChannelKind, iteration: usize) -> Self {
        Self { kind, iteration }
    }
}

/// A typed, point-to-point batch channel handed out by an
/// [`RpcSubstrate`] for one [`ChannelTag`].
///
/// `send` may be called concurrently by any worker thread; `try_recv` is
/// called only by the single coordinating thread that drains a phase's
/// inbound batches (`spec.md` §4.3, thread-safety note).
pub trait RpcChannel<T>: Send + Sync {
    /// Sends one batch to `dest`. Implementations may buffer internally;
    /// callers that need a batch visible to the destination before a
    /// barrier must still flush via the channel before that barrier, which
    /// for the in-process reference substrate happens synchronously inside
    /// `send`.
    fn send(&self, dest: ProcId, batch: Vec<T>) -> Result<(), GraphError>;

    /// Returns one pending batch addressed to this process, or `None` if
    /// none is currently available.
    fn try_recv(&self) -> Option<Vec<T>>;
}

/// Point-to-point remote calls, a full cluster barrier, and all-reduce —
/// the collective operations the engine needs from the transport layer.
///
/// Every machine must construct/call collective operations (`new`, barriers,
/// all-reduce) in the same order; this is a collaborator contract, not
/// something the engine can check at runtime.
pub trait RpcSubstrate: Send + Sync {
    fn proc_id(&self) -> ProcId;

    fn num_procs(&self) -> usize;

    /// Obtains the channel for `tag`. Repeated calls with the same tag (on
    /// the same process) return handles to the same underlying mailboxes.
    fn channel<T: Send + 'static>(&self, tag: ChannelTag) -> Box<dyn RpcChannel<T>>;

    /// A full, all-participants rendezvous that also guarantees every batch
    /// sent before the call on any process is visible to its destination
    /// after the call returns on every process.
    fn full_barrier(&self) -> Result<(), GraphError>;

    /// Collective logical OR across all processes.
    fn all_reduce_or(&self, value: bool) -> Result<bool, GraphError>;

    /// Collective sum across all processes.
    fn all_reduce_sum(&self, value: u64) -> Result<u64, GraphError>;
}
