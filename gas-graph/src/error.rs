/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::ids::GlobalId;
use thiserror::Error;

/// Errors raised by the external-collaborator layer: the distributed graph
/// partition and the RPC substrate.
///
/// These are graph/transport-invariant violations (`spec.md` §7, kinds 2 and
/// 3); engine-internal and user-program faults are [`gas_engine::error::EngineError`](../../gas-engine/error/enum.EngineError.html).
#[derive(Error, Debug)]
pub enum GraphError {
    #[error("unknown global vertex id {0}")]
    UnknownVertex(GlobalId),

    #[error("no master registered for global vertex id {0}")]
    MissingMaster(GlobalId),

    #[error("transport fault: {0}")]
    Transport(String),

    #[error("cluster membership changed mid-run (expected {expected} processes, saw {actual})")]
    MembershipChanged { expected: usize, actual: usize },
}
