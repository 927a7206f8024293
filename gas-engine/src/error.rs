/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use gas_graph::error::GraphError;
use thiserror::Error;

/// The four error kinds of `spec.md` §7.
#[derive(Error, Debug)]
pub enum EngineError {
    /// A combiner was non-associative, a `signal` targeted an unknown
    /// vertex, or user callback code raised an error. Aborts the current
    /// iteration at the next barrier.
    #[error("vertex program fault: {0}")]
    UserProgramFault(String),

    /// An unknown global vertex id or a missing master was observed.
    /// Treated as an assertion failure.
    #[error("graph invariant violation: {0}")]
    GraphInvariantViolation(String),

    /// The RPC substrate failed. Fatal to the whole engine.
    #[error("transport fault: {0}")]
    TransportFault(String),

    /// The configured iteration or time budget was exhausted. Not a
    /// failure: surfaced so `run()` can report the matching `ExecStatus`.
    #[error("budget exhausted: {0}")]
    BudgetExhausted(String),
}

impl From<GraphError> for EngineError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::UnknownVertex(_) | GraphError::MissingMaster(_) => {
                EngineError::GraphInvariantViolation(err.to_string())
            }
            GraphError::Transport(_) | GraphError::MembershipChanged { .. } => {
                EngineError::TransportFault(err.to_string())
            }
        }
    }
}
