/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// The final outcome of a [`SyncEngine::run`](../engine/struct.SyncEngine.html#method.run) call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    /// `run()` has not been called yet.
    Unset,
    /// `max_iterations` was reached while messages were still pending.
    TaskBudgetExceeded,
    /// The configured wall-clock budget elapsed.
    Timeout,
    /// A configured termination function returned `true`.
    TermFunction,
    /// No messages were pending at an iteration boundary: the run reached a
    /// fixed point.
    NoMoreTasks,
    /// `stop()` was called, or a user-program fault aborted the run.
    ForcedAbort,
}
