/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::time::Duration;

/// Tunables recognized by [`SyncEngine::set_options`](../engine/struct.SyncEngine.html#method.set_options).
///
/// Construct with [`EngineOptions::new`] and configure with the setters; all
/// fields have the defaults `spec.md` §6 specifies.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Hard cap on the number of iterations. `None` means unbounded, subject
    /// only to quiescence or `stop()`.
    pub(crate) max_iterations: Option<usize>,
    /// When set, a vertex whose `gather_slot` is already populated at P2
    /// entry skips recomputation instead of being recombined from scratch.
    pub(crate) use_gather_cache: bool,
    /// Per-destination batch size at which a [`BufferedExchange`](../exchange/struct.BufferedExchange.html)
    /// eagerly flushes instead of waiting for the phase's mandatory flush.
    pub(crate) buffer_limit: usize,
    /// Optional wall-clock budget for the whole `run()` call, checked at
    /// phase boundaries.
    pub(crate) timeout: Option<Duration>,
}

const DEFAULT_BUFFER_LIMIT: usize = 4096;

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_iterations: None,
            use_gather_cache: false,
            buffer_limit: DEFAULT_BUFFER_LIMIT,
            timeout: None,
        }
    }
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn use_gather_cache(mut self, use_gather_cache: bool) -> Self {
        self.use_gather_cache = use_gather_cache;
        self
    }

    pub fn buffer_limit(mut self, buffer_limit: usize) -> Self {
        assert!(buffer_limit > 0, "buffer_limit must be positive");
        self.buffer_limit = buffer_limit;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}
