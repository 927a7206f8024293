/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A fixed-size worker pool with an intra-pool barrier (`spec.md` §4.4).
//!
//! `SyncEngine` runs each phase as one call to [`PhaseWorkers::run_phase`]:
//! `W` OS threads are spawned, each striping local vertex ids
//! `l ≡ thread_id (mod W)`, and joined before the call returns. This is
//! deliberately not a work-stealing pool: the mid-phase barrier inside a
//! phase (flush the outbound exchange, then drain the inbound one) needs
//! every worker present at a known point, which a stealing scheduler does
//! not guarantee.

use std::sync::Barrier;

/// A pool of `W` fixed worker threads, re-spawned for each phase.
pub struct PhaseWorkers {
    width: usize,
}

impl PhaseWorkers {
    /// Builds a pool of `width` workers. `width` must be at least 1.
    pub fn new(width: usize) -> Self {
        assert!(width > 0, "a worker pool needs at least one thread");
        Self { width }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Runs `f(thread_id, width, &barrier)` on `width` scoped threads and
    /// waits for all of them to finish. `barrier` is shared by all workers
    /// of this call and is valid for exactly one `.wait()` round trip per
    /// caller-defined mid-phase handoff.
    pub fn run_phase<F>(&self, f: F)
    where
        F: Fn(usize, usize, &Barrier) + Send + Sync,
    {
        let barrier = Barrier::new(self.width);
        let f = &f;
        let barrier = &barrier;
        std::thread::scope(|scope| {
            for thread_id in 0..self.width {
                scope.spawn(move || f(thread_id, self.width, barrier));
            }
        });
    }
}
