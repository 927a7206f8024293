/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! A dense array holding one user-program instance per local vertex
//! (`spec.md` §4, `program[]`).
//!
//! Workers striping over disjoint vertex ids during a phase never touch the
//! same slot from two threads, so concurrent `set` calls from different
//! workers are sound as long as every call addresses an index no other
//! thread is reading or writing at the same time. That precondition is
//! exactly the striping discipline [`PhaseWorkers`](../workers/struct.PhaseWorkers.html)
//! already enforces, so it is asserted here rather than re-checked.

use std::cell::UnsafeCell;

/// One vertex-program instance per local vertex id.
pub struct VertexProgramStore<P: Clone> {
    programs: Vec<UnsafeCell<P>>,
}

// SAFETY: `get` and `set` only ever touch the single slot at index `l`.
// Callers are required to address disjoint indices from concurrent threads
// (the striping contract of a phase), so two threads never race on the same
// `UnsafeCell`.
unsafe impl<P: Clone + Send> Sync for VertexProgramStore<P> {}

impl<P: Clone> VertexProgramStore<P> {
    /// Builds a store of `n` slots, all holding `initial.clone()`.
    pub fn new(n: usize, initial: P) -> Self {
        Self {
            programs: (0..n).map(|_| UnsafeCell::new(initial.clone())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// A snapshot read of the program installed at `l`.
    pub fn get(&self, l: usize) -> P {
        // SAFETY: see the impl-level comment; `l` is not being written by
        // another thread concurrently under the striping contract.
        unsafe { (*self.programs[l].get()).clone() }
    }

    /// Installs `program` at `l`. Callers from multiple threads must address
    /// disjoint `l`; see the type-level contract above.
    pub fn set(&self, l: usize, program: P) {
        // SAFETY: see the impl-level comment.
        unsafe {
            *self.programs[l].get() = program;
        }
    }

    /// Single-threaded resize, used only at initialization.
    pub fn resize(&mut self, n: usize, initial: P) {
        self.programs = (0..n).map(|_| UnsafeCell::new(initial.clone())).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug)]
    struct Dummy(u64);

    #[test]
    fn set_then_get_round_trips() {
        let store = VertexProgramStore::new(4, Dummy(0));
        store.set(2, Dummy(42));
        assert_eq!(store.get(2), Dummy(42));
        assert_eq!(store.get(0), Dummy(0));
    }

    #[test]
    fn disjoint_concurrent_installs_land_at_the_right_slots() {
        let store = VertexProgramStore::new(8, Dummy(0));
        std::thread::scope(|s| {
            for i in 0..8u64 {
                let store = &store;
                s.spawn(move || store.set(i as usize, Dummy(i * 10)));
            }
        });
        for i in 0..8u64 {
            assert_eq!(store.get(i as usize), Dummy(i * 10));
        }
    }
}
