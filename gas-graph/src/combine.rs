/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/// A value that can be folded with another instance of itself using an
/// associative, commutative merge.
///
/// [`AtomicAddVector`](../gas_engine/atomic_add_vector/struct.AtomicAddVector.html)
/// and the message/gather exchanges rely on this operator to combine
/// concurrent contributions into a single slot regardless of arrival order
/// (`spec.md` §5, "Ordering guarantees").
pub trait Combinable: Clone + Send + Sync + 'static {
    /// Folds `other` into `self`, returning the combined value.
    fn combine(self, other: Self) -> Self;
}
