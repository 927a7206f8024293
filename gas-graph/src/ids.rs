/*
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::fmt;

/// The global identifier of a vertex, stable across the whole cluster.
///
/// Local code indexes dense per-machine arrays with plain `usize`s; a
/// `GlobalId` is only meaningful when crossing a machine boundary (signaling
/// a remote vertex, or labeling an exchange payload).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GlobalId(pub u64);

impl fmt::Display for GlobalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for GlobalId {
    fn from(id: u64) -> Self {
        GlobalId(id)
    }
}

/// The identifier of a machine in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProcId(pub u32);

impl fmt::Display for ProcId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

impl From<u32> for ProcId {
    fn from(id: u32) -> Self {
        ProcId(id)
    }
}

/// The set of incident-edge directions a vertex program can request for
/// gather or scatter.
///
/// `None` skips the corresponding phase entirely for the vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    In,
    Out,
    All,
    None,
}

impl EdgeDirection {
    pub fn includes_in(self) -> bool {
        matches!(self, EdgeDirection::In | EdgeDirection::All)
    }

    pub fn includes_out(self) -> bool {
        matches!(self, EdgeDirection::Out | EdgeDirection::All)
    }
}
