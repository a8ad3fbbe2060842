// LFID Routing: loop-free inport-dependent route computation
// Copyright (C) 2019-2023 Klaus Schneider, The University of Arizona
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! Errors produced while building or pruning forwarding tables.

use thiserror::Error;

use crate::topology::NodeId;

/// Errors produced by route computation. Both variants are fatal: they
/// indicate either a broken data-structure invariant or a topology that
/// cannot be routed as given, and neither is recoverable by the caller
/// beyond reporting it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LfidError {
    /// A forwarding-table invariant was violated: a duplicate next-hop, a
    /// missing downward entry, an out-of-range cost, or an attempt to erase
    /// a non-upward or non-existent entry.
    #[error("invariant violated at node {node:?} (dst {dst:?}): {detail}")]
    InvariantViolated {
        /// Node whose FIB failed the check.
        node: Option<NodeId>,
        /// Destination the failing entry belongs to, if applicable.
        dst: Option<NodeId>,
        /// Human-readable description of the offending next-hop or state.
        detail: String,
    },
    /// The topology could not be routed as given: a reachable destination
    /// produced no surviving candidate next-hop, or a neighbor's path cost
    /// came out below the shortest-path cost it is supposed to bound.
    #[error("topology inconsistent at node {node:?} (dst {dst:?}): {detail}")]
    TopologyInconsistent {
        /// Node at which the inconsistency was detected.
        node: Option<NodeId>,
        /// Destination involved, if applicable.
        dst: Option<NodeId>,
        /// Human-readable description of the inconsistency.
        detail: String,
    },
}
