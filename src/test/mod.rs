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

//! Cross-module scenario and invariant tests, mirroring the small
//! hand-built topology fixtures used elsewhere in this codebase (see
//! `route_builder`'s and `pruner`'s own inline test modules for the unit
//! level).

mod invariants;

use crate::topology::{NodeId, Topology};

/// Builds a topology from `(from, to, weight)` edges over `n` named nodes
/// `"0".."n"`, returning the topology and the nodes in creation order.
pub(crate) fn topology_from_edges(n: usize, edges: &[(usize, usize, u32)]) -> (Topology, Vec<NodeId>) {
    let mut t = Topology::new();
    let nodes: Vec<NodeId> = (0..n).map(|i| t.add_node(i.to_string())).collect();
    for &(a, b, w) in edges {
        t.add_link(nodes[a], nodes[b], w);
    }
    (t, nodes)
}
