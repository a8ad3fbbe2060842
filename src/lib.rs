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

#![deny(missing_docs, missing_debug_implementations)]

//! # lfid-routing
//!
//! Computes Loop-Free Inport-Dependent (LFID) forwarding tables for a
//! weighted, undirected network topology.
//!
//! Given a [`topology::Topology`] and a set of destinations, [`compute_routes`]
//! builds a per-node [`abs_fib::AbsFib`] containing classified next-hops: a
//! *downward* next-hop strictly decreases the cost to the destination, while
//! an *upward* next-hop does not, and is retained only if it can be proven
//! loop-free and dead-end-free.
//!
//! ## Pipeline
//!
//! 1. [`route_builder::RouteBuilder`] classifies every candidate next-hop at
//!    every node, using masked shortest-path computations on the topology
//!    graph (see [Petgraph](https://docs.rs/petgraph)).
//! 2. [`pruner::LoopAndDeadEndPruner`] removes upward next-hops that would
//!    close a forwarding loop, then removes upward next-hops that lead into
//!    a dead end.
//!
//! This crate computes the abstract forwarding tables only. Installing them
//! into a live simulator's runtime FIB, resolving faces/interfaces, and
//! parsing topology description formats are left to the caller.

pub mod abs_fib;
pub mod error;
pub mod fib_next_hop;
pub mod pruner;
pub mod route_builder;
pub mod topology;

#[cfg(test)]
mod test;

pub use abs_fib::{AbsFib, AllNodeFib};
pub use error::LfidError;
pub use fib_next_hop::{FibNextHop, NextHopType};
pub use topology::{NodeId, Topology, COST_INF, MAX_COST};

use log::info;

/// Computes loop-free, dead-end-free forwarding tables for every node in
/// `topology`, routing toward every destination in `destinations`.
///
/// Runs [`route_builder::RouteBuilder`] to classify next-hops, then
/// [`pruner::LoopAndDeadEndPruner`] to remove loops (first) and dead ends
/// (second). See the crate-level documentation for the algorithm outline.
pub fn compute_routes(
    topology: &Topology,
    destinations: &[NodeId],
) -> Result<AllNodeFib, LfidError> {
    let mut fibs = route_builder::RouteBuilder::new(topology).build(destinations)?;

    let pruner = pruner::LoopAndDeadEndPruner::new();
    let loop_stats = pruner.remove_loops(&mut fibs, destinations)?;
    let de_stats = pruner.remove_dead_ends(&mut fibs, destinations)?;

    info!(
        "computed routes for {} nodes, {} destinations: {} upward next-hops found, \
         {} loops removed, {} dead ends removed, {} upward next-hops remaining",
        fibs.len(),
        destinations.len(),
        loop_stats.upward_found,
        loop_stats.removed,
        de_stats.removed,
        loop_stats.upward_found - loop_stats.removed - de_stats.removed,
    );

    Ok(fibs)
}

/// Computes routes toward every node in `topology`, i.e.
/// `compute_routes(topology, topology.node_ids())`.
pub fn compute_all_routes(topology: &Topology) -> Result<AllNodeFib, LfidError> {
    let destinations: Vec<NodeId> = topology.node_ids().collect();
    compute_routes(topology, &destinations)
}
