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

//! Removes upward next-hops that would cause a forwarding loop or a dead
//! end, per destination.

use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap, HashSet, VecDeque};

use log::info;

use crate::abs_fib::AllNodeFib;
use crate::error::LfidError;
use crate::fib_next_hop::{FibNextHop, NextHopType};
use crate::topology::{Cost, NodeId};

/// Per-destination directed arc graph built from every node's current
/// candidate next-hops, regardless of classification.
type ArcGraph = HashMap<NodeId, HashSet<NodeId>>;

/// Summary counters from [`LoopAndDeadEndPruner::remove_loops`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopStats {
    /// Total upward next-hops present before loop removal.
    pub upward_found: usize,
    /// Upward next-hops removed because they would have closed a cycle.
    pub removed: usize,
}

/// Summary counters from [`LoopAndDeadEndPruner::remove_dead_ends`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeadEndStats {
    /// Upward next-hops removed because they led into a dead end.
    pub removed: usize,
}

/// Runs the two pruning passes over an [`AllNodeFib`] produced by
/// [`crate::route_builder::RouteBuilder`]. Stateless: all working data is
/// scoped to a single call.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoopAndDeadEndPruner;

impl LoopAndDeadEndPruner {
    /// Creates a pruner.
    pub fn new() -> Self {
        Self
    }

    /// Removes every upward next-hop that would close a forwarding loop,
    /// one destination at a time. For each destination, nodes with
    /// surviving upward next-hops are processed most-constrained-first
    /// (the node with the most remaining candidates, tie-broken toward the
    /// largest cost-delta and then the largest node id), repeatedly testing
    /// whether using the highest-cost-delta remaining upward next-hop would
    /// let traffic loop back to the originating node.
    pub fn remove_loops(
        &self,
        fibs: &mut AllNodeFib,
        destinations: &[NodeId],
    ) -> Result<LoopStats, LfidError> {
        let mut stats = LoopStats::default();

        for &dst in destinations {
            let mut graph = build_arc_graph(fibs, dst);
            let mut heap: BinaryHeap<NodePrio> = BinaryHeap::new();

            for (&node_id, fib) in fibs.iter() {
                if node_id == dst || !fib.contains(dst) {
                    continue;
                }
                let uw = fib.upward_nhs(dst);
                stats.upward_found += uw.len();
                let remaining = fib.num_enabled_nh_per_dst(dst);
                if uw.is_empty() || uw.len() >= remaining {
                    continue;
                }
                heap.push(NodePrio {
                    node_id,
                    remaining_nh: remaining,
                    uw_set: uw.clone(),
                });
            }

            while let Some(mut prio) = heap.pop() {
                let u = prio.node_id;
                let nh = prio.pop_highest_uw();
                let v = nh.nh_id();

                let reverse_existed = graph.get(&v).is_some_and(|s| s.contains(&u));
                if reverse_existed {
                    graph.get_mut(&v).unwrap().remove(&u);
                }

                let will_loop = reachable(&graph, v, u);

                if will_loop {
                    fibs.get_mut(&u)
                        .expect("node present in fibs")
                        .erase(dst, v)?;
                    prio.remaining_nh -= 1;
                    stats.removed += 1;
                    if let Some(arcs) = graph.get_mut(&u) {
                        arcs.remove(&v);
                    }
                }

                if reverse_existed {
                    graph.entry(v).or_default().insert(u);
                }

                if !prio.uw_set.is_empty() {
                    heap.push(prio);
                }
            }
        }

        info!(
            "loop removal: {} upward next-hops found, {} removed",
            stats.upward_found, stats.removed
        );
        Ok(stats)
    }

    /// Removes every remaining upward next-hop `u -> v` where `v`'s only
    /// surviving next-hop toward the destination is back through `u`.
    /// Removing such a next-hop can strand nodes that used `u` as a
    /// downward next-hop, so their corresponding upward next-hop (back
    /// through `u`) is re-enqueued for consideration.
    ///
    /// Candidates are ordered ascending by `(node_id, cost_delta, cost,
    /// nh_id)` — primarily by the id of the node the candidate belongs to,
    /// not by cost-delta — matching the original implementation's actual
    /// container order (see `DESIGN.md`).
    pub fn remove_dead_ends(
        &self,
        fibs: &mut AllNodeFib,
        destinations: &[NodeId],
    ) -> Result<DeadEndStats, LfidError> {
        let mut stats = DeadEndStats::default();

        for &dst in destinations {
            let mut queue: BTreeSet<(NodeId, FibNextHop)> = BTreeSet::new();
            for (&u, fib) in fibs.iter() {
                if u == dst {
                    continue;
                }
                for nh in fib.upward_nhs(dst) {
                    queue.insert((u, *nh));
                }
            }

            while let Some((u, nh)) = queue.pop_first() {
                let v = nh.nh_id();
                if v == dst {
                    continue;
                }

                let reverse_entries = fibs
                    .get(&v)
                    .map(|f| f.num_enabled_nh_per_dst(dst))
                    .unwrap_or(0);
                if reverse_entries == 0 {
                    return Err(LfidError::InvariantViolated {
                        node: Some(v),
                        dst: Some(dst),
                        detail: "destination entry unexpectedly empty during dead-end removal"
                            .into(),
                    });
                }

                if reverse_entries > 1 {
                    continue;
                }

                fibs.get_mut(&u)
                    .expect("node present in fibs")
                    .erase(dst, v)?;
                stats.removed += 1;

                let downstream: Vec<NodeId> = fibs[&u]
                    .nhs(dst)
                    .iter()
                    .filter(|nh2| matches!(nh2.kind(), NextHopType::Downward) && nh2.nh_id() != dst)
                    .map(|nh2| nh2.nh_id())
                    .collect();

                for w in downstream {
                    let Some(w_fib) = fibs.get(&w) else { continue };
                    if let Some(back) = w_fib.nhs(dst).iter().find(|y| y.nh_id() == u).copied() {
                        debug_assert_eq!(back.kind(), NextHopType::Upward);
                        queue.insert((w, back));
                    }
                }
            }
        }

        info!("dead-end removal: {} removed", stats.removed);
        Ok(stats)
    }
}

fn build_arc_graph(fibs: &AllNodeFib, dst: NodeId) -> ArcGraph {
    let mut g = ArcGraph::new();
    for (&u, fib) in fibs {
        if u == dst {
            continue;
        }
        for nh in fib.nhs(dst) {
            g.entry(u).or_default().insert(nh.nh_id());
        }
    }
    g
}

fn reachable(graph: &ArcGraph, start: NodeId, goal: NodeId) -> bool {
    if start == goal {
        return true;
    }
    let mut seen: HashSet<NodeId> = HashSet::from([start]);
    let mut queue: VecDeque<NodeId> = VecDeque::from([start]);
    while let Some(u) = queue.pop_front() {
        let Some(neighbors) = graph.get(&u) else {
            continue;
        };
        for &v in neighbors {
            if v == goal {
                return true;
            }
            if seen.insert(v) {
                queue.push_back(v);
            }
        }
    }
    false
}

/// A node still holding upward next-hop candidates, queued for loop
/// checking. Ordered ascending by `(remaining_nh, highest upward
/// cost-delta, node_id)`; `BinaryHeap` pops the *largest* such tuple first,
/// i.e. the node with the most remaining candidates.
#[derive(Debug, Clone)]
struct NodePrio {
    node_id: NodeId,
    remaining_nh: usize,
    uw_set: BTreeSet<FibNextHop>,
}

impl NodePrio {
    fn highest_uw(&self) -> FibNextHop {
        *self
            .uw_set
            .iter()
            .next_back()
            .expect("uw_set must be non-empty while queued")
    }

    fn pop_highest_uw(&mut self) -> FibNextHop {
        let max = self.highest_uw();
        self.uw_set.remove(&max);
        max
    }

    fn key(&self) -> (usize, Cost, NodeId) {
        let h = self.highest_uw();
        (self.remaining_nh, h.cost_delta(), self.node_id)
    }
}

impl PartialEq for NodePrio {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for NodePrio {}

impl PartialOrd for NodePrio {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodePrio {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}
