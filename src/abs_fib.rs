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

//! Per-node abstract forwarding table.

use std::collections::{BTreeSet, HashMap};

use crate::error::LfidError;
use crate::fib_next_hop::{FibNextHop, NextHopType};
use crate::topology::NodeId;

/// Every node's [`AbsFib`], keyed by node id.
pub type AllNodeFib = HashMap<NodeId, AbsFib>;

static EMPTY: BTreeSet<FibNextHop> = BTreeSet::new();

/// One node's forwarding table: for every destination, a sorted set of
/// candidate next-hops, plus the subset currently classified as upward.
///
/// Entries are inserted once during classification ([`crate::route_builder`])
/// and only ever removed afterward, during pruning
/// ([`crate::pruner::LoopAndDeadEndPruner`]) — never mutated in place.
#[derive(Debug, Clone)]
pub struct AbsFib {
    node_id: NodeId,
    node_name: String,
    node_degree: usize,
    num_nodes: usize,
    per_dst: HashMap<NodeId, BTreeSet<FibNextHop>>,
    upward_per_dst: HashMap<NodeId, BTreeSet<FibNextHop>>,
}

impl AbsFib {
    /// Creates an empty FIB for `node_id`, with one empty destination entry
    /// pre-populated for every other node `d` in `0..num_nodes`'s id space
    /// that `route_builder` subsequently fills in (destinations that remain
    /// unreachable stay absent rather than holding an empty set, see
    /// [`Self::contains`]).
    pub fn new(node_id: NodeId, node_name: impl Into<String>, node_degree: usize, num_nodes: usize) -> Self {
        Self {
            node_id,
            node_name: node_name.into(),
            node_degree,
            num_nodes,
            per_dst: HashMap::new(),
            upward_per_dst: HashMap::new(),
        }
    }

    /// This node's id.
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// This node's human-readable name.
    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Number of direct neighbors this node has in the topology.
    pub fn degree(&self) -> usize {
        self.node_degree
    }

    /// Total number of nodes in the topology this FIB was built against.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Whether this FIB has any entry (possibly empty) for `dst`.
    pub fn contains(&self, dst: NodeId) -> bool {
        self.per_dst.contains_key(&dst)
    }

    /// All destinations this FIB has at least attempted to route toward.
    pub fn destinations(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.per_dst.keys().copied()
    }

    /// Candidate next-hops toward `dst`, in `(cost_delta, cost, nh_id)`
    /// ascending order. Empty if `dst` was never reachable.
    pub fn nhs(&self, dst: NodeId) -> &BTreeSet<FibNextHop> {
        self.per_dst.get(&dst).unwrap_or(&EMPTY)
    }

    /// Upward-only subset of [`Self::nhs`].
    pub fn upward_nhs(&self, dst: NodeId) -> &BTreeSet<FibNextHop> {
        self.upward_per_dst.get(&dst).unwrap_or(&EMPTY)
    }

    /// Next-hop at the given position in `(cost_delta, cost, nh_id)` order.
    /// Position `0` is always the shortest-path (downward) next-hop.
    pub fn nh_at_pos(&self, dst: NodeId, pos: usize) -> Option<&FibNextHop> {
        self.nhs(dst).iter().nth(pos)
    }

    /// Number of candidate next-hops (of any kind) toward `dst`.
    pub fn num_enabled_nh_per_dst(&self, dst: NodeId) -> usize {
        self.nhs(dst).len()
    }

    /// Number of next-hops of the given `kind` toward `dst`.
    pub fn num_type_per_dst(&self, dst: NodeId, kind: NextHopType) -> usize {
        self.nhs(dst).iter().filter(|nh| nh.kind() == kind).count()
    }

    /// Total next-hops across all destinations.
    pub fn total_nexthops(&self) -> usize {
        self.per_dst.values().map(BTreeSet::len).sum()
    }

    /// Total upward next-hops across all destinations.
    pub fn count_uw_nexthops(&self) -> usize {
        self.upward_per_dst.values().map(BTreeSet::len).sum()
    }

    /// Inserts `nh` into the candidate set for `dst`.
    ///
    /// Fails if `dst == self.node_id()`, if `nh.nh_id() == self.node_id()`,
    /// if `nh` is [`NextHopType::Disabled`], or if an entry for the same
    /// neighbor already exists for `dst`.
    pub fn insert(&mut self, dst: NodeId, nh: FibNextHop) -> Result<(), LfidError> {
        if dst == self.node_id {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: "cannot insert a next-hop for self as destination".into(),
            });
        }
        if nh.nh_id() == self.node_id {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: "next-hop cannot be the owning node itself".into(),
            });
        }
        if matches!(nh.kind(), NextHopType::Disabled) {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: "cannot insert a Disabled next-hop".into(),
            });
        }
        let set = self.per_dst.entry(dst).or_default();
        if !set.insert(nh) {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: format!("duplicate next-hop via {:?}", nh.nh_id()),
            });
        }
        if matches!(nh.kind(), NextHopType::Upward) {
            self.upward_per_dst.entry(dst).or_default().insert(nh);
        }
        Ok(())
    }

    /// Removes the next-hop via `nh_id` from `dst`'s candidate set.
    ///
    /// The caller guarantees the entry exists and is classified
    /// [`NextHopType::Upward`] — the pruner never erases downward entries.
    pub fn erase(&mut self, dst: NodeId, nh_id: NodeId) -> Result<(), LfidError> {
        let Some(set) = self.per_dst.get_mut(&dst) else {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: "erase on unknown destination".into(),
            });
        };
        let found = set.iter().find(|nh| nh.nh_id() == nh_id).copied();
        let Some(nh) = found else {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: format!("erase of nonexistent next-hop via {nh_id:?}"),
            });
        };
        if !matches!(nh.kind(), NextHopType::Upward) {
            return Err(LfidError::InvariantViolated {
                node: Some(self.node_id),
                dst: Some(dst),
                detail: format!("erase of non-upward next-hop via {nh_id:?}"),
            });
        }
        set.remove(&nh);
        if let Some(uw) = self.upward_per_dst.get_mut(&dst) {
            uw.remove(&nh);
        }
        Ok(())
    }

    /// Validates per-destination invariants: every destination entry is
    /// non-empty, holds at least one downward next-hop, has no duplicate
    /// neighbor, and the upward projection matches the upward subset of the
    /// candidate set.
    pub fn check_fib(&self) -> Result<(), LfidError> {
        for (&dst, set) in &self.per_dst {
            if set.is_empty() {
                return Err(LfidError::InvariantViolated {
                    node: Some(self.node_id),
                    dst: Some(dst),
                    detail: "destination has no next-hops".into(),
                });
            }
            if !set.iter().any(|nh| matches!(nh.kind(), NextHopType::Downward)) {
                return Err(LfidError::InvariantViolated {
                    node: Some(self.node_id),
                    dst: Some(dst),
                    detail: "destination has no downward next-hop".into(),
                });
            }
            let expected_upward: BTreeSet<FibNextHop> = set
                .iter()
                .filter(|nh| matches!(nh.kind(), NextHopType::Upward))
                .copied()
                .collect();
            let actual_upward = self.upward_per_dst.get(&dst).cloned().unwrap_or_default();
            if expected_upward != actual_upward {
                return Err(LfidError::InvariantViolated {
                    node: Some(self.node_id),
                    dst: Some(dst),
                    detail: "upward projection does not match candidate set".into(),
                });
            }
        }
        Ok(())
    }
}
