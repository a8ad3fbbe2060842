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

//! A single candidate next-hop entry in a node's forwarding table.

use crate::error::LfidError;
use crate::topology::{Cost, NodeId, MAX_COST};

/// Classification of a [`FibNextHop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NextHopType {
    /// Strictly decreases the cost to the destination.
    Downward,
    /// Does not decrease the cost to the destination; retained only if
    /// proven loop-free and dead-end-free.
    Upward,
    /// Never stored; only valid as a construction default that must be
    /// replaced before the entry is inserted into a FIB.
    Disabled,
}

/// One candidate next-hop toward some (implicit) destination.
///
/// Ordered ascending by `(cost_delta, cost, nh_id)`: downward entries
/// (`cost_delta == 0`) always sort before upward ones, and among upward
/// entries the cheapest and lowest-numbered neighbor sorts first.
#[derive(Debug, Clone, Copy)]
pub struct FibNextHop {
    cost: Cost,
    nh_id: NodeId,
    kind: NextHopType,
    cost_delta: Cost,
}

impl FibNextHop {
    /// Builds a next-hop entry. `cost` must be in `(0, MAX_COST)`, and
    /// `cost_delta` must be zero exactly when `kind` is
    /// [`NextHopType::Downward`].
    pub fn new(
        cost: Cost,
        nh_id: NodeId,
        cost_delta: Cost,
        kind: NextHopType,
    ) -> Result<Self, LfidError> {
        if cost == 0 || cost >= MAX_COST {
            return Err(LfidError::InvariantViolated {
                node: None,
                dst: None,
                detail: format!("next-hop cost {cost} out of range (0, {MAX_COST})"),
            });
        }
        match kind {
            NextHopType::Disabled => {
                return Err(LfidError::InvariantViolated {
                    node: None,
                    dst: None,
                    detail: "next-hop cannot be constructed as Disabled".into(),
                })
            }
            NextHopType::Downward if cost_delta != 0 => {
                return Err(LfidError::InvariantViolated {
                    node: None,
                    dst: None,
                    detail: format!(
                        "downward next-hop to {nh_id:?} must have cost_delta 0, got {cost_delta}"
                    ),
                })
            }
            NextHopType::Upward if cost_delta == 0 => {
                return Err(LfidError::InvariantViolated {
                    node: None,
                    dst: None,
                    detail: format!(
                        "upward next-hop to {nh_id:?} must have nonzero cost_delta"
                    ),
                })
            }
            _ => {}
        }
        Ok(Self {
            cost,
            nh_id,
            cost_delta,
            kind,
        })
    }

    /// Id of the next-hop neighbor.
    pub fn nh_id(&self) -> NodeId {
        self.nh_id
    }

    /// Total cost to the destination through this next-hop.
    pub fn cost(&self) -> Cost {
        self.cost
    }

    /// `cost` minus the shortest-path cost to the destination.
    pub fn cost_delta(&self) -> Cost {
        self.cost_delta
    }

    /// Current classification.
    pub fn kind(&self) -> NextHopType {
        self.kind
    }

    /// Reclassifies this entry. Rejects [`NextHopType::Disabled`].
    pub fn set_kind(&mut self, kind: NextHopType) -> Result<(), LfidError> {
        if matches!(kind, NextHopType::Disabled) {
            return Err(LfidError::InvariantViolated {
                node: None,
                dst: None,
                detail: "cannot set next-hop kind to Disabled".into(),
            });
        }
        self.kind = kind;
        Ok(())
    }

    /// Updates `cost`/`cost_delta` in place. Rejects a non-positive cost.
    pub fn set_cost(&mut self, new_cost: Cost, new_cost_delta: Cost) -> Result<(), LfidError> {
        if new_cost == 0 {
            return Err(LfidError::InvariantViolated {
                node: None,
                dst: None,
                detail: "next-hop cost must be positive".into(),
            });
        }
        self.cost = new_cost;
        self.cost_delta = new_cost_delta;
        Ok(())
    }

    fn order_key(&self) -> (Cost, Cost, NodeId) {
        (self.cost_delta, self.cost, self.nh_id)
    }
}

impl PartialEq for FibNextHop {
    /// Two entries are equal iff they name the same neighbor. Differing
    /// `cost`/`cost_delta` on an otherwise-equal `nh_id` indicates two
    /// conflicting entries for the same neighbor, which should never occur
    /// within a single destination's set.
    fn eq(&self, other: &Self) -> bool {
        if self.nh_id == other.nh_id {
            debug_assert_eq!(self.cost, other.cost);
            debug_assert_eq!(self.cost_delta, other.cost_delta);
            true
        } else {
            false
        }
    }
}

impl Eq for FibNextHop {}

impl PartialOrd for FibNextHop {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FibNextHop {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.order_key().cmp(&other.order_key())
    }
}

impl std::hash::Hash for FibNextHop {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nh_id.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use petgraph::graph::NodeIndex;

    fn nid(x: u32) -> NodeId {
        NodeIndex::new(x as usize)
    }

    #[test]
    fn rejects_zero_cost() {
        assert!(FibNextHop::new(0, nid(1), 0, NextHopType::Downward).is_err());
    }

    #[test]
    fn rejects_disabled() {
        assert!(FibNextHop::new(5, nid(1), 0, NextHopType::Disabled).is_err());
    }

    #[test]
    fn downward_requires_zero_delta() {
        assert!(FibNextHop::new(5, nid(1), 1, NextHopType::Downward).is_err());
        assert!(FibNextHop::new(5, nid(1), 0, NextHopType::Downward).is_ok());
    }

    #[test]
    fn upward_requires_nonzero_delta() {
        assert!(FibNextHop::new(5, nid(1), 0, NextHopType::Upward).is_err());
        assert!(FibNextHop::new(5, nid(1), 2, NextHopType::Upward).is_ok());
    }

    #[test]
    fn orders_downward_before_upward() {
        let dw = FibNextHop::new(5, nid(1), 0, NextHopType::Downward).unwrap();
        let uw = FibNextHop::new(7, nid(2), 2, NextHopType::Upward).unwrap();
        assert!(dw < uw);
    }

    #[test]
    fn orders_by_cost_delta_then_cost_then_nh_id() {
        let a = FibNextHop::new(10, nid(3), 3, NextHopType::Upward).unwrap();
        let b = FibNextHop::new(9, nid(1), 3, NextHopType::Upward).unwrap();
        let c = FibNextHop::new(9, nid(1), 2, NextHopType::Upward).unwrap();
        assert!(c < b);
        assert!(b < a);
    }

    #[test]
    fn equality_is_by_nh_id() {
        let a = FibNextHop::new(5, nid(1), 0, NextHopType::Downward).unwrap();
        let b = FibNextHop::new(5, nid(1), 0, NextHopType::Downward).unwrap();
        assert_eq!(a, b);
    }
}
