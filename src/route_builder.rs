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

//! Classifies every node's candidate next-hops as downward or upward.

use log::{debug, trace};

use crate::abs_fib::{AbsFib, AllNodeFib};
use crate::error::LfidError;
use crate::fib_next_hop::{FibNextHop, NextHopType};
use crate::topology::{NodeId, Topology, COST_INF};

/// Builds an unpruned [`AllNodeFib`] by, for every source node, running
/// Dijkstra once from the source and once more from each of its direct
/// neighbors with the source-neighbor link masked to infinity.
///
/// See the crate-level documentation for why the masked run is needed: it
/// yields the cost of actually using that neighbor as a next-hop, as
/// opposed to the cost of a path that immediately loops back through the
/// source.
#[derive(Debug)]
pub struct RouteBuilder {
    topology: Topology,
}

impl RouteBuilder {
    /// Creates a builder operating on a private clone of `topology`: the
    /// masking step mutates edge weights for the duration of a single
    /// source's classification and must not be visible to callers holding
    /// their own reference to the original graph.
    pub fn new(topology: &Topology) -> Self {
        Self {
            topology: topology.clone(),
        }
    }

    /// Classifies next-hops toward every destination in `destinations`, for
    /// every node in the topology.
    pub fn build(&mut self, destinations: &[NodeId]) -> Result<AllNodeFib, LfidError> {
        let mut all = AllNodeFib::new();
        for source in self.topology.node_ids().collect::<Vec<_>>() {
            let fib = self.build_one(source, destinations)?;
            fib.check_fib()?;
            all.insert(source, fib);
        }
        Ok(all)
    }

    fn build_one(&mut self, source: NodeId, destinations: &[NodeId]) -> Result<AbsFib, LfidError> {
        let name = self
            .topology
            .node_name(source)
            .unwrap_or_default()
            .to_string();
        let degree = self.topology.degree(source);
        let mut fib = AbsFib::new(source, name, degree, self.topology.num_nodes());

        debug!("classifying next-hops for node {source:?}");

        let sp_from_source = self.topology.shortest_paths(source);
        let neighbors: Vec<NodeId> = self.topology.neighbors(source).collect();

        let mut sp_from_neighbor = Vec::with_capacity(neighbors.len());
        for &nb in &neighbors {
            // Dijkstra from `nb` only ever walks outgoing edges, so the arc
            // that would let it bounce straight back to `source` is
            // `nb -> source`, not `source -> nb`; that's the one to mask.
            let dists = self
                .topology
                .with_masked_edge(nb, source, |t| t.shortest_paths(nb));
            sp_from_neighbor.push((nb, dists));
        }

        for &dst in destinations {
            if dst == source {
                continue;
            }
            let Some(&sp_cost) = sp_from_source.get(&dst) else {
                continue; // dst unreachable from source: no entry at all (S6)
            };

            let mut any_inserted = false;
            for (nb, dists) in &sp_from_neighbor {
                let link_weight = self
                    .topology
                    .edge_weight(source, *nb)
                    .expect("neighbor edge must exist");
                let Some(&nb_cost) = dists.get(&dst) else {
                    continue; // neighbor cannot reach dst without looping through source
                };
                let total_cost = nb_cost.saturating_add(link_weight);
                if total_cost >= COST_INF {
                    continue;
                }
                if total_cost < sp_cost {
                    return Err(LfidError::TopologyInconsistent {
                        node: Some(source),
                        dst: Some(dst),
                        detail: format!(
                            "neighbor {nb:?} total cost {total_cost} below shortest path {sp_cost}"
                        ),
                    });
                }

                let cost_delta = total_cost - sp_cost;
                // Downward iff this candidate actually realizes the shortest
                // path (cost_delta == 0); comparing nb_cost against sp_cost
                // directly mis-tags a destination that is also a direct,
                // sub-optimal neighbor (e.g. scenario S2).
                let kind = if cost_delta == 0 {
                    NextHopType::Downward
                } else {
                    NextHopType::Upward
                };
                trace!(
                    "node {source:?} -> dst {dst:?}: via {nb:?} cost={total_cost} delta={cost_delta} kind={kind:?}"
                );
                let nh = FibNextHop::new(total_cost, *nb, cost_delta, kind)?;
                fib.insert(dst, nh)?;
                any_inserted = true;
            }

            if !any_inserted {
                return Err(LfidError::TopologyInconsistent {
                    node: Some(source),
                    dst: Some(dst),
                    detail: "destination is reachable but no neighbor survived classification"
                        .into(),
                });
            }
        }

        Ok(fib)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;

    /// Two nodes, one link: each routes to the other via the single link.
    fn line_topology() -> (Topology, NodeId, NodeId) {
        let mut t = Topology::new();
        let a = t.add_node("a");
        let b = t.add_node("b");
        t.add_link(a, b, 5);
        (t, a, b)
    }

    #[test]
    fn line_has_single_downward_hop() {
        let (t, a, b) = line_topology();
        let mut rb = RouteBuilder::new(&t);
        let fib = rb.build(&[a, b]).unwrap();
        let a_fib = &fib[&a];
        assert_eq!(a_fib.nhs(b).len(), 1);
        let nh = a_fib.nh_at_pos(b, 0).unwrap();
        assert_eq!(nh.nh_id(), b);
        assert_eq!(nh.cost(), 5);
        assert_eq!(nh.kind(), NextHopType::Downward);
    }

    #[test]
    fn triangle_classifies_expensive_direct_edge_as_upward() {
        // a-b weight 1, b-c weight 1, a-c weight 10: from a, the shortest
        // path to c costs 2, via b (downward). The direct edge a-c is a
        // legitimate next-hop candidate too, but at cost 10 it does not
        // realize the shortest path, so it must be upward, not downward.
        let mut t = Topology::new();
        let a = t.add_node("a");
        let b = t.add_node("b");
        let c = t.add_node("c");
        t.add_link(a, b, 1);
        t.add_link(b, c, 1);
        t.add_link(a, c, 10);

        let mut rb = RouteBuilder::new(&t);
        let fib = rb.build(&[a, b, c]).unwrap();

        let a_fib = &fib[&a];
        let nhs = a_fib.nhs(c);
        let via_b = nhs.iter().find(|nh| nh.nh_id() == b).unwrap();
        assert_eq!(via_b.kind(), NextHopType::Downward);
        assert_eq!(via_b.cost(), 2);

        let via_c = nhs.iter().find(|nh| nh.nh_id() == c).unwrap();
        assert_eq!(via_c.kind(), NextHopType::Upward);
        assert_eq!(via_c.cost(), 10);
        assert_eq!(via_c.cost_delta(), 8);
    }

    #[test]
    fn disconnected_destination_is_absent() {
        let mut t = Topology::new();
        let a = t.add_node("a");
        let b = t.add_node("b");
        let _c = t.add_node("c"); // isolated, unreachable from a and b
        t.add_link(a, b, 1);

        let mut rb = RouteBuilder::new(&t);
        let fib = rb.build(&[a, b, _c]).unwrap();
        assert!(!fib[&a].contains(_c));
    }
}
