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

//! Property checks run against a handful of fixture topologies, rather than
//! hand-computed expected outputs. These exercise the invariants that must
//! hold for any valid topology, not just the scenarios in `scenarios.rs`.

use super::topology_from_edges;
use crate::fib_next_hop::NextHopType;
use crate::pruner::LoopAndDeadEndPruner;
use crate::route_builder::RouteBuilder;
use crate::topology::Topology;
use crate::{compute_all_routes, AllNodeFib};

fn fixtures() -> Vec<Topology> {
    vec![
        topology_from_edges(2, &[(0, 1, 5)]).0,
        topology_from_edges(3, &[(0, 1, 1), (1, 2, 1), (0, 2, 100)]).0,
        topology_from_edges(4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]).0,
        topology_from_edges(4, &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1)]).0,
        topology_from_edges(
            5,
            &[(0, 1, 1), (1, 2, 1), (2, 3, 1), (3, 0, 1), (1, 4, 1)],
        )
        .0,
        topology_from_edges(
            6,
            &[
                (0, 1, 3),
                (1, 2, 1),
                (2, 3, 2),
                (3, 4, 1),
                (4, 5, 4),
                (5, 0, 2),
                (0, 2, 5),
                (1, 4, 6),
            ],
        )
        .0,
    ]
}

/// P1: every reachable destination has at least one downward next-hop.
#[test]
fn p1_every_destination_has_a_downward_next_hop() {
    for t in fixtures() {
        let fibs = compute_all_routes(&t).unwrap();
        for (&n, fib) in &fibs {
            for d in fib.destinations() {
                assert_ne!(n, d);
                assert!(
                    fib.num_type_per_dst(d, NextHopType::Downward) >= 1,
                    "node {n:?} has no downward next-hop to {d:?}"
                );
            }
        }
    }
}

/// P2: every next-hop is within range, never points back to its owner, and
/// its cost_delta is zero iff it is downward.
#[test]
fn p2_next_hop_fields_are_well_formed() {
    for t in fixtures() {
        let fibs = compute_all_routes(&t).unwrap();
        for (&n, fib) in &fibs {
            for d in fib.destinations() {
                for nh in fib.nhs(d) {
                    assert_ne!(nh.nh_id(), n);
                    assert!(nh.cost() > 0 && nh.cost() < crate::topology::MAX_COST);
                    assert_eq!(nh.cost_delta() == 0, nh.kind() == NextHopType::Downward);
                }
            }
        }
    }
}

/// P5: re-running both pruning passes on already-pruned output removes
/// nothing further (a fixed point).
#[test]
fn p5_pruning_reaches_a_fixed_point() {
    for t in fixtures() {
        let destinations: Vec<_> = t.node_ids().collect();
        let mut fibs: AllNodeFib = RouteBuilder::new(&t).build(&destinations).unwrap();
        let pruner = LoopAndDeadEndPruner::new();

        pruner.remove_loops(&mut fibs, &destinations).unwrap();
        pruner.remove_dead_ends(&mut fibs, &destinations).unwrap();

        let loop_again = pruner.remove_loops(&mut fibs, &destinations).unwrap();
        let de_again = pruner.remove_dead_ends(&mut fibs, &destinations).unwrap();

        assert_eq!(loop_again.removed, 0);
        assert_eq!(de_again.removed, 0);
    }
}

/// P3: for every destination, the per-destination arc graph is acyclic.
#[test]
fn p3_per_destination_arc_graph_is_acyclic() {
    for t in fixtures() {
        let destinations: Vec<_> = t.node_ids().collect();
        let fibs = compute_all_routes(&t).unwrap();
        for &d in &destinations {
            let mut indeg: std::collections::HashMap<_, usize> = std::collections::HashMap::new();
            let mut adj: std::collections::HashMap<_, Vec<_>> = std::collections::HashMap::new();
            for (&u, fib) in &fibs {
                if u == d {
                    continue;
                }
                indeg.entry(u).or_insert(0);
                for nh in fib.nhs(d) {
                    indeg.entry(nh.nh_id()).or_insert(0);
                    adj.entry(u).or_default().push(nh.nh_id());
                }
            }
            for v in adj.values().flatten() {
                *indeg.entry(*v).or_insert(0) += 1;
            }
            let mut queue: std::collections::VecDeque<_> =
                indeg.iter().filter(|&(_, &c)| c == 0).map(|(&n, _)| n).collect();
            let mut visited = 0;
            while let Some(u) = queue.pop_front() {
                visited += 1;
                if let Some(neighbors) = adj.get(&u) {
                    for &v in neighbors {
                        let e = indeg.get_mut(&v).unwrap();
                        *e -= 1;
                        if *e == 0 {
                            queue.push_back(v);
                        }
                    }
                }
            }
            assert_eq!(
                visited,
                indeg.len(),
                "per-destination arc graph toward {d:?} contains a cycle"
            );
        }
    }
}

/// P4: in the per-destination arc graph, every node with at least one
/// outgoing arc has a path to the destination.
#[test]
fn p4_every_arc_bearing_node_reaches_destination() {
    for t in fixtures() {
        let destinations: Vec<_> = t.node_ids().collect();
        let fibs = compute_all_routes(&t).unwrap();
        for &d in &destinations {
            let mut adj: std::collections::HashMap<_, Vec<_>> = std::collections::HashMap::new();
            for (&u, fib) in &fibs {
                if u == d {
                    continue;
                }
                for nh in fib.nhs(d) {
                    adj.entry(u).or_default().push(nh.nh_id());
                }
            }
            for &u in adj.keys() {
                let mut seen = std::collections::HashSet::from([u]);
                let mut queue = std::collections::VecDeque::from([u]);
                let mut reached = u == d;
                while let Some(x) = queue.pop_front() {
                    if x == d {
                        reached = true;
                        break;
                    }
                    if let Some(neighbors) = adj.get(&x) {
                        for &y in neighbors {
                            if seen.insert(y) {
                                queue.push_back(y);
                            }
                        }
                    }
                }
                assert!(reached, "node {u:?} cannot reach destination {d:?}");
            }
        }
    }
}

/// P6: the upward projection of a FIB is always exactly its upward subset.
#[test]
fn p6_upward_projection_matches_candidate_set() {
    for t in fixtures() {
        let fibs = compute_all_routes(&t).unwrap();
        for (_, fib) in &fibs {
            for d in fib.destinations() {
                let expected: std::collections::BTreeSet<_> = fib
                    .nhs(d)
                    .iter()
                    .filter(|nh| nh.kind() == NextHopType::Upward)
                    .copied()
                    .collect();
                let actual: std::collections::BTreeSet<_> = fib.upward_nhs(d).iter().copied().collect();
                assert_eq!(expected, actual);
            }
        }
    }
}

/// P7: every surviving next-hop's cost is at least the true shortest-path
/// cost from the owning node to the destination.
#[test]
fn p7_cost_never_undercuts_shortest_path() {
    for t in fixtures() {
        let fibs = compute_all_routes(&t).unwrap();
        for (&n, fib) in &fibs {
            let sp = t.shortest_paths(n);
            for d in fib.destinations() {
                let sp_cost = sp[&d];
                for nh in fib.nhs(d) {
                    assert!(nh.cost() >= sp_cost);
                }
            }
        }
    }
}
