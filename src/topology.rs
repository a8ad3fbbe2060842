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

//! The weighted undirected graph that routes are computed over.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use petgraph::stable_graph::{EdgeIndex, StableGraph};
use petgraph::Directed;

use crate::error::LfidError;

pub(crate) type IndexType = u32;
/// Identifies a node, and doubles as its index into the [`Topology`] graph.
pub type NodeId = petgraph::graph::NodeIndex<IndexType>;

/// Link/path cost. Additive, positive, integer.
pub type Cost = u32;

/// Sentinel cost meaning "unreachable".
pub const COST_INF: Cost = Cost::MAX;

/// Upper bound on any finite, meaningful cost. Chosen the same way
/// `ospf::MAX_WEIGHT` bounds `LinkWeight` relative to `LinkWeight::MAX`: far
/// enough below the sentinel that additive combinations of in-range costs
/// never wrap into it.
pub const MAX_COST: Cost = COST_INF / 16;

/// A weighted undirected graph. Each undirected link is stored as a pair of
/// opposite directed edges, the same representation `types::IgpNetwork` uses
/// for the IGP graph.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    graph: StableGraph<String, Cost, Directed, IndexType>,
}

impl Topology {
    /// Creates an empty topology.
    pub fn new() -> Self {
        Self {
            graph: StableGraph::default(),
        }
    }

    /// Adds a node with the given name, returning its [`NodeId`].
    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        self.graph.add_node(name.into())
    }

    /// Adds an undirected link of the given `weight` between `a` and `b`,
    /// stored as two opposite directed edges. Returns the indices of both
    /// directed edges, `(a -> b, b -> a)`.
    pub fn add_link(&mut self, a: NodeId, b: NodeId, weight: Cost) -> (EdgeIndex, EdgeIndex) {
        let ab = self.graph.add_edge(a, b, weight);
        let ba = self.graph.add_edge(b, a, weight);
        (ab, ba)
    }

    /// Number of nodes in the topology.
    pub fn num_nodes(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterates over every node id.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.graph.node_indices()
    }

    /// Name of the given node, if present.
    pub fn node_name(&self, node: NodeId) -> Option<&str> {
        self.graph.node_weight(node).map(String::as_str)
    }

    /// Direct neighbors of `node`, reached via an outgoing edge.
    pub fn neighbors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.graph
            .neighbors_directed(node, petgraph::Direction::Outgoing)
    }

    /// Weight of the directed edge `from -> to`, if the edge exists.
    pub fn edge_weight(&self, from: NodeId, to: NodeId) -> Option<Cost> {
        self.graph.find_edge(from, to).and_then(|e| self.graph.edge_weight(e).copied())
    }

    /// Degree (number of direct neighbors) of `node`.
    pub fn degree(&self, node: NodeId) -> usize {
        self.neighbors(node).count()
    }

    /// Runs Dijkstra from `source` over the current edge weights, returning
    /// the cost to every reachable node. Unreachable nodes are absent from
    /// the map (matching `petgraph::algo::dijkstra`'s own contract).
    pub fn shortest_paths(&self, source: NodeId) -> HashMap<NodeId, Cost> {
        petgraph::algo::dijkstra(&self.graph, source, None, |e| *e.weight())
    }

    /// Temporarily removes the directed edge `from -> to`, runs `f`, then
    /// re-adds it with its original weight. Used by
    /// [`crate::route_builder::RouteBuilder`] to compute the shortest path
    /// from a neighbor as if the link back to the source did not exist.
    ///
    /// Removing the edge rather than setting its weight to [`COST_INF`]
    /// avoids summing into overflow along any path that would otherwise
    /// still traverse it.
    pub(crate) fn with_masked_edge<R>(
        &mut self,
        from: NodeId,
        to: NodeId,
        f: impl FnOnce(&Self) -> R,
    ) -> R {
        let edge = self
            .graph
            .find_edge(from, to)
            .expect("masked edge must exist");
        let original = *self.graph.edge_weight(edge).expect("edge has a weight");
        self.graph.remove_edge(edge);
        let result = f(self);
        self.graph.add_edge(from, to, original);
        result
    }

    /// Loads a topology from an edge-list file: one `u v weight` triple per
    /// line (whitespace-separated), `#`-prefixed lines and blank lines
    /// ignored. Node names default to their numeric id.
    pub fn load_edge_list(path: impl AsRef<Path>) -> Result<Self, LfidError> {
        let text = fs::read_to_string(path.as_ref()).map_err(|e| LfidError::TopologyInconsistent {
            node: None,
            dst: None,
            detail: format!("cannot read topology file {}: {e}", path.as_ref().display()),
        })?;

        let mut topo = Self::new();
        let mut by_name: HashMap<String, NodeId> = HashMap::new();

        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 3 {
                return Err(LfidError::TopologyInconsistent {
                    node: None,
                    dst: None,
                    detail: format!("line {}: expected 'u v weight', got {line:?}", lineno + 1),
                });
            }
            let weight: Cost = parts[2].parse().map_err(|_| LfidError::TopologyInconsistent {
                node: None,
                dst: None,
                detail: format!("line {}: invalid weight {:?}", lineno + 1, parts[2]),
            })?;
            let mut node_id = |name: &str| -> NodeId {
                *by_name
                    .entry(name.to_string())
                    .or_insert_with(|| topo.graph.add_node(name.to_string()))
            };
            let a = node_id(parts[0]);
            let b = node_id(parts[1]);
            topo.add_link(a, b, weight);
        }

        Ok(topo)
    }
}
