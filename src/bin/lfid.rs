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

//! Command-line front-end: loads a topology, computes its forwarding
//! tables, and prints them.

use clap::Parser;
use itertools::Itertools;

use lfid_routing::{compute_all_routes, fib_next_hop::NextHopType, topology::Topology};

/// Computes loop-free inport-dependent forwarding tables for a topology.
#[derive(Debug, Parser)]
struct Cli {
    /// Edge-list file: one `u v weight` triple per line.
    topology: String,
    /// Print every next-hop of every node instead of just the summary.
    #[clap(long, short)]
    verbose: bool,
    /// Only print the table for this node (by name).
    #[clap(long)]
    node: Option<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_timed();

    let args = Cli::parse();
    let topology = Topology::load_edge_list(&args.topology)?;
    let fibs = compute_all_routes(&topology)?;

    let nodes = topology.node_ids().sorted_by_key(|n| n.index());

    let mut total_downward = 0usize;
    let mut total_upward = 0usize;

    for node in nodes {
        let name = topology.node_name(node).unwrap_or("?");
        if let Some(filter) = &args.node {
            if filter != name {
                continue;
            }
        }
        let Some(fib) = fibs.get(&node) else {
            continue;
        };

        let mut dsts: Vec<_> = fib.destinations().collect();
        dsts.sort_by_key(|&d| d.index());

        println!(
            "node {name} (degree {}): {} destinations, {} next-hops ({} upward)",
            fib.degree(),
            dsts.len(),
            fib.total_nexthops(),
            fib.count_uw_nexthops(),
        );
        total_downward += fib.total_nexthops() - fib.count_uw_nexthops();
        total_upward += fib.count_uw_nexthops();

        if !args.verbose {
            continue;
        }
        for dst in dsts {
            let dst_name = topology.node_name(dst).unwrap_or("?");
            for nh in fib.nhs(dst) {
                let marker = match nh.kind() {
                    NextHopType::Downward => "v",
                    NextHopType::Upward => "^",
                    NextHopType::Disabled => "x",
                };
                let via = topology.node_name(nh.nh_id()).unwrap_or("?");
                println!("  -> {dst_name} via {via} [{marker}] cost={}", nh.cost());
            }
        }
    }

    println!("total: {total_downward} downward, {total_upward} upward next-hops");
    Ok(())
}
