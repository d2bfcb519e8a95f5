/*
 * Copyright (c) 2017-2022 Frank Fischer <frank-fischer@shadow-soft.de>
 *
 * This program is free software: you can redistribute it and/or
 * modify it under the terms of the GNU General Public License as
 * published by the Free Software Foundation, either version 3 of the
 * License, or (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful, but
 * WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
 * General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see  <http://www.gnu.org/licenses/>
 */

//! The static bipartite candidate graph.
//!
//! An edge `(mbox, pair)` exists iff routing the pair through the
//! middlebox respects the pair's path-length tolerance:
//!
//! `dist(tail, mbox) + dist(mbox, head) <= (1 + deviation) * dist(tail, head)`
//!
//! The graph is built once per scenario and shared read-only by all
//! matching states; in particular it is `Clone`, so every worker of the
//! parallel search can own a private copy.
//!
//! Adjacency lists are ordered by ascending detour ratio. This is a
//! heuristic only: it influences which maximal matching is found first,
//! but never whether one is found. The order is implementation-defined
//! and not guaranteed stable across scenario constructions.
//!
//! # Example
//!
//! ```
//! use rs_placement::scenario::{CommunicationPair, MboxSite, Scenario};
//! use rs_placement::candidate::CandidateGraph;
//!
//! // Three nodes on a line, unit edge costs.
//! let dist = |u: usize, v: usize| (u as f64 - v as f64).abs();
//!
//! let scenario = Scenario::new(
//!     vec![MboxSite { node: 1, capacity: 2 }],
//!     vec![
//!         CommunicationPair::new(0, 2, 0.0),  // middlebox on the path
//!         CommunicationPair::new(0, 1, 0.0),  // middlebox at the head
//!         CommunicationPair::new(2, 2, 0.5),  // detour not allowed
//!     ],
//! );
//! let g = CandidateGraph::build(&scenario, dist);
//!
//! assert_eq!(g.num_edges(), 2);
//! assert_eq!(g.pairs_at(g.mbox(0)).len(), 2);
//! assert!(g.mboxes_at(g.pair(2)).is_empty());
//! ```

use crate::num::traits::Float;
use crate::scenario::{Mbox, Pair, Scenario};

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// A candidate edge: the admissible assignment of a pair to a middlebox.
///
/// This is a value type; two assignments are equal iff they name the
/// same middlebox and the same pair.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Assignment {
    /// The serving middlebox.
    pub mbox: Mbox,
    /// The served pair.
    pub pair: Pair,
}

/// The static bipartite graph of admissible `(middlebox, pair)`
/// assignments together with the middlebox capacities and pair demands.
#[derive(Clone, Debug)]
pub struct CandidateGraph {
    capacities: Vec<u32>,
    demands: Vec<u32>,
    edges: Vec<Assignment>,
    mbox_adj: Vec<Vec<Pair>>,
    pair_adj: Vec<Vec<Mbox>>,
}

impl CandidateGraph {
    /// Build the candidate graph for a scenario.
    ///
    /// `dist` must be a metric-like all-pairs distance function on the
    /// substrate nodes (typically precomputed shortest-path costs).
    pub fn build<W, D>(scenario: &Scenario<W>, dist: D) -> Self
    where
        W: Float,
        D: Fn(usize, usize) -> W,
    {
        let mut g = CandidateGraph {
            capacities: scenario.sites().iter().map(|s| s.capacity).collect(),
            demands: vec![],
            edges: vec![],
            mbox_adj: vec![vec![]; scenario.sites().len()],
            pair_adj: vec![],
        };
        for p in 0..scenario.pairs().len() {
            g.append_pair(scenario, Pair(p as u32), &dist);
        }
        g
    }

    /// Append the admissible edges of one new pair.
    ///
    /// The pair must have been added to the scenario already and pairs
    /// must be appended in request order. Existing adjacency lists are
    /// extended at the tail, the new pair's own list is ordered by
    /// detour ratio.
    pub fn append_pair<W, D>(&mut self, scenario: &Scenario<W>, pair: Pair, dist: D)
    where
        W: Float,
        D: Fn(usize, usize) -> W,
    {
        assert_eq!(
            pair.index(),
            self.demands.len(),
            "pairs must be appended in request order"
        );
        let cp = &scenario.pairs()[pair.index()];
        let direct = dist(cp.tail, cp.head);
        let allowed = (W::one() + cp.deviation) * direct;

        let mut incident: Vec<(W, Mbox)> = vec![];
        for (m, site) in scenario.sites().iter().enumerate() {
            let via = dist(cp.tail, site.node) + dist(site.node, cp.head);
            if via <= allowed {
                let ratio = if allowed > W::zero() { via / allowed } else { W::zero() };
                incident.push((ratio, Mbox(m as u32)));
            }
        }
        incident.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        self.demands.push(cp.demand);
        self.pair_adj.push(incident.iter().map(|&(_, m)| m).collect());
        for &(_, m) in &incident {
            self.mbox_adj[m.index()].push(pair);
            self.edges.push(Assignment { mbox: m, pair });
        }
    }

    /// Create a candidate graph directly from an explicit edge list.
    ///
    /// All pairs get unit demand. Edges are given as
    /// `(middlebox index, pair index)`; adjacency lists keep the given
    /// order.
    pub fn with_edges(capacities: &[u32], num_pairs: usize, edges: &[(usize, usize)]) -> Self {
        let mut g = CandidateGraph {
            capacities: capacities.to_vec(),
            demands: vec![1; num_pairs],
            edges: Vec::with_capacity(edges.len()),
            mbox_adj: vec![vec![]; capacities.len()],
            pair_adj: vec![vec![]; num_pairs],
        };
        for &(m, p) in edges {
            assert!(m < g.capacities.len(), "middlebox index out of range");
            assert!(p < num_pairs, "pair index out of range");
            let e = Assignment {
                mbox: Mbox(m as u32),
                pair: Pair(p as u32),
            };
            g.mbox_adj[m].push(e.pair);
            g.pair_adj[p].push(e.mbox);
            g.edges.push(e);
        }
        g
    }

    /// Number of middlebox sites.
    pub fn num_mboxes(&self) -> usize {
        self.capacities.len()
    }

    /// Number of communication pairs.
    pub fn num_pairs(&self) -> usize {
        self.demands.len()
    }

    /// Number of admissible assignments.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Return the middlebox with the given index.
    pub fn mbox(&self, index: usize) -> Mbox {
        assert!(index < self.num_mboxes(), "middlebox index out of range");
        Mbox(index as u32)
    }

    /// Return the pair with the given index.
    pub fn pair(&self, index: usize) -> Pair {
        assert!(index < self.num_pairs(), "pair index out of range");
        Pair(index as u32)
    }

    /// Iterator over all middleboxes in index order.
    pub fn mboxes(&self) -> impl Iterator<Item = Mbox> + '_ {
        (0..self.capacities.len()).map(|m| Mbox(m as u32))
    }

    /// Iterator over all pairs in index order.
    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        (0..self.demands.len()).map(|p| Pair(p as u32))
    }

    /// All admissible assignments in construction order.
    pub fn edges(&self) -> &[Assignment] {
        &self.edges
    }

    /// The capacity of a middlebox.
    pub fn capacity(&self, mbox: Mbox) -> u32 {
        self.capacities[mbox.index()]
    }

    /// The demand of a pair.
    pub fn demand(&self, pair: Pair) -> u32 {
        self.demands[pair.index()]
    }

    /// The pairs admissible at a middlebox.
    pub fn pairs_at(&self, mbox: Mbox) -> &[Pair] {
        &self.mbox_adj[mbox.index()]
    }

    /// The middleboxes admissible for a pair.
    pub fn mboxes_at(&self, pair: Pair) -> &[Mbox] {
        &self.pair_adj[pair.index()]
    }

    /// Whether `(mbox, pair)` is an admissible assignment.
    pub fn is_admissible(&self, mbox: Mbox, pair: Pair) -> bool {
        self.pair_adj[pair.index()].contains(&mbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{CommunicationPair, MboxSite};

    // 0 -- 1 -- 2 -- 3 on a line, unit costs
    fn line_dist(u: usize, v: usize) -> f64 {
        (u as f64 - v as f64).abs()
    }

    #[test]
    fn admissibility_rule() {
        let scenario = Scenario::new(
            vec![
                MboxSite { node: 1, capacity: 1 },
                MboxSite { node: 3, capacity: 1 },
            ],
            vec![
                // direct distance 2, via node 1 exactly 2, via node 3 is 4
                CommunicationPair::new(0, 2, 0.0),
                // with 100% deviation the detour via node 3 is admissible
                CommunicationPair::new(0, 2, 1.0),
            ],
        );
        let g = CandidateGraph::build(&scenario, line_dist);

        assert_eq!(g.mboxes_at(g.pair(0)), &[g.mbox(0)]);
        assert_eq!(g.mboxes_at(g.pair(1)).len(), 2);
    }

    #[test]
    fn adjacency_ordered_by_detour_ratio() {
        let scenario = Scenario::new(
            vec![
                MboxSite { node: 3, capacity: 1 },
                MboxSite { node: 1, capacity: 1 },
            ],
            vec![CommunicationPair::new(0, 2, 1.0)],
        );
        let g = CandidateGraph::build(&scenario, line_dist);

        // the on-path middlebox at node 1 comes first despite its
        // higher site index
        assert_eq!(g.mboxes_at(g.pair(0)), &[g.mbox(1), g.mbox(0)]);
    }

    #[test]
    fn append_extends_adjacency_at_the_tail() {
        let mut scenario = Scenario::new(
            vec![MboxSite { node: 1, capacity: 2 }],
            vec![CommunicationPair::new(0, 2, 0.0)],
        );
        let g0 = CandidateGraph::build(&scenario, line_dist);
        let mut g = g0.clone();

        let p = scenario.add_pair(CommunicationPair::new(1, 2, 0.0));
        g.append_pair(&scenario, p, line_dist);

        assert_eq!(g.num_pairs(), 2);
        assert_eq!(g.pairs_at(g.mbox(0)), &[g.pair(0), g.pair(1)]);
        assert_eq!(g.num_edges(), g0.num_edges() + 1);
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn assignment_serde() {
        let e = Assignment {
            mbox: Mbox(3),
            pair: Pair(7),
        };
        let s = serde_json::to_string(&e).unwrap();
        let f: Assignment = serde_json::from_str(&s).unwrap();
        assert_eq!(e, f);
    }
}
