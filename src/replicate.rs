/*
 * Copyright (c) 2019-2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! Rounding fractional assignments by middlebox replication.
//!
//! The unit-demand searches do not apply when pairs carry real-valued
//! demands. For that case an external solver (e.g. an LP relaxation)
//! provides a *fractional* assignment of pairs to an active middlebox
//! set. This module turns such a fractional assignment into an
//! integral one: every active middlebox is split into unit-capacity
//! *copies*, opening a new copy whenever the accumulated fractional
//! load spills over the current one, and the augmenting-path solver
//! computes a maximal matching of pairs to copies.
//!
//! A copy serves at most one pair, but since a copy is opened per
//! spill, a middlebox may end up with more copies than its capacity;
//! the rounded assignment is therefore checked with
//! [`Matching::check_validity_weighted`] and its explicit overload
//! tolerance (traditionally 2.0) instead of the strict capacity rule.

use crate::augment::solve_maximal;
use crate::candidate::CandidateGraph;
use crate::matching::Matching;
use crate::num::traits::Float;
use crate::scenario::{Mbox, Pair};

/// The overload factor traditionally accepted for rounded fractional
/// assignments.
///
/// Its exact value is a modelling choice; it is exposed as an explicit
/// constant so that callers can tighten or relax it deliberately.
pub const DEFAULT_OVERLOAD_TOLERANCE: f64 = 2.0;

/// A candidate graph over unit-capacity middlebox copies.
#[derive(Clone, Debug)]
pub struct Replication {
    graph: CandidateGraph,
    sites: Vec<Mbox>,
}

impl Replication {
    /// Split the active middleboxes into unit-capacity copies
    /// according to a fractional assignment.
    ///
    /// `frac(m, p)` is the fraction of pair `p` served by middlebox
    /// `m`; only pairs admissible in `g` are queried. For every active
    /// middlebox its fractionally served pairs are distributed over
    /// copies in order of decreasing demand, opening a new copy
    /// whenever the running load spills over the current one. A pair
    /// whose load is split between two copies becomes admissible for
    /// both.
    pub fn new<F, A>(g: &CandidateGraph, active: &[Mbox], demands: &[F], frac: A) -> Self
    where
        F: Float,
        A: Fn(Mbox, Pair) -> F,
    {
        assert_eq!(demands.len(), g.num_pairs());

        let mut sites = vec![];
        let mut edges: Vec<(usize, usize)> = vec![];
        for &m in active {
            let mut served: Vec<(Pair, F)> = g
                .pairs_at(m)
                .iter()
                .map(|&p| (p, frac(m, p)))
                .filter(|&(_, x)| x > F::zero())
                .collect();
            served.sort_by(|a, b| {
                demands[b.0.index()]
                    .partial_cmp(&demands[a.0.index()])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            let mut copy = sites.len();
            sites.push(m);
            let mut room = F::one();
            for (p, x) in served {
                edges.push((copy, p.index()));
                if x <= room {
                    room = room - x;
                } else {
                    // spill: open a fresh copy that also serves p
                    let spill = x - room;
                    copy = sites.len();
                    sites.push(m);
                    edges.push((copy, p.index()));
                    room = (F::one() - spill).max(F::zero());
                }
            }
        }

        let capacities = vec![1; sites.len()];
        Replication {
            graph: CandidateGraph::with_edges(&capacities, g.num_pairs(), &edges),
            sites,
        }
    }

    /// The candidate graph over the copies.
    pub fn graph(&self) -> &CandidateGraph {
        &self.graph
    }

    /// Number of copies opened.
    pub fn num_copies(&self) -> usize {
        self.sites.len()
    }

    /// The middlebox a copy belongs to.
    pub fn site(&self, copy: Mbox) -> Mbox {
        self.sites[copy.index()]
    }

    /// Compute a maximal matching of pairs to copies.
    ///
    /// All copies are active; the result assigns every pair to at most
    /// one copy.
    pub fn round(&self) -> Matching {
        let mut m = Matching::new(&self.graph);
        for copy in self.graph.mboxes() {
            m.activate(copy);
        }
        solve_maximal(&self.graph, &mut m);
        m
    }

    /// Resolve a copy matching to per-pair middlebox assignments.
    pub fn site_assignment(&self, matching: &Matching) -> Vec<Option<Mbox>> {
        self.graph
            .pairs()
            .map(|p| matching.assignment(p).map(|copy| self.site(copy)))
            .collect()
    }
}
