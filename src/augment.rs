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

//! The augmenting-path solver.
//!
//! Extends a [`Matching`] to a maximal matching for its *current*
//! active middlebox set; no middlebox is activated here. Each phase
//! runs one breadth-first alternating search rooted at every active
//! middlebox with spare capacity and augments along the first
//! alternating path reaching a free pair. Exactly one unit is gained
//! per phase; this is not a blocking-flow scheme. The solver stops when a phase
//! exhausts its queue without reaching a free pair; the matching is
//! then maximal for the active set.
//!
//! The predecessor labels, the touched lists and the queue live in the
//! [`Augmenter`] and are reused across phases and across solves. A
//! phase resets only the labels touched by the previous phase, keeping
//! the per-phase reset cost proportional to the searched subgraph
//! rather than to the whole graph.
//!
//! # Example
//!
//! ```
//! use rs_placement::candidate::CandidateGraph;
//! use rs_placement::matching::Matching;
//! use rs_placement::augment::solve_maximal;
//!
//! let g = CandidateGraph::with_edges(&[2], 2, &[(0, 0), (0, 1)]);
//! let mut m = Matching::new(&g);
//! m.activate(g.mbox(0));
//!
//! assert_eq!(solve_maximal(&g, &mut m), 2);
//! assert_eq!(m.size(), 2);
//! ```

use crate::candidate::CandidateGraph;
use crate::matching::Matching;
use crate::scenario::{Mbox, Pair};

use std::collections::VecDeque;

/// Predecessor label of a middlebox in the alternating search.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum MboxLabel {
    Unvisited,
    /// Search root: an active middlebox with spare capacity.
    Root,
    /// Reached backward over the matching edge of this pair.
    FromPair(Pair),
}

/// A node scheduled in the breadth-first alternating search.
#[derive(Clone, Copy, Debug)]
enum Visit {
    Mbox(Mbox),
    Pair(Pair),
}

/// The augmenting-path solver with its reusable scratch state.
pub struct Augmenter {
    mbox_label: Vec<MboxLabel>,
    pair_label: Vec<Option<Mbox>>,
    touched_mboxes: Vec<Mbox>,
    touched_pairs: Vec<Pair>,
    queue: VecDeque<Visit>,
}

impl Augmenter {
    /// Create a solver for a candidate graph.
    ///
    /// The solver is sized for the graph; it can be reused for any
    /// number of solves on states of the same graph.
    pub fn new(g: &CandidateGraph) -> Self {
        Augmenter {
            mbox_label: vec![MboxLabel::Unvisited; g.num_mboxes()],
            pair_label: vec![None; g.num_pairs()],
            touched_mboxes: Vec::with_capacity(g.num_mboxes()),
            touched_pairs: Vec::with_capacity(g.num_pairs()),
            queue: VecDeque::with_capacity(g.num_mboxes() + g.num_pairs()),
        }
    }

    /// Extend `state` to a maximal matching for its active set.
    ///
    /// Returns the number of augmentations performed.
    pub fn solve(&mut self, g: &CandidateGraph, state: &mut Matching) -> usize {
        let mut augmentations = 0;
        while self.augment_once(g, state) {
            augmentations += 1;
        }
        augmentations
    }

    /// Run one phase: find one augmenting path and flip it.
    ///
    /// Returns `false` iff no free pair is reachable, i.e. the matching
    /// is maximal for the active set.
    fn augment_once(&mut self, g: &CandidateGraph, state: &mut Matching) -> bool {
        // reset only what the previous phase touched
        for &m in &self.touched_mboxes {
            self.mbox_label[m.index()] = MboxLabel::Unvisited;
        }
        self.touched_mboxes.clear();
        for &p in &self.touched_pairs {
            self.pair_label[p.index()] = None;
        }
        self.touched_pairs.clear();
        self.queue.clear();

        for m in g.mboxes() {
            if state.is_active(m) && state.residual(m) > 0 {
                self.mbox_label[m.index()] = MboxLabel::Root;
                self.touched_mboxes.push(m);
                self.queue.push_back(Visit::Mbox(m));
            }
        }

        let mut found = None;
        'search: while let Some(visit) = self.queue.pop_front() {
            match visit {
                Visit::Mbox(m) => {
                    // forward over candidate edges not in the matching
                    for &p in g.pairs_at(m) {
                        if self.pair_label[p.index()].is_some() || state.assignment(p) == Some(m) {
                            continue;
                        }
                        self.pair_label[p.index()] = Some(m);
                        self.touched_pairs.push(p);
                        self.queue.push_back(Visit::Pair(p));
                    }
                }
                Visit::Pair(p) => {
                    if state.is_free(p) {
                        found = Some(p);
                        break 'search;
                    }
                    // backward over the unique matching edge
                    let m = state.assignment(p).unwrap();
                    if self.mbox_label[m.index()] == MboxLabel::Unvisited {
                        self.mbox_label[m.index()] = MboxLabel::FromPair(p);
                        self.touched_mboxes.push(m);
                        self.queue.push_back(Visit::Mbox(m));
                    }
                }
            }
        }

        let free_pair = match found {
            Some(p) => p,
            None => return false,
        };

        // Walk the predecessor chain from the free pair to the root,
        // adding the forward edges and dropping the matching edges.
        let mut mbox = self.pair_label[free_pair.index()].expect("free pair has no predecessor");
        state.assign_free(free_pair, mbox);
        loop {
            match self.mbox_label[mbox.index()] {
                MboxLabel::Root => break,
                MboxLabel::FromPair(p) => {
                    debug_assert_eq!(state.assignment(p), Some(mbox));
                    let next = self.pair_label[p.index()].expect("path pair has no predecessor");
                    state.reassign(p, next);
                    mbox = next;
                }
                MboxLabel::Unvisited => unreachable!("path through unvisited middlebox"),
            }
        }
        state.consume_capacity(mbox);
        true
    }
}

/// Extend `state` to a maximal matching for its active middlebox set.
///
/// Convenience wrapper creating a fresh [`Augmenter`]; the searches in
/// [`place`][crate::place] keep a solver instance alive instead to
/// reuse its scratch state.
pub fn solve_maximal(g: &CandidateGraph, state: &mut Matching) -> usize {
    Augmenter::new(g).solve(g, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn augments_through_matched_edges() {
        // m0 serves p0 and p1 and is full; m1 reaches only p0 and p1.
        // Covering p2 requires rerouting a pair from m0 to m1.
        let g = CandidateGraph::with_edges(
            &[2, 1],
            3,
            &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)],
        );
        let mut m = Matching::new(&g);
        m.activate(g.mbox(0));
        assert_eq!(solve_maximal(&g, &mut m), 2);
        assert_eq!(m.size(), 2);

        m.activate(g.mbox(1));
        assert_eq!(solve_maximal(&g, &mut m), 1);
        assert_eq!(m.size(), 3);
        assert!(!m.is_free(g.pair(2)));
        assert_eq!(m.assignment(g.pair(2)), Some(g.mbox(0)));
    }

    #[test]
    fn solver_is_reusable_across_phases_and_states() {
        let g = CandidateGraph::with_edges(&[1, 1], 2, &[(0, 0), (0, 1), (1, 1)]);
        let mut augmenter = Augmenter::new(&g);

        let mut a = Matching::new(&g);
        a.activate(g.mbox(0));
        assert_eq!(augmenter.solve(&g, &mut a), 1);

        let mut b = Matching::new(&g);
        b.activate(g.mbox(0));
        b.activate(g.mbox(1));
        assert_eq!(augmenter.solve(&g, &mut b), 2);
        assert_eq!(b.size(), 2);
    }

    #[test]
    fn maximal_for_active_set_only() {
        // m1 is inactive and must not be used
        let g = CandidateGraph::with_edges(&[1, 5], 2, &[(0, 0), (1, 0), (1, 1)]);
        let mut m = Matching::new(&g);
        m.activate(g.mbox(0));
        assert_eq!(solve_maximal(&g, &mut m), 1);
        assert_eq!(m.size(), 1);
        assert!(m.is_free(g.pair(1)));
        assert!(m.check_validity(&g, false).is_ok());
    }
}
