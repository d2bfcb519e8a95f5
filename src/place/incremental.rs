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

//! Incremental extension of a committed placement by one new pair.
//!
//! The candidate graph must already contain the new pair (see
//! [`CandidateGraph::append_pair`][crate::candidate::CandidateGraph::append_pair]).
//! The previously committed edge set is replayed, then the
//! augmenting-path solver tries to cover the new pair with the already
//! active middleboxes, rerouting existing assignments if necessary.
//! Only if that fails does the greedy search take over, activating
//! further middleboxes until the remaining pairs are covered.
//!
//! The matching size never decreases: augmentation only adds
//! assignments and the greedy fallback starts from the replayed state.

use super::greedy::GreedySearch;
use super::require_unit_demands;
use crate::augment::Augmenter;
use crate::candidate::{Assignment, CandidateGraph};
use crate::error::Result;
use crate::matching::Matching;
use crate::scenario::{Mbox, Pair};

use log::info;

/// The result of an incremental extension.
#[derive(Clone, Debug)]
pub struct IncrementalOutcome {
    /// The extended matching.
    pub matching: Matching,
    /// Whether the active set of the prior matching sufficed (no new
    /// middlebox was activated).
    pub extended_directly: bool,
    /// Gain in matching size over the prior edge set.
    pub size_delta: usize,
    /// Middleboxes newly activated by the greedy fallback, in
    /// activation order. Empty iff `extended_directly`.
    pub activated: Vec<Mbox>,
    /// The pairs whose assignment differs from the prior edge set,
    /// with their new middlebox. Contains the new pair and every pair
    /// rerouted by an augmentation.
    pub changed: Vec<(Pair, Mbox)>,
}

/// Extend a committed placement by the newly appended pair.
///
/// `prior` is the edge set committed before the pair arrived; it must
/// not assign the new pair. Fails like the greedy search if even
/// activating all middleboxes cannot cover every pair.
pub fn extend_incrementally(
    g: &CandidateGraph,
    prior: &[Assignment],
    new_pair: Pair,
) -> Result<IncrementalOutcome> {
    require_unit_demands(g)?;
    assert!(new_pair.index() < g.num_pairs(), "new pair is not in the graph");
    assert!(
        prior.iter().all(|e| e.pair != new_pair),
        "new pair is already assigned in the prior edge set"
    );

    let mut state = Matching::new(g);
    state.reinitialize_from_edges(g, prior)?;
    let prior_size = state.size();
    let prior_assignment: Vec<Option<Mbox>> = g.pairs().map(|p| state.assignment(p)).collect();

    let mut augmenter = Augmenter::new(g);
    augmenter.solve(g, &mut state);

    let (matching, activated) = if state.size() == g.num_pairs() {
        info!("incremental: extended without new activations");
        (state, vec![])
    } else {
        info!(
            "incremental: direct extension leaves {} pairs uncovered, falling back to greedy",
            g.num_pairs() - state.size()
        );
        let placement = GreedySearch::from_matching(g, state)?.run()?;
        (placement.matching, placement.activation_order)
    };

    let changed = g
        .pairs()
        .filter_map(|p| {
            let now = matching.assignment(p)?;
            if prior_assignment[p.index()] == Some(now) {
                None
            } else {
                Some((p, now))
            }
        })
        .collect();

    let size_delta = matching.size() - prior_size;
    Ok(IncrementalOutcome {
        extended_directly: activated.is_empty(),
        size_delta,
        activated,
        changed,
        matching,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(g: &CandidateGraph, m: usize, p: usize) -> Assignment {
        Assignment {
            mbox: g.mbox(m),
            pair: g.pair(p),
        }
    }

    #[test]
    fn direct_extension_uses_spare_capacity() {
        let g = CandidateGraph::with_edges(&[2, 2], 2, &[(0, 0), (0, 1), (1, 0)]);
        let prior = vec![edge(&g, 0, 0)];

        let outcome = extend_incrementally(&g, &prior, g.pair(1)).unwrap();
        assert!(outcome.extended_directly);
        assert_eq!(outcome.size_delta, 1);
        assert_eq!(outcome.matching.num_active(), 1);
        assert_eq!(outcome.changed, vec![(g.pair(1), g.mbox(0))]);
    }

    #[test]
    fn reports_rerouted_pairs() {
        // m0 is full with p0; covering the new pair p1 requires moving
        // p0 to m1 -- but m1 is not active, so the fallback runs.
        let g = CandidateGraph::with_edges(&[1, 1], 2, &[(0, 0), (0, 1), (1, 0)]);
        let prior = vec![edge(&g, 0, 0)];

        let outcome = extend_incrementally(&g, &prior, g.pair(1)).unwrap();
        assert!(!outcome.extended_directly);
        assert_eq!(outcome.activated, vec![g.mbox(1)]);
        assert_eq!(outcome.matching.size(), 2);

        let mut changed = outcome.changed.clone();
        changed.sort();
        assert_eq!(changed, vec![(g.pair(0), g.mbox(1)), (g.pair(1), g.mbox(0))]);
    }

    #[test]
    fn never_decreases_matching_size() {
        let g = CandidateGraph::with_edges(&[1], 2, &[(0, 0)]);
        let prior = vec![edge(&g, 0, 0)];
        // the new pair has no admissible middlebox at all: greedy
        // cannot help either, but the prior assignment must survive
        let err = extend_incrementally(&g, &prior, g.pair(1)).unwrap_err();
        assert_eq!(
            err,
            crate::error::Error::Infeasible { covered: 1, total: 2 }
        );
    }
}
