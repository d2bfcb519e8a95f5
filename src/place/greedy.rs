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

//! The sequential greedy placement search.
//!
//! Rounds are repeated until every pair is covered. In each round every
//! currently inactive middlebox is trial-activated on a scratch copy of
//! the committed matching and extended to a maximal matching; the
//! candidate reaching the largest matching is committed. A round in
//! which no candidate strictly increases the matching size means the
//! scenario lacks capacity and fails with
//! [`Error::Infeasible`][crate::error::Error::Infeasible].
//!
//! The search owns exactly two scratch states. One holds the best
//! trial of the current round, the other is reused for the next trial;
//! which is which is tracked by slot index. Trials therefore never
//! allocate.
//!
//! # Example
//!
//! ```
//! use rs_placement::candidate::CandidateGraph;
//! use rs_placement::place::greedy_search;
//!
//! // two middleboxes of capacity 2, three pairs, everything admissible
//! let g = CandidateGraph::with_edges(
//!     &[2, 2],
//!     3,
//!     &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
//! );
//! let placement = greedy_search(&g).unwrap();
//!
//! assert_eq!(placement.matching.size(), 3);
//! assert_eq!(placement.matching.num_active(), 2);
//! assert_eq!(placement.activation_order.len(), 2);
//! ```

use super::{require_unit_demands, Placement};
use crate::augment::Augmenter;
use crate::candidate::CandidateGraph;
use crate::error::{Error, Result};
use crate::matching::Matching;
use crate::scenario::Mbox;

use log::{debug, info};

/// How to break ties between candidates reaching the same matching
/// size within a round.
///
/// The tie-break is deliberately explicit: the result of a round is
/// otherwise dependent on middlebox enumeration order.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TieBreak {
    /// Keep the first candidate reaching the best size (enumeration
    /// order, i.e. lowest middlebox index). The default.
    First,
    /// Keep the last candidate reaching the best size.
    Last,
}

impl Default for TieBreak {
    fn default() -> Self {
        TieBreak::First
    }
}

/// The sequential greedy placement search.
pub struct GreedySearch<'a> {
    g: &'a CandidateGraph,
    committed: Matching,
    scratch: [Matching; 2],
    best_slot: Option<usize>,
    best_size: usize,
    augmenter: Augmenter,
    tie_break: TieBreak,
}

impl<'a> GreedySearch<'a> {
    /// Create a search starting from the empty matching.
    ///
    /// Fails with [`Error::NonUnitDemand`] if any pair demand is not 1.
    pub fn new(g: &'a CandidateGraph) -> Result<Self> {
        Self::from_matching(g, Matching::new(g))
    }

    /// Create a search resuming from an existing committed matching.
    ///
    /// Used by the incremental extension to cover only the remaining
    /// pairs; the given state's active middleboxes stay active.
    pub fn from_matching(g: &'a CandidateGraph, committed: Matching) -> Result<Self> {
        require_unit_demands(g)?;
        assert_eq!(committed.num_pairs(), g.num_pairs(), "state does not match the graph");
        Ok(GreedySearch {
            g,
            committed,
            scratch: [Matching::new(g), Matching::new(g)],
            best_slot: None,
            best_size: 0,
            augmenter: Augmenter::new(g),
            tie_break: TieBreak::default(),
        })
    }

    /// Set the tie-break rule for equally good candidates.
    pub fn tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    /// The committed matching.
    pub fn committed(&self) -> &Matching {
        &self.committed
    }

    /// Run one round: trial-activate every inactive middlebox and
    /// commit the best candidate.
    ///
    /// Returns the committed middlebox, or [`Error::Infeasible`] if no
    /// candidate strictly improves the matching.
    pub fn round(&mut self) -> Result<Mbox> {
        self.best_slot = None;
        self.best_size = self.committed.size();
        let mut best_mbox = None;

        for m in self.g.mboxes() {
            if self.committed.is_active(m) {
                continue;
            }
            // use whichever scratch slot does not hold the round's best
            let slot = match self.best_slot {
                Some(0) => 1,
                _ => 0,
            };
            self.scratch[slot].reinitialize(&self.committed);
            self.scratch[slot].activate(m);
            self.augmenter.solve(self.g, &mut self.scratch[slot]);

            let size = self.scratch[slot].size();
            debug!("trial {:?}: matching size {}", m, size);
            let improves = match self.tie_break {
                TieBreak::First => size > self.best_size,
                TieBreak::Last => size > self.committed.size() && size >= self.best_size,
            };
            if improves {
                self.best_slot = Some(slot);
                self.best_size = size;
                best_mbox = Some(m);
            }
        }

        match (self.best_slot, best_mbox) {
            (Some(slot), Some(m)) => {
                self.committed.reinitialize(&self.scratch[slot]);
                Ok(m)
            }
            _ => Err(Error::Infeasible {
                covered: self.committed.size(),
                total: self.g.num_pairs(),
            }),
        }
    }

    /// Run rounds until every pair is covered.
    pub fn run(mut self) -> Result<Placement> {
        let total = self.g.num_pairs();
        let mut activation_order = vec![];
        while self.committed.size() < total {
            let m = self.round()?;
            activation_order.push(m);
            info!(
                "greedy: {} active middleboxes cover {} of {} pairs",
                self.committed.num_active(),
                self.committed.size(),
                total
            );
        }
        self.committed.check_validity(self.g, true)?;
        Ok(Placement {
            matching: self.committed,
            activation_order,
        })
    }
}

/// Run the greedy placement search on a candidate graph.
pub fn greedy_search(g: &CandidateGraph) -> Result<Placement> {
    GreedySearch::new(g)?.run()
}
