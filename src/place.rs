/*
 * Copyright (c) 2018-2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! Middlebox placement searches.
//!
//! All searches activate middleboxes greedily: each round every
//! inactive middlebox is trial-activated on a scratch copy of the
//! committed matching, the augmenting-path solver measures the
//! attainable matching size, and the best candidate is committed. The
//! variants differ in how the trials are executed:
//!
//! - [`greedy`]: sequential trials, two reusable scratch states.
//! - [`parallel`]: trials distributed over a worker pool with strict
//!   round-based synchronization.
//! - [`incremental`]: extends a previously committed matching by one
//!   new pair, activating middleboxes only if direct augmentation
//!   fails.
//!
//! The searches require unit pair demands; real-valued demands are
//! handled by rounding a fractional assignment, see
//! [`replicate`][crate::replicate].

pub mod greedy;
pub mod incremental;
pub mod parallel;

pub use self::greedy::{greedy_search, GreedySearch, TieBreak};
pub use self::incremental::{extend_incrementally, IncrementalOutcome};
pub use self::parallel::parallel_search;

use crate::candidate::CandidateGraph;
use crate::error::{Error, Result};
use crate::matching::Matching;
use crate::scenario::Mbox;

/// The result of a placement search.
#[derive(Clone, Debug)]
pub struct Placement {
    /// The final committed matching.
    pub matching: Matching,
    /// The middlebox committed in each round, in activation order.
    pub activation_order: Vec<Mbox>,
}

/// Reject pair demands other than 1.
pub(crate) fn require_unit_demands(g: &CandidateGraph) -> Result<()> {
    for p in g.pairs() {
        if g.demand(p) != 1 {
            return Err(Error::NonUnitDemand {
                pair: p,
                demand: g.demand(p),
            });
        }
    }
    Ok(())
}
