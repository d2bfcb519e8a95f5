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

//! Error types.
//!
//! Three classes of failures are distinguished:
//!
//! - precondition violations ([`Error::NonUnitDemand`]) are rejected
//!   before a search starts,
//! - infeasibility ([`Error::Infeasible`]) means the scenario does not
//!   provide enough middlebox capacity to cover all pairs,
//! - state-rebuild and validity faults report a matching that violates
//!   the capacity or uniqueness constraints.
//!
//! Violations of internal invariants are *not* reported through this
//! type; they are programmer errors and panic.

use crate::candidate::Assignment;
use crate::scenario::{Mbox, Pair};

use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by placement searches and state checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A unit-demand algorithm was given a pair with demand != 1.
    #[error("pair {pair:?} has demand {demand}, unit demand is required")]
    NonUnitDemand {
        /// The offending pair.
        pair: Pair,
        /// Its demand.
        demand: u32,
    },

    /// No inactive middlebox improves the matching although pairs
    /// remain uncovered.
    ///
    /// The total middlebox capacity reachable by the uncovered pairs is
    /// insufficient; rerunning cannot help.
    #[error("placement is infeasible: only {covered} of {total} pairs can be covered")]
    Infeasible {
        /// Number of pairs covered by the best matching found.
        covered: usize,
        /// Total number of pairs.
        total: usize,
    },

    /// An edge passed to a state rebuild is not a candidate edge.
    #[error("assignment {0:?} is not admissible")]
    UnknownAssignment(Assignment),

    /// An edge set assigns the same pair twice.
    #[error("pair of assignment {0:?} is already assigned")]
    DoubleAssignment(Assignment),

    /// An edge set exceeds the capacity of a middlebox.
    #[error("edge set exceeds the capacity of middlebox {0:?}")]
    AssignmentOverflow(Mbox),

    /// Validity check: a pair is not assigned to any middlebox.
    #[error("pair {0:?} is not assigned")]
    PairUnassigned(Pair),

    /// Validity check: an inactive middlebox carries load.
    #[error("inactive middlebox {0:?} carries load")]
    InactiveLoad(Mbox),

    /// Validity check: an active middlebox carries more load than its
    /// capacity (or, in the weighted check, more than the tolerated
    /// multiple of its capacity).
    #[error("middlebox {mbox:?} carries load {load}, capacity is {capacity}")]
    CapacityExceeded {
        /// The overloaded middlebox.
        mbox: Mbox,
        /// Its load (weighted loads are reported as f64).
        load: f64,
        /// Its capacity.
        capacity: f64,
    },

    /// A worker disconnected before reporting its round result.
    #[error("worker {0} disconnected during a round")]
    WorkerDisconnected(usize),

    /// The shared task channel was closed, all workers are gone.
    #[error("task channel closed, no workers left")]
    TaskChannelClosed,
}
