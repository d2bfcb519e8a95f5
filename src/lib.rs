// Copyright (c) 2015-2022 Frank Fischer <frank-fischer@shadow-soft.de>
//
// This program is free software: you can redistribute it and/or
// modify it under the terms of the GNU General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful, but
// WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU
// General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see  <http://www.gnu.org/licenses/>
//

//! A library for capacity-aware service placement.
//!
//! Given a set of potential middlebox sites with capacities and a set
//! of communication pairs that must each be routed through one active
//! middlebox without stretching their path beyond a tolerance, the
//! algorithms in this crate activate a small set of middleboxes
//! covering all pairs. Activation is greedy: per round, the candidate
//! whose activation allows the largest capacitated bipartite matching
//! (computed by an augmenting-path solver) is committed. The result is
//! a maximal matching per round and a greedy placement, not a provably
//! minimal one.
//!
//! Topology handling is out of scope: the candidate graph is built
//! from a user supplied all-pairs distance function.
//!
//! # Example
//!
//! ```
//! use rs_placement::candidate::CandidateGraph;
//! use rs_placement::place::{greedy_search, parallel_search};
//!
//! let g = CandidateGraph::with_edges(
//!     &[2, 2],
//!     3,
//!     &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
//! );
//!
//! let placement = greedy_search(&g).unwrap();
//! assert_eq!(placement.matching.size(), 3);
//!
//! let matching = parallel_search(&g, 2).unwrap();
//! assert_eq!(matching.size(), placement.matching.size());
//! ```

mod num {
    pub use num_traits as traits;
}

// # Data model

pub mod scenario;
pub use self::scenario::{CommunicationPair, Mbox, MboxSite, Pair, Scenario};

pub mod candidate;
pub use self::candidate::{Assignment, CandidateGraph};

pub mod matching;
pub use self::matching::Matching;

pub mod error;
pub use self::error::{Error, Result};

// # Algorithms

pub mod augment;
pub use self::augment::{solve_maximal, Augmenter};

pub mod place;
pub use self::place::{extend_incrementally, greedy_search, parallel_search, Placement};

pub mod replicate;
pub use self::replicate::Replication;
