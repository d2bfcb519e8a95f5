/*
 * Copyright (c) 2017-2021 Frank Fischer <frank-fischer@shadow-soft.de>
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

//! The placement scenario: middlebox sites and communication pairs.
//!
//! The substrate network itself (nodes, edges, shortest paths) is *not*
//! part of this crate. A scenario refers to substrate nodes by plain
//! indices and all distance information is obtained from a user supplied
//! all-pairs distance function, see
//! [`CandidateGraph::build`][crate::candidate::CandidateGraph::build].

#[cfg(feature = "serialize")]
use serde_derive::{Deserialize, Serialize};

/// Identifier of a middlebox site.
///
/// Middleboxes are numbered consecutively in the order of
/// [`Scenario::sites`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Mbox(pub(crate) u32);

impl Mbox {
    /// Return the index of this middlebox.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Identifier of a communication pair.
///
/// Pairs are numbered consecutively in the order of [`Scenario::pairs`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Pair(pub(crate) u32);

impl Pair {
    /// Return the index of this pair.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A middlebox site: a substrate node that may host a middlebox of a
/// certain capacity.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct MboxSite {
    /// The substrate node hosting the middlebox.
    pub node: usize,
    /// The number of unit-demand pairs the middlebox can serve.
    pub capacity: u32,
}

/// A communication request between two substrate nodes.
///
/// The pair must be routed through exactly one active middlebox. The
/// route via the middlebox may be longer than the direct shortest path
/// by at most the relative `deviation`.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct CommunicationPair<W = f64> {
    /// The substrate node the request starts at.
    pub tail: usize,
    /// The substrate node the request ends at.
    pub head: usize,
    /// The demand in capacity units (1 in the unit-demand algorithms).
    pub demand: u32,
    /// The allowed relative detour, e.g. 0.5 permits routes up to 50%
    /// longer than the direct shortest path.
    pub deviation: W,
}

impl<W> CommunicationPair<W> {
    /// Create a unit-demand pair.
    pub fn new(tail: usize, head: usize, deviation: W) -> Self {
        CommunicationPair {
            tail,
            head,
            demand: 1,
            deviation,
        }
    }
}

/// A placement scenario.
///
/// Holds the middlebox sites and the ordered list of communication
/// pairs. The pair list is append-only: incremental runs add pairs via
/// [`Scenario::add_pair`] but never remove or modify existing ones.
#[derive(Clone, Debug, Default)]
pub struct Scenario<W = f64> {
    sites: Vec<MboxSite>,
    pairs: Vec<CommunicationPair<W>>,
}

impl<W> Scenario<W> {
    /// Create a scenario from sites and an ordered list of pairs.
    pub fn new(sites: Vec<MboxSite>, pairs: Vec<CommunicationPair<W>>) -> Self {
        Scenario { sites, pairs }
    }

    /// The middlebox sites.
    pub fn sites(&self) -> &[MboxSite] {
        &self.sites
    }

    /// The communication pairs in request order.
    pub fn pairs(&self) -> &[CommunicationPair<W>] {
        &self.pairs
    }

    /// Append a new communication pair and return its identifier.
    pub fn add_pair(&mut self, pair: CommunicationPair<W>) -> Pair {
        self.pairs.push(pair);
        Pair((self.pairs.len() - 1) as u32)
    }
}
