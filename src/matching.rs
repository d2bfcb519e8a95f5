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

//! The mutable matching state.
//!
//! A [`Matching`] tracks, for one candidate graph, which middleboxes are
//! active, their residual capacities, and the assignment of pairs to
//! middleboxes. Pairs are stored as a per-pair `Option<Mbox>`, so a pair
//! can never be assigned twice by construction.
//!
//! The state never allocates after construction:
//! [`Matching::reinitialize`] copies another state slot-by-slot, which
//! is what the placement searches use to reuse their two scratch copies
//! round after round.
//!
//! Once a pair is assigned it stays assigned (possibly to a different
//! middlebox after an augmentation), and once a middlebox is activated
//! it stays active; within one search run both transitions are
//! irreversible.

use crate::candidate::{Assignment, CandidateGraph};
use crate::error::{Error, Result};
use crate::num::traits::Float;
use crate::scenario::{Mbox, Pair};

/// A capacity-respecting assignment of pairs to active middleboxes.
#[derive(Clone, Debug)]
pub struct Matching {
    active: Vec<bool>,
    num_active: usize,
    residual: Vec<u32>,
    assigned: Vec<Option<Mbox>>,
    size: usize,
}

impl Matching {
    /// Create the empty matching: no middlebox active, all pairs free.
    pub fn new(g: &CandidateGraph) -> Self {
        Matching {
            active: vec![false; g.num_mboxes()],
            num_active: 0,
            residual: g.mboxes().map(|m| g.capacity(m)).collect(),
            assigned: vec![None; g.num_pairs()],
            size: 0,
        }
    }

    /// Make this state a copy of `other` without reallocating.
    ///
    /// Both states must belong to the same candidate graph.
    pub fn reinitialize(&mut self, other: &Matching) {
        debug_assert_eq!(self.active.len(), other.active.len());
        debug_assert_eq!(self.assigned.len(), other.assigned.len());
        self.active.copy_from_slice(&other.active);
        self.num_active = other.num_active;
        self.residual.copy_from_slice(&other.residual);
        self.assigned.copy_from_slice(&other.assigned);
        self.size = other.size;
    }

    /// Rebuild this state from an explicit edge set.
    ///
    /// The resulting active set and residual capacities are the unique
    /// function of the edge set and the capacity map: a middlebox is
    /// active iff it serves at least one edge. Edges that are not
    /// admissible, assign a pair twice, or overflow a capacity are
    /// rejected.
    pub fn reinitialize_from_edges(&mut self, g: &CandidateGraph, edges: &[Assignment]) -> Result<()> {
        for a in self.active.iter_mut() {
            *a = false;
        }
        self.num_active = 0;
        for (m, r) in self.residual.iter_mut().enumerate() {
            *r = g.capacity(Mbox(m as u32));
        }
        for a in self.assigned.iter_mut() {
            *a = None;
        }
        self.size = 0;

        for &e in edges {
            if !g.is_admissible(e.mbox, e.pair) {
                return Err(Error::UnknownAssignment(e));
            }
            if self.assigned[e.pair.index()].is_some() {
                return Err(Error::DoubleAssignment(e));
            }
            if self.residual[e.mbox.index()] == 0 {
                return Err(Error::AssignmentOverflow(e.mbox));
            }
            if !self.active[e.mbox.index()] {
                self.active[e.mbox.index()] = true;
                self.num_active += 1;
            }
            self.residual[e.mbox.index()] -= 1;
            self.assigned[e.pair.index()] = Some(e.mbox);
            self.size += 1;
        }
        Ok(())
    }

    /// Activate an inactive middlebox.
    ///
    /// # Panics
    ///
    /// Panics if the middlebox is already active.
    pub fn activate(&mut self, mbox: Mbox) {
        assert!(!self.active[mbox.index()], "middlebox is already active");
        self.active[mbox.index()] = true;
        self.num_active += 1;
    }

    /// Whether a middlebox is active.
    pub fn is_active(&self, mbox: Mbox) -> bool {
        self.active[mbox.index()]
    }

    /// Number of active middleboxes.
    pub fn num_active(&self) -> usize {
        self.num_active
    }

    /// Remaining capacity of a middlebox.
    pub fn residual(&self, mbox: Mbox) -> u32 {
        self.residual[mbox.index()]
    }

    /// Whether a pair is still unassigned.
    pub fn is_free(&self, pair: Pair) -> bool {
        self.assigned[pair.index()].is_none()
    }

    /// The middlebox a pair is assigned to, if any.
    pub fn assignment(&self, pair: Pair) -> Option<Mbox> {
        self.assigned[pair.index()]
    }

    /// Number of assigned pairs.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of pairs of the underlying graph.
    pub fn num_pairs(&self) -> usize {
        self.assigned.len()
    }

    /// Export the committed edge set, ordered by pair index.
    pub fn edges(&self) -> Vec<Assignment> {
        self.assigned
            .iter()
            .enumerate()
            .filter_map(|(p, &m)| {
                m.map(|mbox| Assignment {
                    mbox,
                    pair: Pair(p as u32),
                })
            })
            .collect()
    }

    /// Assign a free pair to a middlebox (augmentation endpoint).
    pub(crate) fn assign_free(&mut self, pair: Pair, mbox: Mbox) {
        assert!(self.assigned[pair.index()].is_none(), "pair is already assigned");
        self.assigned[pair.index()] = Some(mbox);
        self.size += 1;
    }

    /// Move an assigned pair to another middlebox (augmentation flip).
    pub(crate) fn reassign(&mut self, pair: Pair, mbox: Mbox) {
        assert!(self.assigned[pair.index()].is_some(), "pair is not assigned");
        self.assigned[pair.index()] = Some(mbox);
    }

    /// Consume one capacity unit of the root middlebox of an
    /// augmenting path.
    pub(crate) fn consume_capacity(&mut self, mbox: Mbox) {
        assert!(self.active[mbox.index()], "middlebox is inactive");
        assert!(self.residual[mbox.index()] > 0, "middlebox has no capacity left");
        self.residual[mbox.index()] -= 1;
    }

    /// Check the matching invariants, reporting the first violation.
    ///
    /// With `all_pairs_assigned` every pair must be assigned; otherwise
    /// only the load constraints are checked: no inactive middlebox
    /// carries load and no active middlebox exceeds its capacity.
    /// Violations are reported as errors, never repaired.
    pub fn check_validity(&self, g: &CandidateGraph, all_pairs_assigned: bool) -> Result<()> {
        let loads = self.mbox_loads(g, 0u64, |_| 1);
        if all_pairs_assigned {
            if let Some(p) = self.assigned.iter().position(|a| a.is_none()) {
                return Err(Error::PairUnassigned(Pair(p as u32)));
            }
        }
        for m in g.mboxes() {
            let load = loads[m.index()];
            if !self.active[m.index()] && load > 0 {
                return Err(Error::InactiveLoad(m));
            }
            if load > u64::from(g.capacity(m)) {
                return Err(Error::CapacityExceeded {
                    mbox: m,
                    load: load as f64,
                    capacity: f64::from(g.capacity(m)),
                });
            }
        }
        Ok(())
    }

    /// Check the matching with real-valued demands.
    ///
    /// Like [`Matching::check_validity`], but the load of a middlebox is
    /// the sum of the demands of its pairs and may exceed the capacity
    /// up to `tolerance * capacity` before it counts as a violation.
    /// The tolerance stems from rounding externally computed fractional
    /// assignments; the historically used value is 2.0.
    pub fn check_validity_weighted<F>(
        &self,
        g: &CandidateGraph,
        demands: &[F],
        tolerance: F,
        all_pairs_assigned: bool,
    ) -> Result<()>
    where
        F: Float,
    {
        assert_eq!(demands.len(), self.assigned.len());
        if all_pairs_assigned {
            if let Some(p) = self.assigned.iter().position(|a| a.is_none()) {
                return Err(Error::PairUnassigned(Pair(p as u32)));
            }
        }
        let loads = self.mbox_loads(g, F::zero(), |p| demands[p.index()]);
        for m in g.mboxes() {
            let load = loads[m.index()];
            if !self.active[m.index()] && load > F::zero() {
                return Err(Error::InactiveLoad(m));
            }
            let capacity = F::from(g.capacity(m)).unwrap();
            if load > tolerance * capacity {
                return Err(Error::CapacityExceeded {
                    mbox: m,
                    load: load.to_f64().unwrap(),
                    capacity: capacity.to_f64().unwrap(),
                });
            }
        }
        Ok(())
    }

    fn mbox_loads<T, D>(&self, g: &CandidateGraph, zero: T, demand: D) -> Vec<T>
    where
        T: Copy + std::ops::Add<Output = T>,
        D: Fn(Pair) -> T,
    {
        let mut loads = vec![zero; g.num_mboxes()];
        for (p, &m) in self.assigned.iter().enumerate() {
            if let Some(mbox) = m {
                loads[mbox.index()] = loads[mbox.index()] + demand(Pair(p as u32));
            }
        }
        loads
    }
}
