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

//! The parallel greedy placement search.
//!
//! One master distributes the trial activations of each round over a
//! fixed pool of worker threads. The state is shared-nothing: every
//! worker owns a private clone of the candidate graph and two scratch
//! matchings, and receives a full snapshot of the committed edge set at
//! the start of every round over its private input channel. Candidates
//! are pulled from one shared task channel until the worker receives an
//! end-of-round marker; the worker then reports the best edge set it
//! found (or that it found no improvement) on its private result
//! channel and blocks for the next snapshot.
//!
//! The rounds are strictly barrier-synchronized: the master waits for
//! exactly one reply per worker before committing the global best and
//! starting the next round, so all workers always judge candidates
//! against identical snapshots and the reported matching sizes are
//! directly comparable. Consequently the committed matching size per
//! round equals that of the sequential search for any worker count.
//! Ties between equally good workers go to the lowest worker index.
//!
//! There are no timeouts: a worker that never replies stalls the master
//! forever. This is a known limitation of the protocol. A worker whose
//! channel closes, on the other hand, is reported as
//! [`Error::WorkerDisconnected`].

use super::require_unit_demands;
use crate::augment::Augmenter;
use crate::candidate::{Assignment, CandidateGraph};
use crate::error::{Error, Result};
use crate::matching::Matching;
use crate::scenario::Mbox;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, info};
use std::thread;

/// Message from the master to one worker.
enum RoundInput {
    /// Full snapshot of the committed edge set; starts a round.
    Snapshot(Vec<Assignment>),
    /// Shut the worker down.
    Terminate,
}

/// Message on the shared task channel.
enum Task {
    /// Trial-activate this middlebox.
    Try(Mbox),
    /// End-of-round marker; one per worker and round.
    EndOfRound,
}

/// Round result of one worker.
enum RoundReply {
    /// Best edge set found by this worker in the round.
    Improved(Vec<Assignment>),
    /// None of the worker's candidates improved the matching.
    NoImprovement,
}

/// A worker: the trial-activation loop of the sequential search, run
/// against per-round snapshots instead of an owned committed state.
struct Worker {
    g: CandidateGraph,
    base: Matching,
    scratch: [Matching; 2],
    best_slot: Option<usize>,
    best_size: usize,
    augmenter: Augmenter,
}

impl Worker {
    fn new(g: CandidateGraph) -> Self {
        let base = Matching::new(&g);
        let scratch = [Matching::new(&g), Matching::new(&g)];
        let augmenter = Augmenter::new(&g);
        Worker {
            g,
            base,
            scratch,
            best_slot: None,
            best_size: 0,
            augmenter,
        }
    }

    fn load_snapshot(&mut self, edges: &[Assignment]) {
        self.base
            .reinitialize_from_edges(&self.g, edges)
            .expect("snapshot violates matching invariants");
        self.best_slot = None;
        self.best_size = self.base.size();
    }

    fn try_candidate(&mut self, m: Mbox) {
        let slot = match self.best_slot {
            Some(0) => 1,
            _ => 0,
        };
        self.scratch[slot].reinitialize(&self.base);
        self.scratch[slot].activate(m);
        self.augmenter.solve(&self.g, &mut self.scratch[slot]);

        let size = self.scratch[slot].size();
        debug!("worker trial {:?}: matching size {}", m, size);
        if size > self.best_size {
            self.best_slot = Some(slot);
            self.best_size = size;
        }
    }

    fn reply(&self) -> RoundReply {
        match self.best_slot {
            Some(slot) => RoundReply::Improved(self.scratch[slot].edges()),
            None => RoundReply::NoImprovement,
        }
    }

    fn run(mut self, input: Receiver<RoundInput>, tasks: Receiver<Task>, replies: Sender<RoundReply>) {
        loop {
            match input.recv() {
                Ok(RoundInput::Snapshot(edges)) => self.load_snapshot(&edges),
                Ok(RoundInput::Terminate) | Err(_) => return,
            }
            loop {
                match tasks.recv() {
                    Ok(Task::Try(m)) => self.try_candidate(m),
                    Ok(Task::EndOfRound) => break,
                    Err(_) => return,
                }
            }
            if replies.send(self.reply()).is_err() {
                return;
            }
        }
    }
}

fn run_rounds(
    g: &CandidateGraph,
    committed: &mut Matching,
    tasks: &Sender<Task>,
    inputs: &[Sender<RoundInput>],
    replies: &[Receiver<RoundReply>],
) -> Result<()> {
    let total = g.num_pairs();
    while committed.size() < total {
        for m in g.mboxes() {
            if !committed.is_active(m) {
                tasks.send(Task::Try(m)).map_err(|_| Error::TaskChannelClosed)?;
            }
        }
        for _ in inputs {
            tasks.send(Task::EndOfRound).map_err(|_| Error::TaskChannelClosed)?;
        }
        let snapshot = committed.edges();
        for (i, tx) in inputs.iter().enumerate() {
            tx.send(RoundInput::Snapshot(snapshot.clone()))
                .map_err(|_| Error::WorkerDisconnected(i))?;
        }

        // barrier: exactly one reply per worker
        let mut best: Option<Vec<Assignment>> = None;
        for (i, rx) in replies.iter().enumerate() {
            match rx.recv().map_err(|_| Error::WorkerDisconnected(i))? {
                RoundReply::Improved(edges) => {
                    if best.as_ref().map_or(true, |b| edges.len() > b.len()) {
                        best = Some(edges);
                    }
                }
                RoundReply::NoImprovement => {}
            }
        }

        match best {
            Some(edges) => {
                committed.reinitialize_from_edges(g, &edges)?;
                info!(
                    "parallel[{}]: {} active middleboxes cover {} of {} pairs",
                    inputs.len(),
                    committed.num_active(),
                    committed.size(),
                    total
                );
            }
            None => {
                return Err(Error::Infeasible {
                    covered: committed.size(),
                    total,
                });
            }
        }
    }
    Ok(())
}

/// Run the greedy placement search on a pool of `num_workers` worker
/// threads.
///
/// Produces a matching of the same size as
/// [`greedy_search`][super::greedy_search] for any worker count >= 1
/// (the set of activated middleboxes may differ on ties).
///
/// # Panics
///
/// Panics if `num_workers` is 0.
pub fn parallel_search(g: &CandidateGraph, num_workers: usize) -> Result<Matching> {
    assert!(num_workers >= 1, "at least one worker is required");
    require_unit_demands(g)?;

    let (task_tx, task_rx) = unbounded();
    let mut inputs = Vec::with_capacity(num_workers);
    let mut replies = Vec::with_capacity(num_workers);
    let mut handles = Vec::with_capacity(num_workers);
    for id in 0..num_workers {
        let (input_tx, input_rx) = unbounded();
        let (reply_tx, reply_rx) = unbounded();
        let worker = Worker::new(g.clone());
        let tasks = task_rx.clone();
        let handle = thread::Builder::new()
            .name(format!("placement-worker-{}", id))
            .spawn(move || worker.run(input_rx, tasks, reply_tx))
            .expect("cannot spawn worker thread");
        inputs.push(input_tx);
        replies.push(reply_rx);
        handles.push(handle);
    }
    drop(task_rx);

    let mut committed = Matching::new(g);
    let result = run_rounds(g, &mut committed, &task_tx, &inputs, &replies);

    for tx in &inputs {
        let _ = tx.send(RoundInput::Terminate);
    }
    for handle in handles {
        let _ = handle.join();
    }

    result?;
    committed.check_validity(g, true)?;
    Ok(committed)
}
