/*
 * Copyright (c) 2020-2022 Frank Fischer <frank-fischer@shadow-soft.de>
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

use rs_placement::candidate::{Assignment, CandidateGraph};
use rs_placement::place::{extend_incrementally, greedy_search};
use rs_placement::scenario::{CommunicationPair, MboxSite, Scenario};

fn line_dist(u: usize, v: usize) -> f64 {
    (u as f64 - v as f64).abs()
}

#[test]
fn full_middlebox_forces_one_activation() {
    // m0 (capacity 2) serves p0 and p1 and is full; the new pair p2 is
    // admissible only to m0, so the fallback must activate m1 and
    // reroute one old pair to it.
    let g = CandidateGraph::with_edges(
        &[2, 2],
        3,
        &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)],
    );
    let prior = vec![
        Assignment { mbox: g.mbox(0), pair: g.pair(0) },
        Assignment { mbox: g.mbox(0), pair: g.pair(1) },
    ];

    let outcome = extend_incrementally(&g, &prior, g.pair(2)).unwrap();
    assert!(!outcome.extended_directly);
    assert_eq!(outcome.activated, vec![g.mbox(1)]);
    assert_eq!(outcome.size_delta, 1);
    assert_eq!(outcome.matching.size(), 3);
    assert_eq!(outcome.matching.assignment(g.pair(2)), Some(g.mbox(0)));
    assert!(outcome.matching.check_validity(&g, true).is_ok());
}

#[test]
fn appended_pair_extends_scenario_and_graph() {
    let mut scenario = Scenario::new(
        vec![
            MboxSite { node: 1, capacity: 2 },
            MboxSite { node: 3, capacity: 2 },
        ],
        vec![
            CommunicationPair::new(0, 2, 1.0),
            CommunicationPair::new(2, 4, 1.0),
        ],
    );
    let mut g = CandidateGraph::build(&scenario, line_dist);
    let placement = greedy_search(&g).unwrap();
    let prior = placement.matching.edges();

    let new_pair = scenario.add_pair(CommunicationPair::new(0, 4, 1.0));
    g.append_pair(&scenario, new_pair, line_dist);

    let outcome = extend_incrementally(&g, &prior, new_pair).unwrap();
    assert_eq!(outcome.matching.size(), 3);
    assert!(outcome.matching.size() >= prior.len());
    assert!(outcome.changed.iter().any(|&(p, _)| p == new_pair));
    assert!(outcome.matching.check_validity(&g, true).is_ok());
}

#[test]
fn direct_extension_and_capacity_limits() {
    let g = CandidateGraph::with_edges(
        &[1, 1],
        3,
        &[(0, 0), (0, 2), (1, 0), (1, 1)],
    );
    let prior = vec![
        Assignment { mbox: g.mbox(0), pair: g.pair(0) },
        Assignment { mbox: g.mbox(1), pair: g.pair(1) },
    ];
    // m0 and m1 are both full; p2 only fits on m0 -- infeasible even
    // with rerouting, since total capacity is 2
    assert!(extend_incrementally(&g, &prior, g.pair(2)).is_err());

    // with one more unit on m0 the spare capacity covers the new pair
    // without touching the other assignments
    let g = CandidateGraph::with_edges(
        &[2, 1],
        3,
        &[(0, 0), (0, 2), (1, 0), (1, 1)],
    );
    let prior = vec![
        Assignment { mbox: g.mbox(0), pair: g.pair(0) },
        Assignment { mbox: g.mbox(1), pair: g.pair(1) },
    ];
    let outcome = extend_incrementally(&g, &prior, g.pair(2)).unwrap();
    assert!(outcome.extended_directly);
    assert!(outcome.activated.is_empty());
    assert_eq!(outcome.changed, vec![(g.pair(2), g.mbox(0))]);
}

#[test]
fn changed_pairs_are_exactly_the_diff() {
    let g = CandidateGraph::with_edges(
        &[2, 2],
        3,
        &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1)],
    );
    let prior = vec![
        Assignment { mbox: g.mbox(0), pair: g.pair(0) },
        Assignment { mbox: g.mbox(0), pair: g.pair(1) },
    ];
    let outcome = extend_incrementally(&g, &prior, g.pair(2)).unwrap();

    let prior_of = |p| {
        prior
            .iter()
            .find(|e| e.pair == p)
            .map(|e| e.mbox)
    };
    for p in g.pairs() {
        let now = outcome.matching.assignment(p);
        let in_diff = outcome.changed.iter().any(|&(q, _)| q == p);
        assert_eq!(in_diff, now.is_some() && now != prior_of(p), "pair {:?}", p);
    }
}
