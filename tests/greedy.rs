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

use rs_placement::candidate::CandidateGraph;
use rs_placement::matching::Matching;
use rs_placement::place::{greedy_search, GreedySearch};
use rs_placement::scenario::{CommunicationPair, MboxSite, Scenario};
use rs_placement::Error;

/// (capacities, number of pairs, edges, expected size, expected active)
const SCENARIOS: &[(&[u32], usize, &[(usize, usize)], usize, usize)] = &[
    // every pair admissible everywhere
    (
        &[2, 2],
        3,
        &[(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)],
        3,
        2,
    ),
    // one big middlebox suffices
    (&[3, 1], 3, &[(0, 0), (0, 1), (0, 2), (1, 0)], 3, 1),
    // disjoint unit middleboxes
    (&[1, 1, 1], 3, &[(0, 0), (1, 1), (2, 2)], 3, 3),
    // overlap forces rerouting through the matched edges
    (
        &[2, 1, 1],
        3,
        &[(0, 0), (0, 1), (1, 1), (1, 2), (2, 2)],
        3,
        2,
    ),
];

#[test]
fn covers_all_pairs_with_expected_activations() {
    for &(caps, pairs, edges, size, active) in SCENARIOS {
        let g = CandidateGraph::with_edges(caps, pairs, edges);
        let placement = greedy_search(&g).unwrap();
        assert_eq!(placement.matching.size(), size, "scenario {:?}", edges);
        assert_eq!(placement.matching.num_active(), active, "scenario {:?}", edges);
        assert_eq!(placement.activation_order.len(), active);
        assert!(placement.matching.check_validity(&g, true).is_ok());
    }
}

#[test]
fn two_middleboxes_cover_three_shared_pairs() {
    // two capacity-2 middleboxes on a line, three identical requests
    // admissible to both of them
    let sites = vec![
        MboxSite { node: 1, capacity: 2 },
        MboxSite { node: 3, capacity: 2 },
    ];
    let pairs = vec![
        CommunicationPair::new(0, 4, 1.0),
        CommunicationPair::new(0, 4, 1.0),
        CommunicationPair::new(0, 4, 1.0),
    ];
    let scenario = Scenario::new(sites, pairs);
    let g = CandidateGraph::build(&scenario, |u: usize, v: usize| (u as f64 - v as f64).abs());
    assert_eq!(g.num_edges(), 6);

    let placement = greedy_search(&g).unwrap();
    assert_eq!(placement.matching.size(), 3);
    assert_eq!(placement.matching.num_active(), 2);
    for m in g.mboxes() {
        let load = g.capacity(m) - placement.matching.residual(m);
        assert!(load <= 2);
    }
}

#[test]
fn insufficient_capacity_is_infeasible() {
    // one unit middlebox, two admissible pairs
    let g = CandidateGraph::with_edges(&[1], 2, &[(0, 0), (0, 1)]);
    assert_eq!(
        greedy_search(&g).unwrap_err(),
        Error::Infeasible { covered: 1, total: 2 }
    );
}

#[test]
fn matching_size_grows_strictly_per_round() {
    let (caps, pairs, edges, _, _) = SCENARIOS[3];
    let g = CandidateGraph::with_edges(caps, pairs, edges);

    let mut search = GreedySearch::new(&g).unwrap();
    let mut sizes = vec![search.committed().size()];
    while search.committed().size() < g.num_pairs() {
        search.round().unwrap();
        sizes.push(search.committed().size());
    }
    assert!(sizes.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn committed_edges_rebuild_identically() {
    for &(caps, pairs, edges, _, _) in SCENARIOS {
        let g = CandidateGraph::with_edges(caps, pairs, edges);
        let placement = greedy_search(&g).unwrap();
        let committed = placement.matching.edges();

        let mut rebuilt = Matching::new(&g);
        rebuilt.reinitialize_from_edges(&g, &committed).unwrap();
        assert_eq!(rebuilt.edges(), committed);
        assert_eq!(rebuilt.num_active(), placement.matching.num_active());
        for m in g.mboxes() {
            assert_eq!(rebuilt.residual(m), placement.matching.residual(m));
        }
    }
}
