// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Property Tests: Connection Table & Routing
//!
//! Structural invariants of the constructed communicator (bucket
//! sortedness, source-domain bucketing, partition arithmetic) and the
//! multiset equivalence of the two merge-join walk orders.

use std::sync::Arc;

use spikelink_engine::{
    gid_domain_from_lists, CellGid, CellMember, ClusterContext, Communicator, CommError,
    DomainDecomposition, Event, ExecutionContext, GatheredSpikes, GroupDescription, Recipe,
    RoutingPolicy, Spike, TableRecipe, TaskPool,
};
use spikelink_runtime::GatheredVector;

const NUM_DOMAINS: usize = 4;
const NUM_GLOBAL_CELLS: u32 = 16;
const LOCAL_DOMAIN: usize = 2;

fn member(gid: u32, index: u32) -> CellMember {
    CellMember::new(gid, index)
}

/// Round-robin ownership: gid g lives on domain g % NUM_DOMAINS.
fn round_robin_lists() -> Vec<Vec<CellGid>> {
    (0..NUM_DOMAINS)
        .map(|d| {
            (0..NUM_GLOBAL_CELLS)
                .filter(|g| *g as usize % NUM_DOMAINS == d)
                .map(CellGid)
                .collect()
        })
        .collect()
}

/// Five connections onto every local cell, sources scattered over the
/// whole gid range so every source-domain bucket is populated.
fn scattered_recipe() -> TableRecipe {
    let mut recipe = TableRecipe::new(NUM_GLOBAL_CELLS as usize);
    for g in 0..NUM_GLOBAL_CELLS {
        for k in 1..=5u32 {
            let src = (g * 7 + k * 3) % NUM_GLOBAL_CELLS;
            recipe.add_connection(member(src, 0), member(g, k - 1), k as f32, 0.1 * k as f64);
        }
    }
    recipe
}

/// Communicator for LOCAL_DOMAIN of the round-robin decomposition, local
/// cells split over two groups. Only construction runs, so the unused
/// cluster members can be dropped without entering any collective.
fn build_local_communicator() -> (Communicator, DomainDecomposition, TableRecipe) {
    let recipe = scattered_recipe();
    let lists = round_robin_lists();
    let own = lists[LOCAL_DOMAIN].clone();
    let (front, back) = own.split_at(own.len() / 2);
    let dec = DomainDecomposition::new(
        vec![
            GroupDescription::new(front.to_vec()),
            GroupDescription::new(back.to_vec()),
        ],
        gid_domain_from_lists(&lists),
    );

    let transport = ClusterContext::group(NUM_DOMAINS)
        .into_iter()
        .nth(LOCAL_DOMAIN)
        .unwrap();
    let ctx = ExecutionContext::new(Arc::new(transport), Arc::new(TaskPool::serial()));
    let comm = Communicator::new(&recipe, &dec, &ctx);
    (comm, dec, recipe)
}

#[test]
fn test_buckets_are_sorted_by_source_then_dest() {
    let (comm, _, _) = build_local_communicator();
    let part = comm.connection_partition();
    assert_eq!(part.len(), NUM_DOMAINS + 1);

    for d in 0..NUM_DOMAINS {
        let bucket = &comm.connections()[part[d]..part[d + 1]];
        assert!(
            bucket.windows(2).all(|w| w[0].order_key() <= w[1].order_key()),
            "bucket {} is not sorted",
            d
        );
    }
}

#[test]
fn test_buckets_hold_exactly_their_source_domain() {
    let (comm, dec, _) = build_local_communicator();
    let part = comm.connection_partition();

    for d in 0..NUM_DOMAINS {
        for con in &comm.connections()[part[d]..part[d + 1]] {
            assert_eq!(
                dec.gid_domain(con.source().gid),
                d,
                "connection {} landed in bucket {}",
                con,
                d
            );
        }
    }
}

#[test]
fn test_connection_count_matches_recipe() {
    let (comm, dec, recipe) = build_local_communicator();

    let expected: usize = dec
        .groups()
        .iter()
        .flat_map(|g| g.gids.iter())
        .map(|&gid| recipe.connections_on(gid).len())
        .sum();
    assert_eq!(comm.connections().len(), expected);
    assert_eq!(*comm.connection_partition().last().unwrap(), expected);
}

#[test]
fn test_group_queue_ranges_partition_local_cells() {
    let (comm, dec, _) = build_local_communicator();

    let mut next = 0;
    for (g, group) in dec.groups().iter().enumerate() {
        let range = comm.group_queue_range(g);
        assert_eq!(range.start, next);
        assert_eq!(range.len(), group.gids.len());
        next = range.end;
    }
    assert_eq!(next, comm.num_local_cells());
}

// ═══════════════════════════════════════════════════════════
// Walk-Order Equivalence
// ═══════════════════════════════════════════════════════════

/// Per-queue event multisets, bit-exact, order-insensitive.
fn normalize(queues: &[Vec<Event>]) -> Vec<Vec<(u32, u32, u64)>> {
    queues
        .iter()
        .map(|q| {
            let mut keys: Vec<_> = q
                .iter()
                .map(|e| (e.target, e.weight.to_bits(), e.time.to_bits()))
                .collect();
            keys.sort_unstable();
            keys
        })
        .collect()
}

/// A two-domain spike soup routed against a dense local table, by hand:
/// `make_event_queues` only needs the gathered shape, not a live
/// transport, so the multi-domain slices are built directly. Slices must
/// be sorted by source, as `exchange` guarantees.
fn dense_routing_inputs() -> (Communicator, GatheredSpikes) {
    let lists = vec![
        vec![CellGid(0), CellGid(1), CellGid(2)],
        vec![CellGid(3), CellGid(4)],
    ];
    let mut recipe = TableRecipe::new(5);
    // every local cell listens to two remote and two local sources
    for g in 0..3u32 {
        for (i, src) in [3, 4, (g + 1) % 3, (g + 2) % 3].into_iter().enumerate() {
            recipe.add_connection(member(src, 0), member(g, i as u32), 0.5, 1.0 + i as f64);
        }
    }
    let dec = DomainDecomposition::new(
        vec![GroupDescription::new(lists[0].clone())],
        gid_domain_from_lists(&lists),
    );
    let transport = ClusterContext::group(2).into_iter().next().unwrap();
    let ctx = ExecutionContext::new(Arc::new(transport), Arc::new(TaskPool::serial()));
    let comm = Communicator::new(&recipe, &dec, &ctx);

    // domain 0 slice and domain 1 slice, each sorted by source, with
    // duplicates and with sources nothing listens to
    let values = vec![
        Spike::new(member(0, 0), 1.0),
        Spike::new(member(1, 0), 1.5),
        Spike::new(member(1, 0), 1.5),
        Spike::new(member(2, 0), 0.25),
        Spike::new(member(3, 0), 2.0),
        Spike::new(member(3, 0), 3.0),
        Spike::new(member(4, 1), 4.0), // index 1: matches no connection
    ];
    let gathered = GatheredVector::new(values, vec![0, 4, 7]);
    (comm, gathered)
}

#[test]
fn test_walk_orders_produce_equal_event_multisets() {
    let (mut comm, gathered) = dense_routing_inputs();

    let mut by_policy = Vec::new();
    for policy in [
        RoutingPolicy::Adaptive,
        RoutingPolicy::WalkConnections,
        RoutingPolicy::WalkSpikes,
    ] {
        comm.set_routing_policy(policy);
        let mut queues = vec![Vec::new(); comm.num_local_cells()];
        comm.make_event_queues(&gathered, &mut queues).unwrap();
        by_policy.push(normalize(&queues));
    }

    assert_eq!(by_policy[0], by_policy[1]);
    assert_eq!(by_policy[1], by_policy[2]);
}

#[test]
fn test_routed_events_obey_the_delay_arithmetic() {
    let (comm, gathered) = dense_routing_inputs();
    let mut queues = vec![Vec::new(); comm.num_local_cells()];
    comm.make_event_queues(&gathered, &mut queues).unwrap();

    // every emitted event must be explainable by one (connection, spike)
    // pair with matching source and exact time arithmetic
    let mut emitted = 0;
    for (cell, queue) in queues.iter().enumerate() {
        for event in queue {
            emitted += 1;
            let explained = comm.connections().iter().any(|con| {
                con.index_on_domain() as usize == cell
                    && con.dest().index == event.target
                    && gathered
                        .values()
                        .iter()
                        .any(|s| s.source == con.source() && s.time + con.delay() == event.time)
            });
            assert!(explained, "event {:?} on cell {} has no witness", event, cell);
        }
    }
    assert!(emitted > 0, "dense inputs must route events");
}

#[test]
fn test_unmatched_sources_and_silent_connections_emit_nothing() {
    let lists = vec![vec![CellGid(0), CellGid(1)]];
    let mut recipe = TableRecipe::new(2);
    recipe.add_connection(member(1, 0), member(0, 0), 1.0, 1.0);
    let dec = DomainDecomposition::new(
        vec![GroupDescription::new(lists[0].clone())],
        gid_domain_from_lists(&lists),
    );
    let mut comm = Communicator::new(&recipe, &dec, &ExecutionContext::local());

    // cell 0 fires, but nothing listens to cell 0
    let global = comm.exchange(vec![Spike::new(member(0, 0), 1.0)]).unwrap();
    let mut queues = vec![Vec::new(); 2];
    comm.make_event_queues(&global, &mut queues).unwrap();
    assert!(queues.iter().all(Vec::is_empty));
}

#[test]
fn test_routing_policy_defaults_to_adaptive() {
    let (comm, _) = dense_routing_inputs();
    assert_eq!(comm.routing_policy(), RoutingPolicy::Adaptive);
}

#[test]
fn test_queue_overflow_error_is_distinct() {
    // the error type distinguishes growth failure from contract panics;
    // the variant is matchable without string inspection
    let err = CommError::QueueOverflow {
        cell: 3,
        additional: 128,
    };
    assert!(matches!(
        err,
        CommError::QueueOverflow { cell: 3, .. }
    ));
    assert!(err.to_string().contains("cell 3"));
}

#[test]
fn test_recipe_trait_objects_are_shareable() {
    // construction takes &dyn Recipe: confirm a boxed recipe works and
    // concurrent reads over distinct gids are allowed by the bounds
    let recipe: Box<dyn Recipe> = Box::new(scattered_recipe());
    let lists = round_robin_lists();
    let dec = DomainDecomposition::new(
        vec![GroupDescription::new(lists[0].clone())],
        gid_domain_from_lists(&lists),
    );
    let transport = ClusterContext::group(NUM_DOMAINS).into_iter().next().unwrap();
    let ctx = ExecutionContext::new(Arc::new(transport), Arc::new(TaskPool::serial()));
    let comm = Communicator::new(recipe.as_ref(), &dec, &ctx);
    assert_eq!(comm.num_local_cells(), lists[0].len());
}
