// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The communicator
//!
//! Owns the distributed spike all-gather and the routing of gathered
//! spikes into local per-cell event queues. Construction builds the
//! immutable connection table from the recipe and decomposition:
//!
//! 1. flatten group gids; flat position = dense local cell index
//! 2. query `connections_on` for every local cell in parallel
//! 3. one sequential sweep counting connections per source domain
//! 4. prefix sums give each source-domain bucket its slot range; a
//!    sequential replay places every connection at its bucket's next
//!    free slot (deterministic, no atomics)
//! 5. sort each bucket by `(source, dest)`, buckets in parallel
//!
//! Routing then merge-joins, per source domain, the sorted connection
//! bucket against that domain's sorted spike slice, walking whichever
//! sequence is smaller and binary-searching the other. Worst case
//! `O(min(C log S, S log C))` per domain.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use spikelink_neural::connection::Connection;
use spikelink_neural::partition::{make_index, CellPartition};
use spikelink_neural::search::equal_range_by_key;
use spikelink_neural::types::{Event, Spike, Time};
use spikelink_runtime::{DistributedContext, GatheredSpikes};

use crate::context::ExecutionContext;
use crate::domain::DomainDecomposition;
use crate::error::{CommError, Result};
use crate::recipe::{ConnectionInfo, Recipe};

/// Which sequence the routing merge-join walks on the outside.
///
/// `Adaptive` picks the smaller side per domain for minimal asymptotic
/// cost, but the per-cell append order can differ between the two walks.
/// Runs that must be bit-reproducible across cluster shapes pin one of
/// the fixed policies instead; all three produce the same multiset of
/// events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoutingPolicy {
    #[default]
    Adaptive,
    WalkConnections,
    WalkSpikes,
}

/// Spike-exchange and event-routing hub of one simulation domain.
///
/// Built once per simulation from recipe + decomposition; afterwards the
/// connection table and partitions are immutable and shareable read-only.
/// Per epoch the stepping loop calls [`exchange`](Self::exchange) (a
/// collective: every domain must enter in matching order) and routes the
/// result with [`make_event_queues`](Self::make_event_queues).
pub struct Communicator {
    num_local_cells: usize,
    num_domains: usize,
    connections: Vec<Connection>,
    connection_part: Vec<usize>,
    index_part: CellPartition,
    distributed: Arc<dyn DistributedContext>,
    routing: RoutingPolicy,
    num_spikes: u64,
}

impl Communicator {
    /// Build the communicator's data structures.
    ///
    /// # Panics
    /// Panics on contract violations in the inputs: a connection with a
    /// non-positive delay, a `dest` that is not the queried local cell,
    /// or a `gid_domain` result outside `[0, num_domains)`.
    pub fn new(recipe: &dyn Recipe, dom_dec: &DomainDecomposition, ctx: &ExecutionContext) -> Self {
        let distributed = Arc::clone(&ctx.distributed);
        let task_pool = &ctx.task_pool;

        let num_domains = distributed.size();
        let num_local_cells = dom_dec.num_local_cells();

        // Flat gid list in group declaration order; the position of a gid
        // here is its index_on_domain.
        let mut gids = Vec::with_capacity(num_local_cells);
        for group in dom_dec.groups() {
            gids.extend_from_slice(&group.gids);
        }

        // Per-cell connection lists, queried in parallel (the recipe is
        // Sync; reads over distinct gids are independent).
        let cell_conns: Vec<Vec<ConnectionInfo>> =
            task_pool.parallel_map(gids.len(), |i| recipe.connections_on(gids[i]));

        // Sweep once: validate, record each connection's source domain in
        // iteration order, count per source domain.
        let n_cons: usize = cell_conns.iter().map(Vec::len).sum();
        let mut src_domains = Vec::with_capacity(n_cons);
        let mut src_counts = vec![0usize; num_domains];
        for (cell, conns) in cell_conns.iter().enumerate() {
            for info in conns {
                assert!(
                    info.delay > 0.0,
                    "connection {} -> {} has non-positive delay {}",
                    info.source,
                    info.dest,
                    info.delay
                );
                assert!(
                    info.dest.gid == gids[cell],
                    "connection {} -> {} listed on cell {}: dest must be the queried cell",
                    info.source,
                    info.dest,
                    gids[cell]
                );
                let src = dom_dec.gid_domain(info.source.gid);
                assert!(
                    src < num_domains,
                    "gid_domain({}) = {} outside the {} known domains",
                    info.source.gid,
                    src,
                    num_domains
                );
                src_domains.push(src);
                src_counts[src] += 1;
            }
        }

        // Two-pass placement into the flat table: every bucket's slots are
        // known from the prefix sums, so the replay scatters each
        // connection to its bucket's next free slot.
        let connection_part = make_index(&src_counts);
        let mut connections = vec![Connection::default(); n_cons];
        let mut offsets = connection_part.clone();
        let mut pos = 0usize;
        for (cell, conns) in cell_conns.iter().enumerate() {
            for info in conns {
                let slot = offsets[src_domains[pos]];
                offsets[src_domains[pos]] += 1;
                connections[slot] =
                    Connection::new(info.source, info.dest, info.weight, info.delay, cell as u32);
                pos += 1;
            }
        }

        // Sort every source-domain bucket independently; the slices are
        // disjoint so the sorts can run concurrently.
        let mut buckets = Vec::with_capacity(num_domains);
        let mut rest: &mut [Connection] = &mut connections;
        for dom in 0..num_domains {
            let len = connection_part[dom + 1] - connection_part[dom];
            let (bucket, tail) = std::mem::take(&mut rest).split_at_mut(len);
            buckets.push(bucket);
            rest = tail;
        }
        task_pool.parallel_for_each(buckets, |bucket| {
            bucket.sort_unstable_by_key(|c| c.order_key());
        });

        // Queue ranges per cell group, in group declaration order.
        let index_part = CellPartition::from_sizes(dom_dec.groups().iter().map(|g| g.gids.len()));

        debug!(
            "built connection table: {} connections across {} domains for {} local cells in {} groups",
            n_cons,
            num_domains,
            num_local_cells,
            index_part.num_buckets()
        );

        Self {
            num_local_cells,
            num_domains,
            connections,
            connection_part,
            index_part,
            distributed,
            routing: RoutingPolicy::default(),
            num_spikes: 0,
        }
    }

    /// Exchange this domain's spikes against every other domain's.
    ///
    /// Sorts `local_spikes` by source, then runs the transport's
    /// all-gather; every domain receives the identical global array with
    /// each per-domain slice in that domain's sorted order (the full
    /// array is not globally sorted). Collective failure is fail-stop and
    /// propagated; nothing partial is returned.
    pub fn exchange(&mut self, mut local_spikes: Vec<Spike>) -> Result<GatheredSpikes> {
        local_spikes.sort_unstable_by_key(|s| s.source);

        let global_spikes = self.distributed.gather_spikes(local_spikes)?;
        self.num_spikes += global_spikes.len() as u64;
        trace!(
            "spike exchange: {} global spikes this epoch, {} since reset",
            global_spikes.len(),
            self.num_spikes
        );
        Ok(global_spikes)
    }

    /// Route gathered spikes into per-cell event queues.
    ///
    /// `queues` holds one event list per local cell (indexed by
    /// `index_on_domain`); pre-existing contents are preserved and new
    /// events appended. Per source domain, every spike is paired with
    /// every connection of equal source; each pair appends
    /// `connection.make_event(spike)`, delivered at
    /// `spike.time + delay`. Append order follows the traversal; no
    /// cross-cell temporal order is promised.
    ///
    /// The outer domain loop is serial: connections from different source
    /// domains may target the same local cell, so their queue writes are
    /// not disjoint.
    ///
    /// # Panics
    /// Panics if `queues` does not hold exactly one queue per local cell,
    /// or if the gathered partition does not cover `num_domains` slices.
    pub fn make_event_queues(
        &self,
        global_spikes: &GatheredSpikes,
        queues: &mut [Vec<Event>],
    ) -> Result<()> {
        assert!(
            queues.len() == self.num_local_cells,
            "{} event queues for {} local cells",
            queues.len(),
            self.num_local_cells
        );
        assert!(
            global_spikes.num_domains() == self.num_domains,
            "gathered spikes cover {} domains, expected {}",
            global_spikes.num_domains(),
            self.num_domains
        );

        let cp = &self.connection_part;
        for dom in 0..self.num_domains {
            let cons = &self.connections[cp[dom]..cp[dom + 1]];
            let spks = global_spikes.slice(dom);
            if cons.is_empty() || spks.is_empty() {
                continue;
            }

            // Walk whichever sequence is smaller and equal-range into the
            // other: O(min(C log S, S log C)) for this domain.
            let walk_connections = match self.routing {
                RoutingPolicy::Adaptive => cons.len() < spks.len(),
                RoutingPolicy::WalkConnections => true,
                RoutingPolicy::WalkSpikes => false,
            };

            if walk_connections {
                let mut spks = spks;
                for con in cons {
                    let sources = equal_range_by_key(spks, &con.source(), |s| s.source);
                    let queue = &mut queues[con.index_on_domain() as usize];
                    queue.try_reserve(sources.len()).map_err(|_| {
                        CommError::QueueOverflow {
                            cell: con.index_on_domain() as usize,
                            additional: sources.len(),
                        }
                    })?;
                    for spike in &spks[sources.clone()] {
                        queue.push(con.make_event(spike));
                    }
                    // the next connection may share this source: drop only
                    // the spikes strictly below it
                    spks = &spks[sources.start..];
                    if spks.is_empty() {
                        break;
                    }
                }
            } else {
                let mut cons = cons;
                for spike in spks {
                    let targets = equal_range_by_key(cons, &spike.source, |c| c.source());
                    for con in &cons[targets.clone()] {
                        let queue = &mut queues[con.index_on_domain() as usize];
                        queue.try_reserve(1).map_err(|_| CommError::QueueOverflow {
                            cell: con.index_on_domain() as usize,
                            additional: 1,
                        })?;
                        queue.push(con.make_event(spike));
                    }
                    // a duplicate spike must re-match the same run
                    cons = &cons[targets.start..];
                    if cons.is_empty() {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    /// The minimum delay over every connection in the global network, or
    /// `+∞` when there are no connections anywhere. A collective: the
    /// stepping loop uses it as the safe epoch length, so every domain
    /// must receive the same value.
    pub fn min_delay(&self) -> Result<Time> {
        let local_min = self
            .connections
            .iter()
            .map(|c| c.delay())
            .fold(f64::INFINITY, f64::min);
        Ok(self.distributed.min(local_min)?)
    }

    /// The range of event queues that belong to cells in group `group`.
    pub fn group_queue_range(&self, group: usize) -> Range<usize> {
        self.index_part.range(group)
    }

    pub fn num_local_cells(&self) -> usize {
        self.num_local_cells
    }

    /// Total spikes seen by `exchange` since construction or last `reset`.
    pub fn num_spikes(&self) -> u64 {
        self.num_spikes
    }

    /// The connection table: bucketed by source domain, sorted within
    /// each bucket.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Bucket boundaries of the connection table, one half-open range per
    /// source domain.
    pub fn connection_partition(&self) -> &[usize] {
        &self.connection_part
    }

    pub fn routing_policy(&self) -> RoutingPolicy {
        self.routing
    }

    /// Pin or unpin the merge-join walk order; see [`RoutingPolicy`].
    pub fn set_routing_policy(&mut self, policy: RoutingPolicy) {
        self.routing = policy;
    }

    /// Zero the spike counter. The connection table is untouched.
    pub fn reset(&mut self) {
        self.num_spikes = 0;
    }
}

impl std::fmt::Debug for Communicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Communicator")
            .field("num_local_cells", &self.num_local_cells)
            .field("num_domains", &self.num_domains)
            .field("connections", &self.connections.len())
            .field("routing", &self.routing)
            .field("num_spikes", &self.num_spikes)
            .finish()
    }
}
