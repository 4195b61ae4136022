// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-process cluster transport
//!
//! A group of N domains living in the same process, one per thread,
//! exchanging through a shared rendezvous instead of a network. Used to
//! exercise multi-domain behaviour in tests and dry runs with the exact
//! collective semantics of a real transport: every member blocks until
//! the whole group has entered, then all members receive the identical
//! result assembled in domain order.
//!
//! Fail-stop: dropping a member marks the group defunct, and collectives
//! on the surviving members return `CollectiveFailed` instead of hanging.

use std::sync::Arc;

use parking_lot::{Condvar, Mutex};
use spikelink_neural::partition::make_index;
use spikelink_neural::types::{DomainId, Spike};

use crate::distributed::DistributedContext;
use crate::error::{Result, RuntimeError};
use crate::gathered::{GatheredSpikes, GatheredVector};

struct RendezvousState<T> {
    slots: Vec<Option<T>>,
    filled: usize,
    generation: u64,
    result: Option<Arc<Vec<T>>>,
    defunct: bool,
}

/// Generation-counted all-to-all barrier. Each member deposits one value
/// per round; the member completing the round assembles the result and
/// wakes the rest. Results of round k stay readable until round k+1
/// completes, which cannot happen before every member left round k.
struct Rendezvous<T> {
    state: Mutex<RendezvousState<T>>,
    all_in: Condvar,
}

impl<T> Rendezvous<T> {
    fn new(size: usize) -> Self {
        Self {
            state: Mutex::new(RendezvousState {
                slots: (0..size).map(|_| None).collect(),
                filled: 0,
                generation: 0,
                result: None,
                defunct: false,
            }),
            all_in: Condvar::new(),
        }
    }

    fn exchange(&self, id: DomainId, value: T, collective: &'static str) -> Result<Arc<Vec<T>>> {
        let mut st = self.state.lock();
        if st.defunct {
            return Err(RuntimeError::CollectiveFailed {
                collective,
                domain: id,
                reason: "cluster group is defunct (a member dropped out)".into(),
            });
        }
        assert!(
            st.slots[id].is_none(),
            "domain {} entered collective '{}' twice in one round",
            id,
            collective
        );

        let round = st.generation;
        st.slots[id] = Some(value);
        st.filled += 1;

        if st.filled == st.slots.len() {
            let values: Vec<T> = st.slots.iter_mut().map(|s| s.take().unwrap()).collect();
            st.result = Some(Arc::new(values));
            st.filled = 0;
            st.generation += 1;
            self.all_in.notify_all();
        } else {
            while st.generation == round && !st.defunct {
                self.all_in.wait(&mut st);
            }
            if st.generation == round {
                return Err(RuntimeError::CollectiveFailed {
                    collective,
                    domain: id,
                    reason: "a member dropped out mid-collective".into(),
                });
            }
        }

        Ok(st
            .result
            .clone()
            .expect("rendezvous result present after completed round"))
    }

    fn poison(&self) {
        let mut st = self.state.lock();
        st.defunct = true;
        self.all_in.notify_all();
    }
}

struct ClusterShared {
    size: usize,
    gather: Rendezvous<Vec<Spike>>,
    reduce: Rendezvous<f64>,
}

/// One member of an in-process domain group. Create the whole group with
/// [`ClusterContext::group`] and hand one member to each thread.
pub struct ClusterContext {
    id: DomainId,
    shared: Arc<ClusterShared>,
}

impl ClusterContext {
    /// Build a group of `size` linked members, ids `0..size` in order.
    pub fn group(size: usize) -> Vec<ClusterContext> {
        assert!(size > 0, "cluster group must have at least one domain");
        let shared = Arc::new(ClusterShared {
            size,
            gather: Rendezvous::new(size),
            reduce: Rendezvous::new(size),
        });
        (0..size)
            .map(|id| ClusterContext {
                id,
                shared: Arc::clone(&shared),
            })
            .collect()
    }
}

impl DistributedContext for ClusterContext {
    fn size(&self) -> usize {
        self.shared.size
    }

    fn id(&self) -> DomainId {
        self.id
    }

    fn min(&self, value: f64) -> Result<f64> {
        let values = self.shared.reduce.exchange(self.id, value, "min")?;
        Ok(values.iter().copied().fold(f64::INFINITY, f64::min))
    }

    fn gather_spikes(&self, local: Vec<Spike>) -> Result<GatheredSpikes> {
        let per_domain = self
            .shared
            .gather
            .exchange(self.id, local, "gather_spikes")?;
        let counts: Vec<usize> = per_domain.iter().map(Vec::len).collect();
        let partition = make_index(&counts);
        let mut values = Vec::with_capacity(*partition.last().unwrap());
        for spikes in per_domain.iter() {
            values.extend_from_slice(spikes);
        }
        Ok(GatheredVector::new(values, partition))
    }

    fn name(&self) -> &'static str {
        "cluster"
    }
}

impl Drop for ClusterContext {
    fn drop(&mut self) {
        self.shared.gather.poison();
        self.shared.reduce.poison();
    }
}
