// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Distributed transport capability
//!
//! A narrow, object-safe interface over whatever collective machinery the
//! deployment uses (MPI, a fabric library, or nothing at all). The
//! communicator holds one behind `Arc<dyn DistributedContext>` for its
//! whole lifetime and never observes transport internals; wire formats
//! are the transport's business.

use spikelink_neural::types::{DomainId, Spike};

use crate::error::Result;
use crate::gathered::GatheredSpikes;

/// Collective operations over a fixed set of simulation domains.
///
/// All domains must enter each collective in matching order; the calls
/// block until the collective completes everywhere. Failure is fail-stop:
/// an `Err` means the simulation cannot continue, and no partial result
/// is ever handed out.
pub trait DistributedContext: Send + Sync {
    /// Number of domains in the simulation.
    fn size(&self) -> usize;

    /// This domain's id, in `[0, size)`.
    fn id(&self) -> DomainId;

    /// Allreduce-min: every domain receives the global minimum of the
    /// per-domain `value`s.
    fn min(&self, value: f64) -> Result<f64>;

    /// All-gather of local spikes: every domain receives the identical
    /// flat global spike array with its per-domain partition. The slice
    /// contributed by domain `d` preserves `d`'s input order.
    fn gather_spikes(&self, local: Vec<Spike>) -> Result<GatheredSpikes>;

    /// Transport name for logging.
    fn name(&self) -> &'static str {
        "distributed"
    }
}
