// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Single-domain transport: every collective is a no-op

use spikelink_neural::types::{DomainId, Spike};

use crate::distributed::DistributedContext;
use crate::error::Result;
use crate::gathered::{GatheredSpikes, GatheredVector};

/// The trivial transport for undistributed runs: one domain, gathers
/// return the input, reductions are the identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalContext;

impl LocalContext {
    pub fn new() -> Self {
        Self
    }
}

impl DistributedContext for LocalContext {
    fn size(&self) -> usize {
        1
    }

    fn id(&self) -> DomainId {
        0
    }

    fn min(&self, value: f64) -> Result<f64> {
        Ok(value)
    }

    fn gather_spikes(&self, local: Vec<Spike>) -> Result<GatheredSpikes> {
        Ok(GatheredVector::single(local))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}
