// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gathered vectors: the result shape of an all-gather
//!
//! The transport returns every domain's contribution flattened into one
//! array plus a length-`size+1` partition; domain `d`'s slice is
//! `values[partition[d]..partition[d+1])` and preserves that domain's
//! input order.

use spikelink_neural::partition::is_valid_partition;
use spikelink_neural::types::{DomainId, Spike};

/// Flat all-gather result with its per-domain partition.
#[derive(Debug, Clone, PartialEq)]
pub struct GatheredVector<T> {
    values: Vec<T>,
    partition: Vec<usize>,
}

/// The global spike array produced by `exchange`.
pub type GatheredSpikes = GatheredVector<Spike>;

impl<T> GatheredVector<T> {
    /// Wrap an all-gather result.
    ///
    /// # Panics
    /// Panics if the partition is malformed (must start at 0, close at
    /// `values.len()`, and be monotone); a transport handing back a bad
    /// shape is a contract violation.
    pub fn new(values: Vec<T>, partition: Vec<usize>) -> Self {
        assert!(
            is_valid_partition(&partition, values.len()),
            "gathered partition {:?} is malformed for {} values",
            partition,
            values.len()
        );
        Self { values, partition }
    }

    /// Single-domain result: everything in one slice.
    pub fn single(values: Vec<T>) -> Self {
        let len = values.len();
        Self {
            values,
            partition: vec![0, len],
        }
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn partition(&self) -> &[usize] {
        &self.partition
    }

    pub fn num_domains(&self) -> usize {
        self.partition.len() - 1
    }

    /// The contribution of domain `d`, in that domain's input order.
    pub fn slice(&self, d: DomainId) -> &[T] {
        &self.values[self.partition[d]..self.partition[d + 1]]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
