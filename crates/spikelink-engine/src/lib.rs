// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spikelink Engine
//!
//! The spike-exchange communicator of a distributed neural simulation.
//! Cells are partitioned across domains; each epoch, the spikes fired on
//! every domain are all-gathered, and each domain routes the global spike
//! array through its cross-domain connection table into per-cell event
//! queues.
//!
//! ## Architecture
//! - Immutable connection table, bucketed by source domain and sorted by
//!   `(source, dest)` inside each bucket; built once, shared read-only
//! - Merge-join event routing that walks the smaller of
//!   {connections, spikes} per domain and binary-searches the larger
//! - Collectives behind the `DistributedContext` capability, intra-domain
//!   parallelism behind `TaskPool` (see `spikelink-runtime`)
//!
//! Construction inputs come from a [`Recipe`] (connectivity) and a
//! [`DomainDecomposition`] (cell placement); both are consumed interfaces
//! implemented by the surrounding simulator.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod communicator;
pub mod context;
pub mod domain;
pub mod error;
pub mod recipe;

pub use communicator::{Communicator, RoutingPolicy};
pub use context::ExecutionContext;
pub use domain::{gid_domain_from_lists, DomainDecomposition, GidDomainMap, GroupDescription};
pub use error::{CommError, Result};
pub use recipe::{ConnectionInfo, Recipe, TableRecipe};

// Convenience re-exports of the layers this surface is built from.
pub use spikelink_neural::{CellGid, CellMember, Connection, Event, Spike, Time};
pub use spikelink_runtime::{
    ClusterContext, DistributedContext, GatheredSpikes, LocalContext, TaskPool,
};
