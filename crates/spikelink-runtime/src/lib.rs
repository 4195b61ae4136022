// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spikelink Runtime
//!
//! Execution capabilities the communicator is polymorphic over:
//! - **Distributed transport**: an abstract collective over a fixed set
//!   of domains (`size`, `id`, allreduce-min, spike all-gather), with a
//!   single-domain no-op (`LocalContext`) and an in-process thread-backed
//!   group (`ClusterContext`) for tests and dry runs. MPI-class transports
//!   implement the same trait out of tree.
//! - **Worker pool**: bounded intra-domain parallelism as a
//!   `TaskPool::{Serial, Pooled}` over rayon.
//!
//! The collective model is fail-stop: a collective either completes on
//! every domain or surfaces `RuntimeError::CollectiveFailed`; partial
//! results are never produced.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cluster;
pub mod distributed;
pub mod error;
pub mod gathered;
pub mod local;
pub mod task_pool;

pub use cluster::ClusterContext;
pub use distributed::DistributedContext;
pub use error::{Result, RuntimeError};
pub use gathered::{GatheredSpikes, GatheredVector};
pub use local::LocalContext;
pub use task_pool::TaskPool;
