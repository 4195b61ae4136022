// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spikelink Neural Data Model
//!
//! Core types shared by the spike-exchange engine:
//! - **Identifiers**: `CellGid`, `CellMember` (gid + on-cell index)
//! - **Spikes**: timestamped firing events emitted by source cells
//! - **Connections**: immutable synaptic links with weight and delay
//! - **Events**: per-target deliveries produced by routing a spike
//!   through a connection
//! - **Partitions**: prefix-sum range indices used to bucket flat arrays
//!   by domain or by cell group
//!
//! Everything here is plain data laid out for cache-friendly iteration;
//! the distributed and threading machinery lives in `spikelink-runtime`,
//! and the orchestration in `spikelink-engine`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connection;
pub mod partition;
pub mod search;
pub mod types;

pub use connection::Connection;
pub use partition::{make_index, CellPartition};
pub use search::equal_range_by_key;
pub use types::{CellGid, CellMember, DomainId, Event, Spike, Time};
