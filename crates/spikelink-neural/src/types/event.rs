// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Delivered synaptic event

use super::Time;

/// A scheduled delivery onto one local cell: the target item's on-cell
/// index, the synaptic weight, and the delivery time
/// (`spike.time + connection.delay`).
///
/// Events are appended to per-cell queues in traversal order; consumers
/// that need temporal order must sort by `time` themselves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Event {
    pub target: u32,
    pub weight: f32,
    pub time: Time,
}
