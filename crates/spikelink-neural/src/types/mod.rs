// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identifier and event types

mod event;
mod ids;
mod spike;

pub use event::Event;
pub use ids::{CellGid, CellMember, DomainId};
pub use spike::Spike;

/// Simulation time, in the model's time unit (typically ms).
pub type Time = f64;
