// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spike: a timestamped firing event

use core::fmt;

use serde::{Deserialize, Serialize};

use super::{CellMember, Time};

/// A firing event emitted by a source cell. Spikes are what crosses
/// domain boundaries during the exchange; transports serialize them as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spike {
    pub source: CellMember,
    pub time: Time,
}

impl Spike {
    pub fn new(source: CellMember, time: Time) -> Self {
        Self { source, time }
    }
}

impl fmt::Display for Spike {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "spike({} @ {})", self.source, self.time)
    }
}
