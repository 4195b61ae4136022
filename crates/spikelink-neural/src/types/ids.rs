// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for cells and cell-local items

use core::fmt;

use serde::{Deserialize, Serialize};

/// Domain identifier: one process in the distributed simulation,
/// in `[0, num_domains)`. Kept as `usize` for direct indexing into
/// per-domain partitions.
pub type DomainId = usize;

/// Cell GID (globally unique across all domains)
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellGid(pub u32);

impl fmt::Display for CellGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Address of one item on one cell: the cell's `gid` plus the item's
/// index within that cell (e.g. a synapse or a spike detector slot).
///
/// The total order is lexicographic by `(gid, index)`; the derive below
/// relies on the field declaration order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CellMember {
    pub gid: CellGid,
    pub index: u32,
}

impl CellMember {
    pub fn new(gid: u32, index: u32) -> Self {
        Self {
            gid: CellGid(gid),
            index,
        }
    }
}

impl fmt::Display for CellMember {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.gid, self.index)
    }
}
