// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Recipe: the connectivity interface consumed at construction
//!
//! The simulator describes the network to the communicator one cell at a
//! time: `connections_on(gid)` lists every connection terminating at that
//! cell. Construction queries local cells concurrently, so implementors
//! must tolerate parallel reads over distinct gids (the `Send + Sync`
//! bound is that capability).

use ahash::AHashMap;
use spikelink_neural::types::{CellGid, CellMember, Time};

/// One connection as described by a recipe: presynaptic `source` (any
/// cell, any domain), postsynaptic `dest` (an item on the queried cell),
/// synaptic weight, and a strictly positive propagation delay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionInfo {
    pub source: CellMember,
    pub dest: CellMember,
    pub weight: f32,
    pub delay: Time,
}

/// Network description consumed by communicator construction.
pub trait Recipe: Send + Sync {
    /// Total number of cells in the global network.
    fn num_cells(&self) -> usize;

    /// Connections terminating at cell `gid`. The returned `dest` members
    /// must all live on `gid` itself; delays must be strictly positive.
    fn connections_on(&self, gid: CellGid) -> Vec<ConnectionInfo>;
}

/// A recipe backed by an explicit per-cell connection table. The standard
/// vehicle for tests and generated networks.
#[derive(Debug, Default, Clone)]
pub struct TableRecipe {
    num_cells: usize,
    connections: AHashMap<CellGid, Vec<ConnectionInfo>>,
}

impl TableRecipe {
    pub fn new(num_cells: usize) -> Self {
        Self {
            num_cells,
            connections: AHashMap::new(),
        }
    }

    /// Register a connection; it is listed under its destination's cell.
    pub fn add_connection(&mut self, source: CellMember, dest: CellMember, weight: f32, delay: Time) {
        self.connections.entry(dest.gid).or_default().push(ConnectionInfo {
            source,
            dest,
            weight,
            delay,
        });
    }
}

impl Recipe for TableRecipe {
    fn num_cells(&self) -> usize {
        self.num_cells
    }

    fn connections_on(&self, gid: CellGid) -> Vec<ConnectionInfo> {
        self.connections.get(&gid).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_recipe_lists_by_destination() {
        let mut recipe = TableRecipe::new(3);
        recipe.add_connection(CellMember::new(0, 0), CellMember::new(2, 0), 1.0, 0.5);
        recipe.add_connection(CellMember::new(1, 0), CellMember::new(2, 1), 2.0, 0.5);

        assert_eq!(recipe.num_cells(), 3);
        assert!(recipe.connections_on(CellGid(0)).is_empty());
        let on_two = recipe.connections_on(CellGid(2));
        assert_eq!(on_two.len(), 2);
        assert_eq!(on_two[0].source, CellMember::new(0, 0));
        assert_eq!(on_two[1].dest, CellMember::new(2, 1));
    }
}
