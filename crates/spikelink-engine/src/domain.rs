// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Domain decomposition: where cells live
//!
//! The decomposition is decided outside the communicator (load balancing
//! is the simulator's problem); this module carries the result. Local
//! cells arrive as groups that step together; the gid→domain map must be
//! a total function over all global gids and agree across every domain.

use std::sync::Arc;

use ahash::AHashMap;
use spikelink_neural::types::{CellGid, DomainId};

/// Total gid→domain mapping, shared across the communicator's lifetime.
pub type GidDomainMap = Arc<dyn Fn(CellGid) -> DomainId + Send + Sync>;

/// A set of cells on one domain that step together.
#[derive(Debug, Clone)]
pub struct GroupDescription {
    pub gids: Vec<CellGid>,
}

impl GroupDescription {
    pub fn new(gids: Vec<CellGid>) -> Self {
        Self { gids }
    }
}

/// This domain's share of the network: its cell groups in declaration
/// order, plus the global gid→domain map.
#[derive(Clone)]
pub struct DomainDecomposition {
    groups: Vec<GroupDescription>,
    num_local_cells: usize,
    gid_domain: GidDomainMap,
}

impl DomainDecomposition {
    pub fn new(groups: Vec<GroupDescription>, gid_domain: GidDomainMap) -> Self {
        let num_local_cells = groups.iter().map(|g| g.gids.len()).sum();
        Self {
            groups,
            num_local_cells,
            gid_domain,
        }
    }

    pub fn groups(&self) -> &[GroupDescription] {
        &self.groups
    }

    pub fn num_local_cells(&self) -> usize {
        self.num_local_cells
    }

    /// The domain owning `gid`.
    pub fn gid_domain(&self, gid: CellGid) -> DomainId {
        (self.gid_domain)(gid)
    }
}

impl std::fmt::Debug for DomainDecomposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainDecomposition")
            .field("groups", &self.groups)
            .field("num_local_cells", &self.num_local_cells)
            .finish_non_exhaustive()
    }
}

/// Build a gid→domain map from every domain's gid list (`lists[d]` holds
/// domain `d`'s gids). Every domain must build it from the same lists so
/// the mapping agrees globally.
///
/// The returned map panics when asked about a gid no domain owns; that
/// is a contract violation, not a routable condition.
pub fn gid_domain_from_lists(lists: &[Vec<CellGid>]) -> GidDomainMap {
    let mut table = AHashMap::with_capacity(lists.iter().map(Vec::len).sum());
    for (domain, gids) in lists.iter().enumerate() {
        for &gid in gids {
            let previous = table.insert(gid, domain);
            assert!(
                previous.is_none(),
                "gid {} claimed by domains {} and {}",
                gid,
                previous.unwrap(),
                domain
            );
        }
    }
    Arc::new(move |gid| {
        *table
            .get(&gid)
            .unwrap_or_else(|| panic!("gid {} is not owned by any domain", gid))
    })
}
