// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Connection: an immutable synaptic link
//!
//! A connection joins a presynaptic `source` (any cell, any domain) to a
//! postsynaptic `dest` on the owning domain. The table of connections is
//! built once at communicator construction, bucketed by source domain and
//! sorted within each bucket by `(source, dest)`; nothing mutates it
//! afterwards, so it is freely shareable read-only.

use core::fmt;

use crate::types::{CellMember, Event, Spike, Time};

/// A directed synaptic link with weight and propagation delay.
///
/// `index_on_domain` is the dense local index of the destination cell
/// within the owning domain (not its gid); it selects the per-cell event
/// queue that deliveries through this connection are appended to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    source: CellMember,
    dest: CellMember,
    weight: f32,
    delay: Time,
    index_on_domain: u32,
}

impl Connection {
    /// Build a connection record.
    ///
    /// # Panics
    /// Panics if `delay` is not strictly positive: a zero or negative
    /// propagation delay breaks the global epoch-length contract and is
    /// unrecoverable.
    pub fn new(source: CellMember, dest: CellMember, weight: f32, delay: Time, index_on_domain: u32) -> Self {
        assert!(
            delay > 0.0,
            "connection {} -> {} has non-positive delay {}",
            source,
            dest,
            delay
        );
        Self {
            source,
            dest,
            weight,
            delay,
            index_on_domain,
        }
    }

    pub fn source(&self) -> CellMember {
        self.source
    }

    pub fn dest(&self) -> CellMember {
        self.dest
    }

    pub fn weight(&self) -> f32 {
        self.weight
    }

    pub fn delay(&self) -> Time {
        self.delay
    }

    pub fn index_on_domain(&self) -> u32 {
        self.index_on_domain
    }

    /// Sort key for the per-domain buckets: lexicographic `(source, dest)`.
    #[inline]
    pub fn order_key(&self) -> (CellMember, CellMember) {
        (self.source, self.dest)
    }

    /// Translate a spike from this connection's source into the delivered
    /// event: same weight, delivery time `spike.time + delay`, no rounding.
    #[inline]
    pub fn make_event(&self, spike: &Spike) -> Event {
        Event {
            target: self.dest.index,
            weight: self.weight,
            time: spike.time + self.delay,
        }
    }
}

/// Zeroed placeholder. Only valid as a pre-allocation slot in the flat
/// connection table; construction overwrites every slot exactly once.
impl Default for Connection {
    fn default() -> Self {
        Self {
            source: CellMember::default(),
            dest: CellMember::default(),
            weight: 0.0,
            delay: 0.0,
            index_on_domain: 0,
        }
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "con({} -> {}, w {}, d {})",
            self.source, self.dest, self.weight, self.delay
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_event_adds_delay() {
        let con = Connection::new(CellMember::new(0, 0), CellMember::new(3, 1), 0.5, 2.0, 7);
        let ev = con.make_event(&Spike::new(CellMember::new(0, 0), 5.0));
        assert_eq!(ev.target, 1);
        assert_eq!(ev.weight, 0.5);
        assert_eq!(ev.time, 7.0);
    }

    #[test]
    #[should_panic(expected = "non-positive delay")]
    fn test_zero_delay_is_fatal() {
        let _ = Connection::new(CellMember::new(0, 0), CellMember::new(1, 0), 1.0, 0.0, 0);
    }

    #[test]
    #[should_panic(expected = "non-positive delay")]
    fn test_nan_delay_is_fatal() {
        let _ = Connection::new(CellMember::new(0, 0), CellMember::new(1, 0), 1.0, f64::NAN, 0);
    }

    #[test]
    fn test_order_key_is_source_then_dest() {
        let a = Connection::new(CellMember::new(1, 0), CellMember::new(9, 0), 1.0, 1.0, 0);
        let b = Connection::new(CellMember::new(2, 0), CellMember::new(0, 0), 1.0, 1.0, 0);
        let c = Connection::new(CellMember::new(2, 0), CellMember::new(4, 0), 1.0, 1.0, 0);
        assert!(a.order_key() < b.order_key());
        assert!(b.order_key() < c.order_key());
    }
}
