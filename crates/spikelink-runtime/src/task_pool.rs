// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Worker pool capability
//!
//! Bounded intra-domain parallelism behind one enum, so callers are
//! polymorphic over `{serial, pooled}` without trait objects: a generic
//! `parallel_map` cannot live on an object-safe trait, and the variant
//! set is closed.
//!
//! All invocations of the supplied closure must be non-aliasing; the
//! signatures enforce it (index-disjoint map targets, owned work items).

use rayon::prelude::*;

use crate::error::{Result, RuntimeError};

/// A worker pool: either inline execution on the calling thread, or a
/// dedicated rayon pool.
pub enum TaskPool {
    Serial,
    Pooled(rayon::ThreadPool),
}

impl TaskPool {
    pub fn serial() -> Self {
        TaskPool::Serial
    }

    /// A dedicated pool with `threads` workers (0 lets rayon pick the
    /// available parallelism).
    pub fn pooled(threads: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()
            .map_err(|e| RuntimeError::PoolBuild(e.to_string()))?;
        Ok(TaskPool::Pooled(pool))
    }

    pub fn threads(&self) -> usize {
        match self {
            TaskPool::Serial => 1,
            TaskPool::Pooled(pool) => pool.current_num_threads(),
        }
    }

    /// Evaluate `f(i)` for `i in 0..len`, results in index order.
    pub fn parallel_map<T, F>(&self, len: usize, f: F) -> Vec<T>
    where
        T: Send,
        F: Fn(usize) -> T + Sync + Send,
    {
        match self {
            TaskPool::Serial => (0..len).map(f).collect(),
            TaskPool::Pooled(pool) => pool.install(|| (0..len).into_par_iter().map(f).collect()),
        }
    }

    /// Run `f(i)` for `i in 0..len`; invocations may be concurrent.
    pub fn parallel_for<F>(&self, len: usize, f: F)
    where
        F: Fn(usize) + Sync + Send,
    {
        match self {
            TaskPool::Serial => (0..len).for_each(f),
            TaskPool::Pooled(pool) => pool.install(|| (0..len).into_par_iter().for_each(f)),
        }
    }

    /// Consume owned work items, one `f` call each; invocations may be
    /// concurrent. This is how disjoint mutable slices (e.g. independent
    /// per-domain sort ranges) are dispatched without shared memory.
    pub fn parallel_for_each<T, F>(&self, items: Vec<T>, f: F)
    where
        T: Send,
        F: Fn(T) + Sync + Send,
    {
        match self {
            TaskPool::Serial => items.into_iter().for_each(f),
            TaskPool::Pooled(pool) => pool.install(|| items.into_par_iter().for_each(f)),
        }
    }
}

impl std::fmt::Debug for TaskPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPool::Serial => write!(f, "TaskPool::Serial"),
            TaskPool::Pooled(pool) => {
                write!(f, "TaskPool::Pooled({})", pool.current_num_threads())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_matches_serial() {
        let serial = TaskPool::serial();
        let pooled = TaskPool::pooled(4).unwrap();
        let f = |i: usize| i * i + 1;
        assert_eq!(serial.parallel_map(100, f), pooled.parallel_map(100, f));
    }

    #[test]
    fn test_for_each_sorts_disjoint_slices() {
        let pool = TaskPool::pooled(2).unwrap();
        let mut data = vec![3, 1, 2, 9, 7, 8];
        let (a, b) = data.split_at_mut(3);
        pool.parallel_for_each(vec![a, b], |s| s.sort_unstable());
        assert_eq!(data, vec![1, 2, 3, 7, 8, 9]);
    }

    #[test]
    fn test_parallel_for_visits_every_index() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        let pool = TaskPool::pooled(3).unwrap();
        let sum = AtomicUsize::new(0);
        pool.parallel_for(10, |i| {
            sum.fetch_add(i, Ordering::Relaxed);
        });
        assert_eq!(sum.load(Ordering::Relaxed), 45);
    }
}
