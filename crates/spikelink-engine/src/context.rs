// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Execution context: the two capabilities the communicator runs on

use std::sync::Arc;

use spikelink_runtime::{DistributedContext, LocalContext, RuntimeError, TaskPool};

/// Shared handles to the distributed transport and the worker pool. The
/// communicator clones what it keeps, so one context can serve several
/// components of the simulator.
#[derive(Clone)]
pub struct ExecutionContext {
    pub distributed: Arc<dyn DistributedContext>,
    pub task_pool: Arc<TaskPool>,
}

impl ExecutionContext {
    pub fn new(distributed: Arc<dyn DistributedContext>, task_pool: Arc<TaskPool>) -> Self {
        Self {
            distributed,
            task_pool,
        }
    }

    /// Single domain, inline execution: the undistributed default.
    pub fn local() -> Self {
        Self::new(Arc::new(LocalContext::new()), Arc::new(TaskPool::serial()))
    }

    /// Single domain with a worker pool for construction parallelism.
    pub fn local_with_threads(threads: usize) -> Result<Self, RuntimeError> {
        Ok(Self::new(
            Arc::new(LocalContext::new()),
            Arc::new(TaskPool::pooled(threads)?),
        ))
    }
}

impl std::fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("distributed", &self.distributed.name())
            .field("task_pool", &self.task_pool)
            .finish()
    }
}
