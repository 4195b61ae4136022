// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for runtime capabilities

use thiserror::Error;

/// Runtime capability errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// A distributed collective did not complete on every domain.
    /// The collective model is fail-stop; the caller must treat this
    /// as fatal for the simulation.
    #[error("collective '{collective}' failed on domain {domain}: {reason}")]
    CollectiveFailed {
        collective: &'static str,
        domain: usize,
        reason: String,
    },

    /// Worker pool could not be constructed
    #[error("worker pool construction failed: {0}")]
    PoolBuild(String),
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, RuntimeError>;
