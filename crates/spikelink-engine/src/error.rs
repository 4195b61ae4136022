// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Communicator error types
//!
//! Contract violations (bad recipe output, malformed partitions, wrong
//! queue counts) are asserts, not errors: the surrounding simulator owns
//! input validation and a violation here is unrecoverable. What remains
//! recoverable enough to type is collective failure (propagated from the
//! transport) and event-queue growth failure, which is kept distinct so
//! callers can tell resource exhaustion from a broken contract.

use spikelink_runtime::RuntimeError;
use thiserror::Error;

/// Communicator errors
#[derive(Error, Debug)]
pub enum CommError {
    /// A transport collective failed; fail-stop, no partial results.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// A per-cell event queue could not grow to take more deliveries.
    #[error("event queue for local cell {cell} cannot grow by {additional} events")]
    QueueOverflow { cell: usize, additional: usize },
}

/// Result type for communicator operations
pub type Result<T> = core::result::Result<T, CommError>;
