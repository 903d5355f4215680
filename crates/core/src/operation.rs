// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Bookkeeping for one scheduled operation
//!
//! A record couples the registry-facing status with the two channels shared
//! with the background task: the cancellation token (registry raises, task
//! observes) and the result inbox (task writes exactly once, registry drains
//! at most once).

use crate::outcome::{OperationError, Outcome};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;
use tokio_util::sync::CancellationToken;

/// Unique identifier for a scheduled operation.
///
/// Monotonically increasing; never reused for the registry's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(pub u64);

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Externally observable status of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationStatus {
    InProgress,
    Succeeded,
    Failed,
    Cancelled,
}

impl OperationStatus {
    /// Whether no further transition can occur
    pub fn is_terminal(&self) -> bool {
        !matches!(self, OperationStatus::InProgress)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationStatus::InProgress => "In Progress",
            OperationStatus::Succeeded => "Succeeded",
            OperationStatus::Failed => "Failed",
            OperationStatus::Cancelled => "Cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Registry-side state of one scheduled operation
pub(crate) struct OperationRecord {
    pub id: OperationId,
    pub status: OperationStatus,
    pub cancel: CancellationToken,
    inbox: oneshot::Receiver<Outcome>,
    /// Frozen at the first terminal observation, immutable afterwards
    pub outcome: Option<Outcome>,
}

impl OperationRecord {
    pub fn new(
        id: OperationId,
        cancel: CancellationToken,
        inbox: oneshot::Receiver<Outcome>,
    ) -> Self {
        Self {
            id,
            status: OperationStatus::InProgress,
            cancel,
            inbox,
            outcome: None,
        }
    }

    /// Reconcile the status with the background task's single write.
    ///
    /// Non-blocking and idempotent: once the record is terminal this is a
    /// no-op, and an empty inbox leaves the record untouched.
    pub fn refresh(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        match self.inbox.try_recv() {
            Ok(outcome) => {
                self.status = match &outcome {
                    Ok(_) => OperationStatus::Succeeded,
                    Err(OperationError::Cancelled) => OperationStatus::Cancelled,
                    Err(_) => OperationStatus::Failed,
                };
                self.outcome = Some(outcome);
            }
            Err(TryRecvError::Empty) => {}
            // Sender dropped without a write: the task was torn down
            Err(TryRecvError::Closed) => {
                self.status = OperationStatus::Failed;
                self.outcome = Some(Err(OperationError::Aborted));
            }
        }
    }
}
