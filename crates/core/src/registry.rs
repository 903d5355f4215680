// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operation registry
//!
//! Owns the collection of operation records, generates identities, spawns
//! one background task per scheduled operation, and exposes the
//! schedule/cancel/status/clean/list surface plus the default-credential
//! cache. Background tasks never touch the collection; they only own their
//! cancellation token and the sending half of their result inbox.

use crate::clock::Clock;
use crate::operation::{OperationId, OperationRecord, OperationStatus};
use crate::outcome::{OperationError, Outcome};
use crate::strategy::{self, AttemptSpec};
use chrono::{DateTime, Utc};
use resv_api::{ApiError, Credentials, ReservationApi, SearchQuery, SearchResults};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Caller mistakes, reported synchronously and never from inside a task
#[derive(Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("no operation has id {0}")]
    UnknownId(OperationId),
    #[error("operation {0} is not in progress")]
    NotInProgress(OperationId),
    #[error("operation {0} is still in progress")]
    StillInProgress(OperationId),
    #[error("no login default or login credentials provided")]
    NoCredentials,
    #[error("no operations scheduled")]
    NoOperations,
    #[error("no login credentials are stored")]
    NotLoggedIn,
    /// Collaborator failure during a synchronous pass-through call
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Parameters for scheduling an interval-retry operation
#[derive(Debug, Clone)]
pub struct IntervalRetryParams {
    /// Explicit credentials; falls back to the cached default when `None`
    pub credentials: Option<Credentials>,
    pub attempt: AttemptSpec,
    pub retry_interval: Duration,
}

/// Parameters for scheduling a deadline-trigger operation
#[derive(Debug, Clone)]
pub struct DeadlineTriggerParams {
    /// Explicit credentials; falls back to the cached default when `None`
    pub credentials: Option<Credentials>,
    pub attempt: AttemptSpec,
    /// Absolute UTC instant the attempt fires at
    pub fire_at: DateTime<Utc>,
}

struct RegistryState {
    operations: BTreeMap<OperationId, OperationRecord>,
    next_id: u64,
    credentials: Option<Credentials>,
}

/// Clone-shareable handle to the operation registry
#[derive(Clone)]
pub struct Registry<A: ReservationApi, C: Clock> {
    api: A,
    clock: C,
    state: Arc<Mutex<RegistryState>>,
}

impl<A: ReservationApi, C: Clock> Registry<A, C> {
    pub fn new(api: A, clock: C) -> Self {
        Self {
            api,
            clock,
            state: Arc::new(Mutex::new(RegistryState {
                operations: BTreeMap::new(),
                next_id: 1,
                credentials: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn resolve_credentials(
        &self,
        provided: Option<Credentials>,
    ) -> Result<Credentials, RegistryError> {
        if let Some(credentials) = provided {
            return Ok(credentials);
        }
        self.lock()
            .credentials
            .clone()
            .ok_or(RegistryError::NoCredentials)
    }

    /// Allocate a record in InProgress status and hand back the task's ends
    fn allocate(&self) -> (OperationId, CancellationToken, oneshot::Sender<Outcome>) {
        let mut state = self.lock();
        let id = OperationId(state.next_id);
        state.next_id += 1;
        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        state
            .operations
            .insert(id, OperationRecord::new(id, cancel.clone(), rx));
        (id, cancel, tx)
    }

    /// Schedule an interval-retry operation; returns without waiting on it
    pub fn schedule_interval_retry(
        &self,
        params: IntervalRetryParams,
    ) -> Result<OperationId, RegistryError> {
        let IntervalRetryParams {
            credentials,
            attempt,
            retry_interval,
        } = params;
        let credentials = self.resolve_credentials(credentials)?;
        let (id, cancel, tx) = self.allocate();
        tracing::info!(id = %id, venue_id = attempt.venue_id, "scheduled interval-retry operation");

        let api = self.api.clone();
        let clock = self.clock.clone();
        tokio::spawn(async move {
            let outcome = strategy::interval::run(
                &api,
                &clock,
                &credentials,
                &attempt,
                retry_interval,
                &cancel,
            )
            .await;
            finish(tx, &cancel, outcome);
        });
        Ok(id)
    }

    /// Schedule a deadline-trigger operation; returns without waiting on it
    pub fn schedule_deadline_trigger(
        &self,
        params: DeadlineTriggerParams,
    ) -> Result<OperationId, RegistryError> {
        let DeadlineTriggerParams {
            credentials,
            attempt,
            fire_at,
        } = params;
        let credentials = self.resolve_credentials(credentials)?;
        let (id, cancel, tx) = self.allocate();
        tracing::info!(id = %id, venue_id = attempt.venue_id, fire_at = %fire_at, "scheduled deadline-trigger operation");

        let api = self.api.clone();
        let clock = self.clock.clone();
        tokio::spawn(async move {
            let outcome =
                strategy::deadline::run(&api, &clock, &credentials, &attempt, fire_at, &cancel)
                    .await;
            finish(tx, &cancel, outcome);
        });
        Ok(id)
    }

    /// Cancel an in-progress operation.
    ///
    /// The token is raised at most once per operation: cancelling a terminal
    /// or already-cancelled operation is rejected, not ignored.
    pub fn cancel(&self, id: OperationId) -> Result<(), RegistryError> {
        let mut state = self.lock();
        let record = state
            .operations
            .get_mut(&id)
            .ok_or(RegistryError::UnknownId(id))?;
        record.refresh();
        if record.status != OperationStatus::InProgress {
            return Err(RegistryError::NotInProgress(id));
        }
        record.cancel.cancel();
        record.status = OperationStatus::Cancelled;
        tracing::info!(id = %id, "cancelled operation");
        Ok(())
    }

    /// Current status of an operation
    pub fn status(&self, id: OperationId) -> Result<OperationStatus, RegistryError> {
        let mut state = self.lock();
        let record = state
            .operations
            .get_mut(&id)
            .ok_or(RegistryError::UnknownId(id))?;
        record.refresh();
        Ok(record.status)
    }

    /// Remove a terminal operation from the registry permanently
    pub fn clean(&self, id: OperationId) -> Result<(), RegistryError> {
        let mut state = self.lock();
        let record = state
            .operations
            .get_mut(&id)
            .ok_or(RegistryError::UnknownId(id))?;
        record.refresh();
        if record.status == OperationStatus::InProgress {
            return Err(RegistryError::StillInProgress(id));
        }
        state.operations.remove(&id);
        tracing::debug!(id = %id, "removed operation");
        Ok(())
    }

    /// Human-readable report over every operation
    pub fn list_all(&self) -> Result<String, RegistryError> {
        let mut state = self.lock();
        if state.operations.is_empty() {
            return Err(RegistryError::NoOperations);
        }
        let mut report = String::from("Operations:\n");
        for record in state.operations.values_mut() {
            record.refresh();
            report.push_str(&format!("\n\tID: {}\n\tStatus: {}\n", record.id, record.status));
            match (&record.status, &record.outcome) {
                (OperationStatus::Succeeded, Some(Ok(reserved))) => {
                    report.push_str(&format!(
                        "\tResult: {}\n",
                        reserved.reserved_at().format("%H:%M")
                    ));
                }
                (OperationStatus::Failed, Some(Err(err))) => {
                    report.push_str(&format!("\tResult: {}\n", err));
                }
                _ => {}
            }
        }
        Ok(report)
    }

    /// Validate credentials against the collaborator, then cache them as the
    /// default for schedule calls that omit credentials.
    ///
    /// Nothing is cached when validation fails.
    pub async fn login(&self, credentials: Credentials) -> Result<(), RegistryError> {
        self.api.authenticate(&credentials).await?;
        self.lock().credentials = Some(credentials);
        tracing::info!("stored default credentials");
        Ok(())
    }

    /// Clear the cached default credentials
    pub fn logout(&self) -> Result<(), RegistryError> {
        let mut state = self.lock();
        if state.credentials.is_none() {
            return Err(RegistryError::NotLoggedIn);
        }
        state.credentials = None;
        tracing::info!("cleared default credentials");
        Ok(())
    }

    /// Venue search, passed through to the collaborator
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResults, RegistryError> {
        Ok(self.api.search(query).await?)
    }
}

/// Deliver the task's single terminal write.
///
/// Cancellation wins the race with natural completion: a result produced
/// after the token was raised is downgraded to Cancelled before sending.
/// The send itself is allowed to fail; the registry may already have
/// dropped the record via clean.
fn finish(tx: oneshot::Sender<Outcome>, cancel: &CancellationToken, outcome: Outcome) {
    let outcome = if cancel.is_cancelled() {
        Err(OperationError::Cancelled)
    } else {
        outcome
    };
    let _ = tx.send(outcome);
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
