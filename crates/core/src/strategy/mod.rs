// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reservation attempt strategies
//!
//! Each strategy is an async function of (api, clock, credentials, attempt,
//! timing parameter, cancellation token) to a terminal [`Outcome`]. The
//! registry spawns one task per scheduled operation around one of these.
//! Every timed wait races the cancellation token; once cancellation is
//! observed the task does no further work.

pub mod deadline;
pub mod interval;

use crate::outcome::OperationError;
use chrono::{DateTime, Utc};
use resv_api::ReserveRequest;
use tokio_util::sync::CancellationToken;

/// The venue, candidate instants and party size both strategies target
#[derive(Debug, Clone)]
pub struct AttemptSpec {
    pub venue_id: i64,
    /// Candidate instants in priority order
    pub reservation_times: Vec<DateTime<Utc>>,
    pub party_size: u32,
}

impl AttemptSpec {
    pub(crate) fn to_request(&self) -> ReserveRequest {
        ReserveRequest {
            venue_id: self.venue_id,
            reservation_times: self.reservation_times.clone(),
            party_size: self.party_size,
        }
    }
}

/// Sleep until `instant`, racing the cancellation token.
///
/// Returns immediately when the instant is already in the past.
pub(crate) async fn wait_until(
    now: DateTime<Utc>,
    instant: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Result<(), OperationError> {
    let Ok(delay) = (instant - now).to_std() else {
        return Ok(());
    };
    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = cancel.cancelled() => Err(OperationError::Cancelled),
    }
}

/// Sleep for `delay`, racing the cancellation token
pub(crate) async fn wait_for(
    delay: std::time::Duration,
    cancel: &CancellationToken,
) -> Result<(), OperationError> {
    tokio::select! {
        _ = tokio::time::sleep(delay) => Ok(()),
        _ = cancel.cancelled() => Err(OperationError::Cancelled),
    }
}
