// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interval-retry strategy
//!
//! Retries the reservation until a table is found, a non-transient error
//! occurs, the latest candidate instant passes, or the operation is
//! cancelled. Each round re-authenticates; sessions are short-lived.

use super::{wait_for, AttemptSpec};
use crate::clock::Clock;
use crate::outcome::{OperationError, Outcome, Reserved};
use chrono::{DateTime, Utc};
use resv_api::{ApiError, Credentials, ReservationApi};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

pub async fn run<A: ReservationApi, C: Clock>(
    api: &A,
    clock: &C,
    credentials: &Credentials,
    attempt: &AttemptSpec,
    retry_interval: Duration,
    cancel: &CancellationToken,
) -> Outcome {
    let Some(deadline) = latest(&attempt.reservation_times) else {
        return Err(OperationError::NoCandidateTimes);
    };
    let request = attempt.to_request();

    loop {
        // Checked before touching the collaborator, so an all-past candidate
        // list fails without a single authenticate or reserve call.
        if deadline <= clock.now() {
            return Err(OperationError::PastDeadline);
        }

        let session = api.authenticate(credentials).await?;

        match api.reserve(&session, &request).await {
            Ok(reservation) => return Ok(Reserved::new(reservation.reserved_at)),
            Err(ApiError::NoTable) => {
                if deadline <= clock.now() {
                    return Err(OperationError::PastDeadline);
                }
                tracing::debug!(
                    venue_id = attempt.venue_id,
                    "no table available, waiting out retry interval"
                );
                wait_for(retry_interval, cancel).await?;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Latest instant in the candidate list; retrying past it is pointless
fn latest(times: &[DateTime<Utc>]) -> Option<DateTime<Utc>> {
    times.iter().max().copied()
}

#[cfg(test)]
#[path = "interval_tests.rs"]
mod tests;
