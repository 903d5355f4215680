// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deadline-trigger strategy
//!
//! Fires a single reservation attempt at a precise UTC instant.
//! Authentication happens just inside the collaborator's minimum credential
//! validity window, so the session is neither stale at fire time nor
//! acquired pointlessly far ahead of it.

use super::{wait_until, AttemptSpec};
use crate::clock::Clock;
use crate::outcome::{OperationError, Outcome, Reserved};
use chrono::{DateTime, Utc};
use resv_api::{Credentials, ReservationApi};
use tokio_util::sync::CancellationToken;

pub async fn run<A: ReservationApi, C: Clock>(
    api: &A,
    clock: &C,
    credentials: &Credentials,
    attempt: &AttemptSpec,
    fire_at: DateTime<Utc>,
    cancel: &CancellationToken,
) -> Outcome {
    if fire_at <= clock.now() {
        return Err(OperationError::FireTimePassed);
    }

    let validity = chrono::Duration::from_std(api.auth_min_validity())
        .unwrap_or_else(|_| chrono::Duration::zero());
    let auth_at = fire_at - validity;
    wait_until(clock.now(), auth_at, cancel).await?;

    let session = api.authenticate(credentials).await?;

    wait_until(clock.now(), fire_at, cancel).await?;

    let reservation = api.reserve(&session, &attempt.to_request()).await?;
    Ok(Reserved::new(reservation.reserved_at))
}

#[cfg(test)]
#[path = "deadline_tests.rs"]
mod tests;
