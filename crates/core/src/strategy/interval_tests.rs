// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{FakeClock, SystemClock};
use resv_api::{ApiCall, FakeApi};

fn creds() -> Credentials {
    Credentials::new("diner@example.com", "hunter2")
}

fn attempt(times: Vec<DateTime<Utc>>) -> AttemptSpec {
    AttemptSpec {
        venue_id: 42,
        reservation_times: times,
        party_size: 2,
    }
}

#[tokio::test]
async fn empty_candidate_list_fails_immediately() {
    let api = FakeApi::new();

    let outcome = run(
        &api,
        &SystemClock,
        &creds(),
        &attempt(vec![]),
        Duration::from_millis(10),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, Err(OperationError::NoCandidateTimes));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn past_deadline_short_circuits_before_collaborator() {
    let api = FakeApi::new();
    let clock = FakeClock::new();
    let times = vec![clock.now() - chrono::Duration::hours(1)];

    let outcome = run(
        &api,
        &clock,
        &creds(),
        &attempt(times),
        Duration::from_millis(10),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(outcome, Err(OperationError::PastDeadline));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn reauthenticates_every_round() {
    let api = FakeApi::new();
    api.reject_first_reserves(2);
    let times = vec![Utc::now() + chrono::Duration::hours(1)];

    let outcome = run(
        &api,
        &SystemClock,
        &creds(),
        &attempt(times),
        Duration::from_millis(5),
        &CancellationToken::new(),
    )
    .await;

    assert!(outcome.is_ok());
    let auths = api
        .calls()
        .iter()
        .filter(|c| matches!(c, ApiCall::Authenticate { .. }))
        .count();
    assert_eq!(auths, 3);
    assert_eq!(api.reserve_calls(), 3);
}

#[tokio::test]
async fn authentication_error_is_not_retried() {
    let api = FakeApi::new();
    api.fail_authentication(ApiError::InvalidCredentials);
    let times = vec![Utc::now() + chrono::Duration::hours(1)];

    let outcome = run(
        &api,
        &SystemClock,
        &creds(),
        &attempt(times),
        Duration::from_millis(5),
        &CancellationToken::new(),
    )
    .await;

    assert_eq!(
        outcome,
        Err(OperationError::Api(ApiError::InvalidCredentials))
    );
    assert_eq!(api.reserve_calls(), 0);
}

#[tokio::test]
async fn unexpected_reserve_error_terminates_the_loop() {
    let api = FakeApi::new();
    api.fail_reserve(ApiError::Network("502 bad gateway".to_string()));
    let times = vec![Utc::now() + chrono::Duration::hours(1)];

    let outcome = run(
        &api,
        &SystemClock,
        &creds(),
        &attempt(times),
        Duration::from_millis(5),
        &CancellationToken::new(),
    )
    .await;

    assert!(matches!(
        outcome,
        Err(OperationError::Api(ApiError::Network(_)))
    ));
    assert_eq!(api.reserve_calls(), 1);
}

#[tokio::test]
async fn cancellation_interrupts_the_interval_wait() {
    let api = FakeApi::new();
    api.reject_first_reserves(u32::MAX);
    let times = vec![Utc::now() + chrono::Duration::hours(1)];
    let cancel = CancellationToken::new();

    let handle = {
        let api = api.clone();
        let cancel = cancel.clone();
        let credentials = creds();
        let attempt = attempt(times);
        tokio::spawn(async move {
            run(
                &api,
                &SystemClock,
                &credentials,
                &attempt,
                Duration::from_secs(60),
                &cancel,
            )
            .await
        })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    assert_eq!(handle.await.unwrap(), Err(OperationError::Cancelled));
}

#[tokio::test]
async fn deadline_passing_mid_retry_stops_the_loop() {
    let api = FakeApi::new();
    api.reject_first_reserves(u32::MAX);
    let clock = FakeClock::new();
    let deadline = clock.now() + chrono::Duration::minutes(1);

    let handle = {
        let api = api.clone();
        let clock = clock.clone();
        let credentials = creds();
        let attempt = attempt(vec![deadline]);
        tokio::spawn(async move {
            run(
                &api,
                &clock,
                &credentials,
                &attempt,
                Duration::from_millis(1),
                &CancellationToken::new(),
            )
            .await
        })
    };

    // Let a few rounds run, then push the clock past the deadline
    tokio::time::sleep(Duration::from_millis(20)).await;
    clock.advance(Duration::from_secs(120));

    assert_eq!(handle.await.unwrap(), Err(OperationError::PastDeadline));
    assert!(api.reserve_calls() > 0);
}

#[test]
fn latest_picks_the_maximum_instant() {
    let now = Utc::now();
    let times = vec![
        now + chrono::Duration::hours(2),
        now + chrono::Duration::hours(3),
        now + chrono::Duration::hours(1),
    ];

    assert_eq!(latest(&times), Some(now + chrono::Duration::hours(3)));
    assert_eq!(latest(&[]), None);
}
