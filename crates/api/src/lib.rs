// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! resv-api: Reservation service collaborator surface
//!
//! This crate provides:
//! - The `ReservationApi` trait consumed by the scheduling core
//! - Parameter and response types shared across platforms
//! - The production Resy client
//! - A recording `FakeApi` for tests (behind the `test-support` feature)

pub mod error;
pub mod resy;
pub mod types;

mod client;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use client::ReservationApi;
pub use error::ApiError;
pub use resy::ResyApi;
pub use types::{
    AuthSession, Credentials, Reservation, ReserveRequest, SearchHit, SearchQuery, SearchResults,
};

#[cfg(any(test, feature = "test-support"))]
pub use fake::{ApiCall, FakeApi};
