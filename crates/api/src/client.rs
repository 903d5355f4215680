// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The capability surface the scheduling core consumes

use crate::error::ApiError;
use crate::types::{AuthSession, Credentials, Reservation, ReserveRequest, SearchQuery, SearchResults};
use async_trait::async_trait;
use std::time::Duration;

/// A reservation platform.
///
/// Implementations are opaque, fallible remote calls; the core never
/// retries them except for the explicit no-table retry loop.
#[async_trait]
pub trait ReservationApi: Clone + Send + Sync + 'static {
    /// Exchange credentials for an authenticated session
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, ApiError>;

    /// Attempt a reservation across the request's candidate instants
    async fn reserve(
        &self,
        session: &AuthSession,
        request: &ReserveRequest,
    ) -> Result<Reservation, ApiError>;

    /// Find venues by name
    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, ApiError>;

    /// Minimum duration an authenticated session stays valid
    fn auth_min_validity(&self) -> Duration;
}
