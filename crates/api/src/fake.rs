//! Fake reservation service for testing

use crate::client::ReservationApi;
use crate::error::ApiError;
use crate::types::{
    AuthSession, Credentials, Reservation, ReserveRequest, SearchHit, SearchQuery, SearchResults,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Recorded call to the fake service
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiCall {
    Authenticate { email: String },
    Reserve { venue_id: i64, party_size: u32 },
    Search { query: String },
}

/// Shared state for the fake service
struct FakeState {
    calls: Vec<ApiCall>,
    // Configurable behavior
    auth_error: Option<ApiError>,
    reserve_error: Option<ApiError>,
    no_table_before: u32,
    reserve_calls: u32,
    reserved_at: Option<DateTime<Utc>>,
    hits: Vec<SearchHit>,
    auth_min_validity: Duration,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            auth_error: None,
            reserve_error: None,
            no_table_before: 0,
            reserve_calls: 0,
            reserved_at: None,
            hits: Vec::new(),
            auth_min_validity: Duration::ZERO,
        }
    }
}

/// Fake reservation service with call recording for testing
#[derive(Clone, Default)]
pub struct FakeApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ApiCall> {
        self.lock().calls.clone()
    }

    /// Number of reserve calls seen so far
    pub fn reserve_calls(&self) -> u32 {
        self.lock().reserve_calls
    }

    /// Make every authenticate call fail with the given error
    pub fn fail_authentication(&self, error: ApiError) {
        self.lock().auth_error = Some(error);
    }

    /// Make every reserve call fail with the given error
    pub fn fail_reserve(&self, error: ApiError) {
        self.lock().reserve_error = Some(error);
    }

    /// Answer the first `n` reserve calls with `NoTable` before succeeding
    pub fn reject_first_reserves(&self, n: u32) {
        self.lock().no_table_before = n;
    }

    /// Fix the instant successful reservations report
    pub fn set_reserved_at(&self, at: DateTime<Utc>) {
        self.lock().reserved_at = Some(at);
    }

    /// Override the advertised minimum credential validity
    pub fn set_auth_min_validity(&self, validity: Duration) {
        self.lock().auth_min_validity = validity;
    }

    /// Seed a search hit
    pub fn add_hit(&self, hit: SearchHit) {
        self.lock().hits.push(hit);
    }
}

#[async_trait]
impl ReservationApi for FakeApi {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Authenticate {
            email: credentials.email.clone(),
        });
        if let Some(error) = &state.auth_error {
            return Err(error.clone());
        }
        Ok(AuthSession {
            account_id: 1,
            first_name: "Fake".to_string(),
            last_name: "Diner".to_string(),
            mobile: "+10000000000".to_string(),
            email: credentials.email.clone(),
            payment_method_id: 7,
            token: "fake-token".to_string(),
        })
    }

    async fn reserve(
        &self,
        _session: &AuthSession,
        request: &ReserveRequest,
    ) -> Result<Reservation, ApiError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Reserve {
            venue_id: request.venue_id,
            party_size: request.party_size,
        });
        state.reserve_calls += 1;
        if let Some(error) = &state.reserve_error {
            return Err(error.clone());
        }
        if state.reserve_calls <= state.no_table_before {
            return Err(ApiError::NoTable);
        }
        let reserved_at = state
            .reserved_at
            .or_else(|| request.reservation_times.first().copied())
            .unwrap_or(DateTime::UNIX_EPOCH);
        Ok(Reservation { reserved_at })
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, ApiError> {
        let mut state = self.lock();
        state.calls.push(ApiCall::Search {
            query: query.query.clone(),
        });
        let limit = query.limit.unwrap_or(state.hits.len()).min(state.hits.len());
        Ok(SearchResults {
            hits: state.hits[..limit].to_vec(),
        })
    }

    fn auth_min_validity(&self) -> Duration {
        self.lock().auth_min_validity
    }
}
