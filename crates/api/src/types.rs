// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parameter and response types shared across reservation platforms

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account credentials for a reservation platform.
///
/// Resy authenticates with email and password; other platforms additionally
/// require the profile fields, so they are carried as optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            first_name: None,
            last_name: None,
            mobile: None,
        }
    }
}

/// An authenticated session returned by `authenticate`.
///
/// Only ever passed back into `reserve`; the fields are platform
/// internals and nothing outside this crate should depend on them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub account_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub mobile: String,
    pub email: String,
    pub payment_method_id: i64,
    pub token: String,
}

/// Input to the `search` call
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub query: String,
    /// Maximum number of hits to return; `None` returns everything
    pub limit: Option<usize>,
}

/// A single venue matching a search query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub venue_id: i64,
    pub name: String,
    pub region: String,
    pub locality: String,
    pub neighborhood: String,
}

/// Venues matching a search query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
}

impl std::fmt::Display for SearchResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Responses:")?;
        for hit in &self.hits {
            write!(
                f,
                "\n\tName: {}\n\t\tVenueID: {}\n\t\tRegion: {}\n\t\tLocality: {}\n\t\tNeighborhood: {}",
                hit.name, hit.venue_id, hit.region, hit.locality, hit.neighborhood
            )?;
        }
        Ok(())
    }
}

/// Input to the `reserve` call
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub venue_id: i64,
    /// Candidate instants in priority order; the first available wins
    pub reservation_times: Vec<DateTime<Utc>>,
    pub party_size: u32,
}

/// A confirmed reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    pub reserved_at: DateTime<Utc>,
}
