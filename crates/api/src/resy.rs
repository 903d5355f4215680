// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resy implementation of the reservation service surface
//!
//! Booking is a three-step flow against the Resy HTTP API: find the slot
//! listing for the candidate day, fetch a booking token for a slot matching
//! a candidate instant, then book it against the stored payment method.

use crate::client::ReservationApi;
use crate::error::ApiError;
use crate::types::{
    AuthSession, Credentials, Reservation, ReserveRequest, SearchHit, SearchQuery, SearchResults,
};
use async_trait::async_trait;
use chrono::{DateTime, Timelike, Utc};
use serde_json::Value;
use std::time::Duration;

const BASE_URL: &str = "https://api.resy.com";

/// The only known working API key, same for every client installation
const DEFAULT_API_KEY: &str = "VbWk7s3L4KiK5fzlO7JD3Q5EYolJI7n5";

/// Resy client
#[derive(Clone)]
pub struct ResyApi {
    api_key: String,
    http: reqwest::Client,
}

impl ResyApi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Client with the out-of-the-box API key
    pub fn with_default_key() -> Self {
        Self::new(DEFAULT_API_KEY)
    }

    fn auth_header(&self) -> String {
        format!("ResyAPI api_key=\"{}\"", self.api_key)
    }

    /// Fetch a booking token for one slot, then book it.
    ///
    /// Returns `Ok(false)` when this slot did not work out and the caller
    /// should move on to the next one.
    async fn book_slot(
        &self,
        session: &AuthSession,
        day: &str,
        request: &ReserveRequest,
        config_token: &str,
    ) -> Result<bool, ApiError> {
        let details = self
            .http
            .get(format!("{BASE_URL}/3/details"))
            .query(&[
                ("day", day),
                ("party_size", &request.party_size.to_string()),
                ("x-resy-auth-token", &session.token),
                ("venue_id", &request.venue_id.to_string()),
                ("config_id", config_token),
            ])
            .header("Authorization", self.auth_header())
            .header("X-Resy-Auth-Token", &session.token)
            .header("X-Resy-Universal-Auth-Token", &session.token)
            .send()
            .await?;

        if !details.status().is_success() {
            return Err(ApiError::Network(format!(
                "details returned {}",
                details.status()
            )));
        }

        let details: Value = details.json().await?;
        let book_token = str_field(field(&details, "book_token")?, "value")?.to_string();

        let payment = format!("{{\"id\":{}}}", session.payment_method_id);
        let book = self
            .http
            .post(format!("{BASE_URL}/3/book"))
            .form(&[
                ("book_token", book_token.as_str()),
                ("struct_payment_method", payment.as_str()),
                ("source_id", "resy.com-venue-details"),
            ])
            .header("Authorization", self.auth_header())
            .header("X-Resy-Auth-Token", &session.token)
            .header("X-Resy-Universal-Auth-Token", &session.token)
            .header("Referer", "https://resy.com/")
            .send()
            .await?;

        if !book.status().is_success() {
            return Ok(false);
        }
        // Any parseable body means the booking went through
        Ok(book.json::<Value>().await.is_ok())
    }
}

#[async_trait]
impl ReservationApi for ResyApi {
    async fn authenticate(&self, credentials: &Credentials) -> Result<AuthSession, ApiError> {
        let response = self
            .http
            .post(format!("{BASE_URL}/3/auth/password"))
            .form(&[
                ("email", credentials.email.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .header("Authorization", self.auth_header())
            .send()
            .await?;

        // Resy answers 419 when the auth parameters were invalid
        if response.status().as_u16() == 419 {
            return Err(ApiError::InvalidCredentials);
        }
        if !response.status().is_success() {
            return Err(ApiError::Network(format!(
                "auth returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        if body.get("payment_method_id").is_none_or(Value::is_null) {
            return Err(ApiError::NoPaymentInfo);
        }

        Ok(AuthSession {
            account_id: int_field(&body, "id")?,
            first_name: str_field(&body, "first_name")?.to_string(),
            last_name: str_field(&body, "last_name")?.to_string(),
            mobile: str_field(&body, "mobile_number")?.to_string(),
            email: str_field(&body, "em_address")?.to_string(),
            payment_method_id: int_field(&body, "payment_method_id")?,
            token: str_field(&body, "token")?.to_string(),
        })
    }

    async fn reserve(
        &self,
        session: &AuthSession,
        request: &ReserveRequest,
    ) -> Result<Reservation, ApiError> {
        let first = request
            .reservation_times
            .first()
            .ok_or(ApiError::NoTable)?;
        let day = first.format("%Y-%-m-%-d").to_string();

        let response = self
            .http
            .get(format!("{BASE_URL}/4/find"))
            .query(&[
                ("day", day.as_str()),
                ("x-resy-auth-token", session.token.as_str()),
                ("lat", "0"),
                ("long", "0"),
                ("venue_id", &request.venue_id.to_string()),
                ("party_size", &request.party_size.to_string()),
            ])
            .header("Authorization", self.auth_header())
            .header("X-Resy-Auth-Token", &session.token)
            .header("X-Resy-Universal-Auth-Token", &session.token)
            .header("Referer", "https://resy.com/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Network(format!(
                "find returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let venues = array_field(field(&body, "results")?, "venues")?;
        let venue = venues.first().ok_or(ApiError::StaleOffer)?;
        let slots = array_field(venue, "slots")?;

        for candidate in &request.reservation_times {
            for slot in slots {
                let start = str_field(field(slot, "date")?, "start")?;
                if !slot_matches(start, candidate) {
                    continue;
                }
                let config_token = str_field(field(slot, "config")?, "token")?;
                if self.book_slot(session, &day, request, config_token).await? {
                    return Ok(Reservation {
                        reserved_at: *candidate,
                    });
                }
            }
        }

        // Every candidate instant struck out
        tracing::debug!(venue_id = request.venue_id, "no slot matched any candidate instant");
        Err(ApiError::NoTable)
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResults, ApiError> {
        let response = self
            .http
            .post(format!("{BASE_URL}/3/venuesearch/search"))
            .json(&serde_json::json!({ "query": query.query }))
            .header("Authorization", self.auth_header())
            .header("Origin", "https://resy.com")
            .header("Referer", "https://resy.com/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Network(format!(
                "search returned {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;
        let raw_hits = array_field(field(&body, "search")?, "hits")?;
        let limit = match query.limit {
            Some(limit) if limit > 0 => limit.min(raw_hits.len()),
            _ => raw_hits.len(),
        };

        let mut hits = Vec::with_capacity(limit);
        for hit in &raw_hits[..limit] {
            let venue_id = str_field(hit, "objectID")?
                .parse::<i64>()
                .map_err(|e| ApiError::Malformed(format!("objectID: {e}")))?;
            hits.push(SearchHit {
                venue_id,
                name: str_field(hit, "name")?.to_string(),
                region: str_field(hit, "region")?.to_string(),
                locality: str_field(hit, "locality")?.to_string(),
                neighborhood: str_field(hit, "neighborhood")?.to_string(),
            });
        }

        Ok(SearchResults { hits })
    }

    fn auth_min_validity(&self) -> Duration {
        // Resy sessions are guaranteed valid for at least 6 days
        Duration::from_secs(6 * 24 * 60 * 60)
    }
}

/// Whether a slot's start string ("YYYY-MM-DD HH:MM:SS") lands on the
/// candidate's hour and minute
fn slot_matches(start: &str, candidate: &DateTime<Utc>) -> bool {
    let Some(time) = start.split(' ').nth(1) else {
        return false;
    };
    let mut parts = time.split(':');
    let (Some(hour), Some(minute)) = (parts.next(), parts.next()) else {
        return false;
    };
    let (Ok(hour), Ok(minute)) = (hour.parse::<u32>(), minute.parse::<u32>()) else {
        return false;
    };
    hour == candidate.hour() && minute == candidate.minute()
}

fn field<'a>(value: &'a Value, key: &str) -> Result<&'a Value, ApiError> {
    value
        .get(key)
        .ok_or_else(|| ApiError::Malformed(format!("missing field: {key}")))
}

fn str_field<'a>(value: &'a Value, key: &str) -> Result<&'a str, ApiError> {
    field(value, key)?
        .as_str()
        .ok_or_else(|| ApiError::Malformed(format!("field is not a string: {key}")))
}

fn int_field(value: &Value, key: &str) -> Result<i64, ApiError> {
    let v = field(value, key)?;
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .ok_or_else(|| ApiError::Malformed(format!("field is not a number: {key}")))
}

fn array_field<'a>(value: &'a Value, key: &str) -> Result<&'a Vec<Value>, ApiError> {
    field(value, key)?
        .as_array()
        .ok_or_else(|| ApiError::Malformed(format!("field is not an array: {key}")))
}
