// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error taxonomy for reservation service calls

use thiserror::Error;

/// Errors surfaced by a reservation service implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("no payment info on account")]
    NoPaymentInfo,
    #[error("no tables available matching reservation requests")]
    NoTable,
    #[error("table is not offered on given date")]
    StaleOffer,
    #[error("network error: {0}")]
    Network(String),
    #[error("malformed service response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Malformed(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}
