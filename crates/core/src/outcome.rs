// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Terminal outcomes of a reservation attempt
//!
//! Both strategies resolve to the same tagged result, so the registry's
//! reporting stays total over it without knowing which strategy ran.

use chrono::{DateTime, Utc};
use resv_api::ApiError;
use thiserror::Error;

/// A successful reservation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reserved {
    reserved_at: DateTime<Utc>,
}

impl Reserved {
    pub fn new(reserved_at: DateTime<Utc>) -> Self {
        Self { reserved_at }
    }

    /// The reservation instant the attempt achieved
    pub fn reserved_at(&self) -> DateTime<Utc> {
        self.reserved_at
    }
}

/// The single value a background task reports when it terminates
pub type Outcome = Result<Reserved, OperationError>;

/// Why a reservation attempt terminated without a reservation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    /// Collaborator failure, surfaced verbatim
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("candidate time list is empty")]
    NoCandidateTimes,
    #[error("latest candidate time has passed")]
    PastDeadline,
    #[error("requested fire time has passed")]
    FireTimePassed,
    #[error("operation cancelled")]
    Cancelled,
    #[error("operation task stopped without reporting a result")]
    Aborted,
}
