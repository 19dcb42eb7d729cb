// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of CamperDash.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

use thiserror::Error;

/// Failure taxonomy for everything that talks to the telemetry API.
///
/// Every variant is caught at the cache or view boundary and turned into a
/// [`Message`](camper_types::Message) plus an Unknown display state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("Request timed out: {0}")]
    NetworkTimeout(String),

    #[error("Connection failed: {0}")]
    ConnectionFailure(String),

    /// Expected sensor/entity missing, malformed JSON, non-numeric value
    /// where a number was required
    #[error("API contract violation: {0}")]
    ApiContractViolation(String),

    #[error("General failure: {0}")]
    GeneralFailure(String),
}

impl TelemetryError {
    pub fn contract(reason: impl Into<String>) -> Self {
        Self::ApiContractViolation(reason.into())
    }

    /// Short taxonomy name used in user-facing messages
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::NetworkTimeout(_) => "NetworkTimeout",
            Self::ConnectionFailure(_) => "ConnectionFailure",
            Self::ApiContractViolation(_) => "ApiContractViolation",
            Self::GeneralFailure(_) => "GeneralFailure",
        }
    }

    /// True when cached metadata (sensor/entity ids) may be stale
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, Self::ApiContractViolation(_))
    }
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
