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

use camper_core::TelemetryError;
use thiserror::Error;

/// Telemetry API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API returned error status {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<ApiError> for TelemetryError {
    fn from(err: ApiError) -> Self {
        let reason = err.to_string();
        match err {
            ApiError::HttpError(e) if e.is_timeout() => Self::NetworkTimeout(reason),
            ApiError::HttpError(e) if e.is_connect() || e.is_request() => {
                Self::ConnectionFailure(reason)
            }
            ApiError::HttpError(e) if e.is_decode() => Self::ApiContractViolation(reason),
            ApiError::NotFound(_) | ApiError::JsonError(_) => Self::ApiContractViolation(reason),
            ApiError::HttpError(_) | ApiError::ApiError { .. } | ApiError::ConfigError(_) => {
                Self::GeneralFailure(reason)
            }
        }
    }
}
