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

use camper_types::RawState;
use serde::{Deserialize, Serialize};

/// Body of `POST /action/{entity_id}`
#[derive(Debug, Clone, Serialize)]
pub struct ActionRequest<'a> {
    pub state: &'a str,
}

/// Response of `POST /action/{entity_id}`; the state the server adopted
#[derive(Debug, Clone, Deserialize)]
pub struct ActionResponse {
    pub state: RawState,
}
