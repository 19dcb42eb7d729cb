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

use std::time::Duration;

use camper_types::{Entity, EntityId, RawState, Sensor, SensorId, StateReading, StateSample};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info, warn};

use crate::errors::{ApiError, ApiResult};
use crate::types::{ActionRequest, ActionResponse};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(3);

/// Camper telemetry REST API client
#[derive(Debug, Clone)]
pub struct TelemetryClient {
    base_url: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl TelemetryClient {
    /// Create a client; every request is bounded by `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ApiResult<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            return Err(ApiError::ConfigError("API base URL is empty".to_owned()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url,
            client,
            max_retries: 1,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /sensors`
    pub async fn list_sensors(&self) -> ApiResult<Vec<Sensor>> {
        let url = format!("{}/sensors", self.base_url);
        debug!("🔍 [API QUERY] Listing sensors");
        let sensors: Vec<Sensor> = self.get_json(&url).await?;
        debug!("✅ [API RESULT] {} sensors", sensors.len());
        Ok(sensors)
    }

    /// `GET /sensors/{id}/entities`
    pub async fn sensor_entities(&self, sensor_id: SensorId) -> ApiResult<Vec<Entity>> {
        let url = format!("{}/sensors/{}/entities", self.base_url, sensor_id);
        debug!("🔍 [API QUERY] Entities of sensor {}", sensor_id);
        self.get_json(&url).await
    }

    /// `GET /sensors/{id}/states`
    pub async fn sensor_states(&self, sensor_id: SensorId) -> ApiResult<Vec<StateReading>> {
        let url = format!("{}/sensors/{}/states", self.base_url, sensor_id);
        debug!("🔍 [API QUERY] States of sensor {}", sensor_id);
        let states: Vec<StateReading> = self.get_json(&url).await?;
        debug!(
            "✅ [API RESULT] Sensor {}: {} entity states",
            sensor_id,
            states.len()
        );
        Ok(states)
    }

    /// `GET /entities/{id}/states?limit=N`
    pub async fn entity_states(
        &self,
        entity_id: EntityId,
        limit: usize,
    ) -> ApiResult<Vec<StateSample>> {
        let url = format!("{}/entities/{}/states", self.base_url, entity_id);
        info!(
            "📊 [API HISTORY] Fetching up to {} samples for entity {}",
            limit, entity_id
        );
        debug!("   URL: {}", url);

        let response = self
            .retry_request(|| async {
                self.client
                    .get(&url)
                    .query(&[("limit", limit)])
                    .send()
                    .await
            })
            .await?;
        let samples: Vec<StateSample> = Self::decode(response, &url).await?;

        info!(
            "✅ [API HISTORY] Entity {}: {} samples",
            entity_id,
            samples.len()
        );
        Ok(samples)
    }

    /// `POST /action/{entity_id}` with `{"state": desired}`
    ///
    /// Returns the state the server adopted, which may differ from `desired`
    /// (e.g. `PENDING`).
    pub async fn post_action(
        &self,
        entity_id: EntityId,
        desired: &RawState,
    ) -> ApiResult<RawState> {
        let url = format!("{}/action/{}", self.base_url, entity_id);
        let body = ActionRequest {
            state: desired.as_str(),
        };
        info!("📞 [API ACTION] Entity {} -> {}", entity_id, desired);
        debug!("   URL: {}", url);

        let response = self
            .retry_request(|| async { self.client.post(&url).json(&body).send().await })
            .await?;
        let result: ActionResponse = Self::decode(response, &url).await?;

        info!("✅ [API ACTION] Entity {} is now {}", entity_id, result.state);
        Ok(result.state)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        debug!("   URL: {}", url);
        let response = self
            .retry_request(|| async { self.client.get(url).send().await })
            .await?;
        Self::decode(response, url).await
    }

    async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> ApiResult<T> {
        match response.status() {
            StatusCode::OK => {
                let body = response.text().await?;
                serde_json::from_str(&body).map_err(|e| {
                    warn!("⚠️ [API ERROR] Malformed response from {}: {}", url, e);
                    ApiError::JsonError(e)
                })
            }
            StatusCode::NOT_FOUND => {
                error!("❌ [API ERROR] Not found: {}", url);
                Err(ApiError::NotFound(url.to_owned()))
            }
            status => {
                let error_text = response.text().await.unwrap_or_default();
                error!("❌ [API ERROR] Status {}: {}", status, error_text);
                Err(ApiError::ApiError {
                    status: status.as_u16(),
                    message: error_text,
                })
            }
        }
    }

    /// Retry a request with exponential backoff on transport errors
    async fn retry_request<F, Fut>(&self, mut request_fn: F) -> ApiResult<Response>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        let mut attempts = 0;
        let mut delay = self.retry_delay;

        loop {
            attempts += 1;
            match request_fn().await {
                Ok(response) => return Ok(response),
                Err(e) if attempts >= self.max_retries => {
                    warn!("Request failed after {} attempts: {}", attempts, e);
                    return Err(ApiError::HttpError(e));
                }
                Err(e) => {
                    warn!(
                        "Request failed (attempt {}/{}): {}. Retrying in {:?}",
                        attempts, self.max_retries, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    /// Set custom retry configuration; `max_retries` counts total attempts
    pub fn with_retry_config(mut self, max_retries: u32, retry_delay: Duration) -> Self {
        self.max_retries = max_retries.max(1);
        self.retry_delay = retry_delay;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client(server: &Server) -> TelemetryClient {
        TelemetryClient::new(server.url(), DEFAULT_TIMEOUT).unwrap()
    }

    #[tokio::test]
    async fn test_list_sensors_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([
                    {
                        "id": 1,
                        "name": "camper",
                        "entities": [
                            {"id": 10, "name": "household_state", "unit": null, "sensor_id": 1},
                            {"id": 16, "name": "household_voltage", "unit": "mV", "sensor_id": 1}
                        ]
                    },
                    {"id": 2, "name": "SmartShunt"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let sensors = client(&server).list_sensors().await.unwrap();

        assert_eq!(sensors.len(), 2);
        assert_eq!(sensors[0].name, "camper");
        assert_eq!(
            sensors[0].entity("household_voltage").unwrap().unit.as_deref(),
            Some("mV")
        );
        assert!(sensors[1].entities.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_base_url_trailing_slash() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors/3/entities")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = TelemetryClient::new(format!("{}/", server.url()), DEFAULT_TIMEOUT).unwrap();
        let entities = client.sensor_entities(SensorId(3)).await.unwrap();

        assert!(entities.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_sensor_states_normalise_wire_values() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors/1/states")
            .with_status(200)
            .with_body(
                json!([
                    {"entity_id": 10, "state": "ON", "extra": "ignored"},
                    {"entity_id": 16, "state": 12650},
                    {"entity_id": 11, "state": false}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let states = client(&server).sensor_states(SensorId(1)).await.unwrap();

        assert_eq!(states[0].state.as_str(), "ON");
        assert_eq!(states[1].state.as_number(), Some(12650.0));
        assert_eq!(states[2].state.as_str(), "false");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_entity_states_sends_limit() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/entities/16/states")
            .match_query(Matcher::UrlEncoded("limit".into(), "10000".into()))
            .with_status(200)
            .with_body(
                json!([
                    {"id": 1, "entity_id": 16, "state": "12500", "created": "2025-03-01T10:00:00"},
                    {"id": 2, "entity_id": 16, "state": "12400", "created": "2025-03-01T10:05:00Z"}
                ])
                .to_string(),
            )
            .create_async()
            .await;

        let samples = client(&server)
            .entity_states(EntityId(16), 10_000)
            .await
            .unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].id, Some(1));
        assert!(samples[0].created < samples[1].created);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_action_returns_server_state() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/action/11")
            .match_body(Matcher::Json(json!({"state": "ON"})))
            .with_status(200)
            .with_body(json!({"state": "PENDING"}).to_string())
            .create_async()
            .await;

        let state = client(&server)
            .post_action(EntityId(11), &RawState::from("ON"))
            .await
            .unwrap();

        assert_eq!(state.as_str(), "PENDING");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_not_found() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors/99/states")
            .with_status(404)
            .create_async()
            .await;

        let result = client(&server).sensor_states(SensorId(99)).await;

        assert!(matches!(result, Err(ApiError::NotFound(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors")
            .with_status(503)
            .with_body("shunt offline")
            .create_async()
            .await;

        let result = client(&server).list_sensors().await;

        match result {
            Err(ApiError::ApiError { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "shunt offline");
            }
            other => panic!("unexpected result: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/sensors")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let result = client(&server).list_sensors().await;

        assert!(matches!(result, Err(ApiError::JsonError(_))));
        mock.assert_async().await;
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let result = TelemetryClient::new("", DEFAULT_TIMEOUT);
        assert!(matches!(result, Err(ApiError::ConfigError(_))));
    }

    #[test]
    fn test_retry_config_keeps_one_attempt() {
        let client = TelemetryClient::new("http://localhost:8000", DEFAULT_TIMEOUT)
            .unwrap()
            .with_retry_config(0, Duration::from_millis(10));
        assert_eq!(client.max_retries, 1);
    }
}
