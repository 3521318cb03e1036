//! Offset oracle reached over HTTP.
//!
//! The request is POSTed as JSON to the configured endpoint; the response body
//! must be an [`OptimizationResponse`]. No retries are attempted.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;

use super::oracle::{OffsetOracle, OptimizationRequest, OptimizationResponse};
use crate::config::OracleSettings;
use crate::core::error::{EngineError, EngineResult};

pub struct HttpOffsetOracle {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpOffsetOracle {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> EngineResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EngineError::OracleError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    /// Build the oracle from the `[oracle]` configuration section.
    pub fn from_settings(settings: &OracleSettings) -> EngineResult<Self> {
        let endpoint = settings.endpoint.clone().ok_or_else(|| {
            EngineError::ConfigurationError("'oracle.endpoint' is not set".to_string())
        })?;
        Self::new(endpoint, settings.timeout())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl OffsetOracle for HttpOffsetOracle {
    async fn optimize(&self, request: &OptimizationRequest) -> EngineResult<OptimizationResponse> {
        debug!(
            "POST {} for corridor {} ({} intersections)",
            self.endpoint,
            request.request_id,
            request.corridor.len()
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| EngineError::OracleError(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<empty response>".to_string());
            return Err(EngineError::OracleError(format!(
                "Oracle answered {}: {}",
                status,
                body.trim()
            )));
        }

        response
            .json::<OptimizationResponse>()
            .await
            .map_err(|e| EngineError::OracleError(format!("Invalid oracle response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings_requires_endpoint() {
        let err = HttpOffsetOracle::from_settings(&OracleSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::ConfigurationError(_)));

        let settings = OracleSettings {
            endpoint: Some("http://localhost:9/optimize".to_string()),
            timeout_secs: 1,
        };
        let oracle = HttpOffsetOracle::from_settings(&settings).unwrap();
        assert_eq!(oracle.endpoint(), "http://localhost:9/optimize");
    }
}
