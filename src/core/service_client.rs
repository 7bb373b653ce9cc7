// src/core/service_client.rs
//! HTTP client for the resume processing endpoint

use reqwest::header::{HeaderValue, CONTENT_TYPE};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::ServiceConfig;
use crate::error::{FormatterError, FormatterResult};
use crate::types::response::{RawResponse, ResumeSubmission};

pub struct ServiceClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl ServiceClient {
    /// Build a client; refuses to start without an endpoint
    pub fn new(config: &ServiceConfig) -> FormatterResult<Self> {
        let endpoint = config
            .endpoint
            .clone()
            .ok_or(FormatterError::MissingConfiguration("API endpoint"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST the encoded resume. Any HTTP status is returned as-is; only
    /// transport failures are errors here.
    pub async fn submit_resume(
        &self,
        filename: &str,
        encoded: &str,
    ) -> FormatterResult<RawResponse> {
        let payload = ResumeSubmission {
            resume_filename: filename,
            resume_base64_encoded: encoded,
        };

        info!("Calling resume processing service: {}", self.endpoint);
        debug!("Submitting {} ({} base64 chars)", filename, encoded.len());

        let mut request = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .json(&payload);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            error!("Request to {} failed: {}", self.endpoint, e);
            FormatterError::Network(e)
        })?;

        let status = response.status().as_u16();
        debug!("Response status: {}", status);

        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}
