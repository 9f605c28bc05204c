//! HTTP resource source.
//!
//! Fetches `GET {endpoint}/resources/{id}` with basic credentials and a
//! request timeout. There are no retries: any transport error, non-2xx status
//! or undecodable body fails the fetch.

use super::{DataSource, RawData};
use crate::config::Settings;
use crate::error::SourceError;
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

/// Blocking client for the resource API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    endpoint: String,
    username: String,
    password: String,
}

impl ApiClient {
    pub fn new(settings: &Settings) -> Result<Self, SourceError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoint: settings.api_endpoint.trim_end_matches('/').to_string(),
            username: settings.api_username.clone(),
            password: settings.api_password.clone(),
        })
    }

    /// URL of a single resource.
    pub fn resource_url(&self, resource_id: &str) -> String {
        format!("{}/resources/{}", self.endpoint, resource_id)
    }

    /// Fetch a resource and decode its JSON body.
    pub fn get_resource(&self, resource_id: &str) -> Result<Value, SourceError> {
        let url = self.resource_url(resource_id);
        debug!("GET {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                error!("API request failed: {}", e);
                e
            })?;

        Ok(response.json::<Value>()?)
    }
}

/// A [`DataSource`] reading one resource from the API.
#[derive(Debug, Clone)]
pub struct ApiDataSource {
    client: ApiClient,
    resource_id: String,
}

impl ApiDataSource {
    pub fn new(client: ApiClient, resource_id: impl Into<String>) -> Self {
        Self {
            client,
            resource_id: resource_id.into(),
        }
    }

    /// Build the client from settings and bind it to a resource.
    pub fn from_settings(
        settings: &Settings,
        resource_id: impl Into<String>,
    ) -> Result<Self, SourceError> {
        Ok(Self::new(ApiClient::new(settings)?, resource_id))
    }
}

impl DataSource for ApiDataSource {
    fn fetch(&self) -> Result<RawData, SourceError> {
        self.client
            .get_resource(&self.resource_id)
            .map(RawData::Records)
    }

    fn name(&self) -> &str {
        "api"
    }
}
