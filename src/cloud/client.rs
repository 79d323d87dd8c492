//! Azure Resource Manager HTTP client
//!
//! Thin wrapper over `reqwest` that adds bearer authentication, maps ARM
//! error envelopes to [`AzureError`], and waits for long-running PUT/DELETE
//! operations to reach a terminal state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::credentials::TokenCredential;
use super::error::AzureError;
use super::types::{ArmErrorResponse, OperationStatus, NETWORK_API_VERSION};

/// Public-cloud ARM endpoint.
pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://management.azure.com";

const AZURE_ASYNC_OPERATION_HEADER: &str = "azure-asyncoperation";
const LOCATION_HEADER: &str = "location";

#[derive(Clone, Debug)]
pub struct ArmSettings {
    pub endpoint: String,
    pub subscription_id: String,
    /// Delay between polls of a long-running operation
    pub poll_interval: Duration,
    /// Upper bound on how long a single long-running operation may take
    pub operation_timeout: Duration,
}

impl Default for ArmSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string(),
            subscription_id: String::new(),
            poll_interval: Duration::from_secs(5),
            operation_timeout: Duration::from_secs(30 * 60),
        }
    }
}

enum PollTarget {
    AsyncOperation(String),
    Location(String),
}

#[derive(Clone)]
pub struct ArmClient {
    http: Client,
    credential: Arc<dyn TokenCredential>,
    settings: ArmSettings,
}

impl ArmClient {
    pub fn new(http: Client, credential: Arc<dyn TokenCredential>, settings: ArmSettings) -> Self {
        Self {
            http,
            credential,
            settings,
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.settings.subscription_id
    }

    /// URL of a `Microsoft.Network` resource, e.g. `bastionHosts/b1`.
    pub fn network_resource_url(&self, resource_group: &str, resource_path: &str) -> String {
        format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.Network/{}?api-version={}",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.subscription_id,
            resource_group,
            resource_path,
            NETWORK_API_VERSION
        )
    }

    pub async fn get_resource<T: DeserializeOwned>(&self, url: &str) -> Result<T, AzureError> {
        let response = self.authorized(Method::GET, url).await?.send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// PUT a resource and wait for the operation to finish.
    pub async fn put_resource<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<(), AzureError> {
        let response = self
            .authorized(Method::PUT, url)
            .await?
            .json(body)
            .send()
            .await?;
        let response = check_status(response).await?;
        self.wait_for_completion(response).await
    }

    /// DELETE a resource and wait for the operation to finish.
    ///
    /// A 404 surfaces as an [`AzureError::ApiError`] so callers can decide
    /// whether absence is acceptable.
    pub async fn delete_resource(&self, url: &str) -> Result<(), AzureError> {
        let response = self.authorized(Method::DELETE, url).await?.send().await?;
        let response = check_status(response).await?;
        self.wait_for_completion(response).await
    }

    async fn authorized(&self, method: Method, url: &str) -> Result<RequestBuilder, AzureError> {
        let token = self.credential.get_token().await?;
        debug!(%method, url, "Sending ARM request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    async fn wait_for_completion(&self, response: Response) -> Result<(), AzureError> {
        let async_operation = header_value(&response, AZURE_ASYNC_OPERATION_HEADER);
        let location = header_value(&response, LOCATION_HEADER);
        let accepted = response.status() == StatusCode::ACCEPTED;

        let target = match (async_operation, location) {
            (Some(url), _) => PollTarget::AsyncOperation(url),
            (None, Some(url)) if accepted => PollTarget::Location(url),
            _ => return Ok(()),
        };

        let deadline = Instant::now() + self.settings.operation_timeout;
        loop {
            if Instant::now() >= deadline {
                return Err(AzureError::Timeout(self.settings.operation_timeout));
            }
            tokio::time::sleep(self.settings.poll_interval).await;

            match &target {
                PollTarget::AsyncOperation(url) => {
                    let operation: OperationStatus = self.get_resource(url).await?;
                    match operation.status.as_str() {
                        "Succeeded" => return Ok(()),
                        "Failed" | "Canceled" => {
                            let message = operation
                                .error
                                .map(|e| format!("{}: {}", e.code, e.message))
                                .unwrap_or_default();
                            return Err(AzureError::OperationFailed {
                                status: operation.status.clone(),
                                message,
                            });
                        }
                        status => debug!(status, "Operation still in progress"),
                    }
                }
                PollTarget::Location(url) => {
                    let response = self.authorized(Method::GET, url).await?.send().await?;
                    if response.status() != StatusCode::ACCEPTED {
                        check_status(response).await?;
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn header_value(response: &Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Turn a non-success response into an [`AzureError::ApiError`].
async fn check_status(response: Response) -> Result<Response, AzureError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = serde_json::from_slice::<ArmErrorResponse>(&body)
        .ok()
        .and_then(|r| r.error)
        .unwrap_or_default();
    let message = if detail.message.is_empty() {
        String::from_utf8_lossy(&body).into_owned()
    } else {
        detail.message
    };

    Err(AzureError::api(status.as_u16(), detail.code, message))
}
