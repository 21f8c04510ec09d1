// Hotel API client
// Single point of contact with the remote hotel API: builds endpoints and
// normalizes the `{ success, data, message }` envelope into typed results.

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Method, Url};
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::hotel::{Envelope, HotelId, HotelPatch, HotelRecord};

pub const DEFAULT_BASE_URL: &str = "https://api-hotels-node-3ae790f3666e.herokuapp.com";

const HOTELS_PATH: &str = "/api/hotels";

// Error types for the hotel API client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error: {status_code} - {message}")]
    ApiResponseError { status_code: u16, message: String },

    #[error("{0}")]
    ValidationError(String),

    #[error("Hotel {0} not found")]
    NotFound(HotelId),
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Initialization error: {0}")]
    InitError(String),
}

// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` leaves the transport's default in place.
    pub timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: None,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

/// A request as seen by a [`Transport`]: a method, a path below the base URL
/// and an optional JSON body.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<serde_json::Value>,
}

/// Raw response handed back by a [`Transport`].
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Bytes,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Moves requests to the remote system. Only transport failures are errors
/// here; every received response, whatever its status, is returned as is.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        (**self).send(request).await
    }
}

/// [`Transport`] over HTTP using reqwest.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::ConfigError(format!("{}: {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::ConfigError(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }
        // A trailing slash keeps any path prefix when request paths are joined
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::InitError(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::NetworkError(format!("invalid request path {path}: {e}")))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url(&request.path)?;
        let mut builder = self.client.request(request.method, url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::NetworkError(e.to_string()))?;

        Ok(ApiResponse { status, body })
    }
}

// Hotel API operations consumed by the views and the edit controller
#[async_trait]
pub trait HotelApi: Send + Sync + 'static {
    async fn list(&self) -> Result<Vec<HotelRecord>, ApiError>;

    async fn get(&self, id: HotelId) -> Result<HotelRecord, ApiError>;

    // Only the fields present in the patch are transmitted
    async fn update(&self, id: HotelId, patch: &HotelPatch) -> Result<HotelRecord, ApiError>;

    async fn delete(&self, id: HotelId) -> Result<(), ApiError>;
}

pub struct HotelApiClient<T = HttpTransport> {
    transport: T,
}

impl HotelApiClient<HttpTransport> {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Ok(Self::with_transport(HttpTransport::new(&config)?))
    }
}

impl<T: Transport> HotelApiClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    async fn send(
        &self,
        method: Method,
        path: String,
        body: Option<serde_json::Value>,
    ) -> Result<ApiResponse, ApiError> {
        debug!(%method, %path, "sending hotel API request");
        let response = self
            .transport
            .send(ApiRequest {
                method: method.clone(),
                path: path.clone(),
                body,
            })
            .await
            .map_err(|e| {
                warn!(%method, %path, error = %e, "hotel API request failed");
                e
            })?;
        debug!(%method, %path, status = response.status, "hotel API response");
        Ok(response)
    }
}

fn hotel_path(id: HotelId) -> String {
    format!("{HOTELS_PATH}/{id}")
}

fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<Envelope<T>, ApiError> {
    serde_json::from_slice(&response.body).map_err(|e| ApiError::ApiResponseError {
        status_code: response.status,
        message: format!("Invalid response body: {e}"),
    })
}

#[derive(Deserialize)]
struct Rejection {
    message: Option<String>,
}

// Message carried by a rejected response, if the body has one
fn rejection_message(response: &ApiResponse) -> Option<String> {
    serde_json::from_slice::<Rejection>(&response.body)
        .ok()
        .and_then(|rejection| rejection.message)
        .filter(|message| !message.trim().is_empty())
}

fn status_error(response: &ApiResponse) -> ApiError {
    let message = rejection_message(response).unwrap_or_else(|| {
        reqwest::StatusCode::from_u16(response.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unexpected status")
            .to_string()
    });
    ApiError::ApiResponseError {
        status_code: response.status,
        message,
    }
}

// Ensures a 2xx status and a decodable envelope
fn into_envelope<T: DeserializeOwned>(
    response: ApiResponse,
) -> Result<(u16, Envelope<T>), ApiError> {
    if !response.is_success() {
        return Err(status_error(&response));
    }
    Ok((response.status, decode(&response)?))
}

// `success: false` is a failure even when the status says otherwise
fn envelope_data<T>(status_code: u16, envelope: Envelope<T>) -> Result<T, ApiError> {
    if !envelope.success {
        return Err(ApiError::ApiResponseError {
            status_code,
            message: envelope
                .message
                .unwrap_or_else(|| "Request was not successful".to_string()),
        });
    }
    envelope.data.ok_or_else(|| ApiError::ApiResponseError {
        status_code,
        message: "Response contained no data".to_string(),
    })
}

fn into_data<T: DeserializeOwned>(response: ApiResponse) -> Result<T, ApiError> {
    let (status_code, envelope) = into_envelope(response)?;
    envelope_data(status_code, envelope)
}

fn log_failure<T>(operation: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
    if let Err(e) = &result {
        warn!(operation, error = %e, "hotel API call rejected");
    }
    result
}

#[async_trait]
impl<T: Transport> HotelApi for HotelApiClient<T> {
    async fn list(&self) -> Result<Vec<HotelRecord>, ApiError> {
        let response = self.send(Method::GET, HOTELS_PATH.to_string(), None).await?;
        log_failure("list", into_data(response))
    }

    async fn get(&self, id: HotelId) -> Result<HotelRecord, ApiError> {
        let response = self.send(Method::GET, hotel_path(id), None).await?;
        if response.status == 404 {
            return log_failure("get", Err(ApiError::NotFound(id)));
        }
        log_failure("get", into_data(response))
    }

    async fn update(&self, id: HotelId, patch: &HotelPatch) -> Result<HotelRecord, ApiError> {
        let body =
            serde_json::to_value(patch).map_err(|e| ApiError::ValidationError(e.to_string()))?;
        let response = self.send(Method::PUT, hotel_path(id), Some(body)).await?;

        let result = if matches!(response.status, 400 | 422) {
            Err(rejection_message(&response)
                .map(ApiError::ValidationError)
                .unwrap_or_else(|| status_error(&response)))
        } else {
            into_envelope::<HotelRecord>(response).and_then(|(status_code, envelope)| {
                match envelope.message {
                    Some(message) if !envelope.success && !message.trim().is_empty() => {
                        Err(ApiError::ValidationError(message))
                    }
                    message => envelope_data(status_code, Envelope { message, ..envelope }),
                }
            })
        };
        log_failure("update", result)
    }

    async fn delete(&self, id: HotelId) -> Result<(), ApiError> {
        let response = self.send(Method::DELETE, hotel_path(id), None).await?;
        if !response.is_success() {
            return log_failure("delete", Err(status_error(&response)));
        }
        // No body is required; only an explicit `success: false` is a failure
        match serde_json::from_slice::<Envelope<IgnoredAny>>(&response.body) {
            Ok(envelope) if !envelope.success => log_failure(
                "delete",
                Err(ApiError::ApiResponseError {
                    status_code: response.status,
                    message: envelope
                        .message
                        .unwrap_or_else(|| "Delete was not successful".to_string()),
                }),
            ),
            _ => Ok(()),
        }
    }
}
