use crate::config::ApiConfig;
use crate::core::{AnalysisResult, ColumnsResponse, DatasetRef, ErrorBody, HealthResponse};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Fallback shown when a column probe fails without a message from the service
pub const PROBE_FALLBACK_MESSAGE: &str = "Failed to read columns";

/// Fallback shown when an analyze call fails without a message from the service
pub const ANALYZE_FALLBACK_MESSAGE: &str = "Failed to analyze";

/// Errors returned by the analysis service client
#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-success status
    #[error("service returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Service {
        status: u16,
        message: Option<String>,
    },

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A success response did not have the expected shape
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The dataset could not be read from disk
    #[error("could not read dataset: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Message for the user: the service's own message when it sent one, else `fallback`
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Service {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// The remote analysis service
///
/// The HTTP client implements this; tests substitute an in-process fake.
pub trait AnalysisService: Send + Sync + 'static {
    /// Read the dataset's header and return its column names
    fn probe_columns(
        &self,
        dataset: &DatasetRef,
    ) -> impl Future<Output = Result<Vec<String>, ApiError>> + Send;

    /// Run the information decomposition for `target`
    fn analyze(
        &self,
        dataset: &DatasetRef,
        target: &str,
    ) -> impl Future<Output = Result<AnalysisResult, ApiError>> + Send;

    /// Service liveness; returns the reported status string
    fn health(&self) -> impl Future<Output = Result<String, ApiError>> + Send;
}

/// HTTP client for the analysis service
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    config: ApiConfig,
}

impl AnalysisClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let mut builder = Client::builder().user_agent(concat!("shapmi/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            http: builder.build()?,
            config,
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn file_part(dataset: &DatasetRef) -> Result<Part, ApiError> {
        let bytes = tokio::fs::read(&dataset.path).await?;
        Ok(Part::bytes(bytes)
            .file_name(dataset.file_name.clone())
            .mime_str(dataset.mime_type())?)
    }

    /// Post a multipart form and decode either the success body or the `{error}` body
    async fn post_form<T: DeserializeOwned>(&self, path: &str, form: Form) -> Result<T, ApiError> {
        let url = self.url(path);
        debug!("POST {url}");
        let response = self.http.post(&url).multipart(form).send().await?;
        decode_response(response.status(), &response.bytes().await?)
    }
}

/// Turn a status and raw body into the typed success value or an `ApiError::Service`
fn decode_response<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> Result<T, ApiError> {
    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.error);
        return Err(ApiError::Service {
            status: status.as_u16(),
            message,
        });
    }
    Ok(serde_json::from_slice(body)?)
}

impl AnalysisService for AnalysisClient {
    async fn probe_columns(&self, dataset: &DatasetRef) -> Result<Vec<String>, ApiError> {
        let form = Form::new().part("file", Self::file_part(dataset).await?);
        let body: ColumnsResponse = self.post_form(&self.config.columns_path, form).await?;
        info!(
            "Probed {} column(s) from {}",
            body.columns.len(),
            dataset.file_name
        );
        Ok(body.columns)
    }

    async fn analyze(&self, dataset: &DatasetRef, target: &str) -> Result<AnalysisResult, ApiError> {
        let form = Form::new()
            .part("file", Self::file_part(dataset).await?)
            .text("target", target.to_string());
        let result: AnalysisResult = self.post_form(&self.config.analyze_path, form).await?;
        info!(
            "Analysis of '{}' returned {} contribution(s)",
            result.target,
            result.contributions.len()
        );
        Ok(result)
    }

    async fn health(&self) -> Result<String, ApiError> {
        let url = self.url(&self.config.health_path);
        debug!("GET {url}");
        let response = self.http.get(&url).send().await?;
        let body: HealthResponse = decode_response(response.status(), &response.bytes().await?)?;
        Ok(body.status)
    }
}
