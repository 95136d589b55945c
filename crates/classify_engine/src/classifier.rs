use std::time::Duration;

use client_logging::{client_debug, client_info};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode, Url};

use crate::wire::{parse_categories, parse_health, parse_prediction};
use crate::{Classification, ClassifyError, FailureKind, HealthReport, ImageUpload};

/// Error bodies are only read for their message.
const ERROR_BODY_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Clone)]
pub struct ClassifierSettings {
    /// Base URL of the server, e.g. `http://localhost:5000`.
    pub endpoint: String,
    pub predict_path: String,
    pub health_path: String,
    pub categories_path: String,
    /// Multipart field carrying the image.
    pub field_name: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:5000".to_string(),
            predict_path: "predict".to_string(),
            health_path: "health".to_string(),
            categories_path: "categories".to_string(),
            field_name: "image".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_response_bytes: 8 * 1024 * 1024,
        }
    }
}

#[async_trait::async_trait]
pub trait Classifier: Send + Sync {
    /// Issues exactly one request; never retries.
    async fn classify(&self, upload: &ImageUpload) -> Result<Classification, ClassifyError>;

    async fn health(&self) -> Result<HealthReport, ClassifyError>;

    async fn categories(&self) -> Result<Vec<String>, ClassifyError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestClassifier {
    settings: ClassifierSettings,
}

impl ReqwestClassifier {
    pub fn new(settings: ClassifierSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, ClassifyError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| ClassifyError::new(FailureKind::Network, err.to_string()))
    }

    fn url_for(&self, path: &str) -> Result<Url, ClassifyError> {
        let mut base = Url::parse(&self.settings.endpoint)
            .map_err(|err| ClassifyError::new(FailureKind::InvalidEndpoint, err.to_string()))?;
        if !base.path().ends_with('/') {
            let with_slash = format!("{}/", base.path());
            base.set_path(&with_slash);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|err| ClassifyError::new(FailureKind::InvalidEndpoint, err.to_string()))
    }

    /// Reads the body of a 2xx response up to `max_response_bytes`. Error
    /// responses are truncated to `ERROR_BODY_LIMIT` instead of rejected so
    /// their status is still reported.
    async fn read_body(&self, response: Response) -> Result<(StatusCode, Vec<u8>), ClassifyError> {
        let status = response.status();
        let max_bytes = self.settings.max_response_bytes;
        if !status.is_success() {
            let limit = ERROR_BODY_LIMIT.min(max_bytes);
            return Ok((status, read_truncated(response, limit).await));
        }
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = body.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            body.extend_from_slice(&chunk);
        }
        Ok((status, body))
    }

    async fn get(&self, path: &str) -> Result<(StatusCode, Vec<u8>), ClassifyError> {
        let url = self.url_for(path)?;
        let client = self.build_client()?;
        client_debug!("GET {}", url);
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        self.read_body(response).await
    }
}

#[async_trait::async_trait]
impl Classifier for ReqwestClassifier {
    async fn classify(&self, upload: &ImageUpload) -> Result<Classification, ClassifyError> {
        let url = self.url_for(&self.settings.predict_path)?;
        let client = self.build_client()?;

        let part = Part::bytes(upload.bytes.to_vec())
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime_type)
            .map_err(|err| ClassifyError::new(FailureKind::Network, err.to_string()))?;
        let form = Form::new().part(self.settings.field_name.clone(), part);

        client_info!(
            "POST {} file={} bytes={}",
            url,
            upload.file_name,
            upload.bytes.len()
        );
        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let (status, body) = self.read_body(response).await?;
        client_debug!("Predict response status={} bytes={}", status, body.len());
        parse_prediction(status, &body)
    }

    async fn health(&self) -> Result<HealthReport, ClassifyError> {
        let (status, body) = self.get(&self.settings.health_path).await?;
        parse_health(status, &body)
    }

    async fn categories(&self) -> Result<Vec<String>, ClassifyError> {
        let (status, body) = self.get(&self.settings.categories_path).await?;
        parse_categories(status, &body)
    }
}

async fn read_truncated(response: Response, limit: u64) -> Vec<u8> {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(Ok(chunk)) = stream.next().await {
        let room = limit.saturating_sub(body.len() as u64) as usize;
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() as u64 >= limit {
            break;
        }
    }
    body
}

fn too_large(max_bytes: u64, actual: u64) -> ClassifyError {
    ClassifyError::new(
        FailureKind::TooLarge { max_bytes, actual },
        format!("{actual} bytes exceeds the {max_bytes} byte limit"),
    )
}

fn map_reqwest_error(err: reqwest::Error) -> ClassifyError {
    if err.is_timeout() {
        return ClassifyError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ClassifyError::new(FailureKind::MalformedResponse, err.to_string());
    }
    ClassifyError::new(FailureKind::Network, error_chain(&err))
}

/// `reqwest::Error`'s Display hides the underlying cause (e.g. "connection refused").
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::{ClassifierSettings, ReqwestClassifier};
    use crate::FailureKind;

    fn classifier(endpoint: &str) -> ReqwestClassifier {
        ReqwestClassifier::new(ClassifierSettings {
            endpoint: endpoint.to_string(),
            ..ClassifierSettings::default()
        })
    }

    #[test]
    fn joins_paths_onto_endpoint() {
        let url = classifier("http://localhost:5000").url_for("predict").unwrap();
        assert_eq!(url.as_str(), "http://localhost:5000/predict");

        let url = classifier("http://host/api").url_for("/health").unwrap();
        assert_eq!(url.as_str(), "http://host/api/health");

        let url = classifier("http://host/api/").url_for("categories").unwrap();
        assert_eq!(url.as_str(), "http://host/api/categories");
    }

    #[test]
    fn too_large_message_names_both_sizes() {
        let err = super::too_large(8, 9_000_000);
        assert_eq!(
            err.to_string(),
            "response too large: 9000000 bytes exceeds the 8 byte limit"
        );
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = classifier("not a url").url_for("predict").unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidEndpoint);
    }
}
