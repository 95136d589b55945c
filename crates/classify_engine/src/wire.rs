//! JSON contract of the classification server.

use reqwest::StatusCode;
use serde::Deserialize;

use crate::{ClassScore, Classification, ClassifyError, FailureKind, HealthReport};

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    success: Option<bool>,
    prediction: Option<String>,
    confidence: Option<f64>,
    #[serde(default)]
    all_predictions: Vec<WireScore>,
    image: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireScore {
    #[serde(rename = "class")]
    label: String,
    confidence: f64,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HealthBody {
    status: String,
    #[serde(default)]
    model_loaded: bool,
}

#[derive(Debug, Deserialize)]
struct CategoriesBody {
    categories: Vec<String>,
}

/// Interprets a `/predict` response. Only a 2xx status with `success: true`
/// and both top-level fields present counts as a classification.
pub(crate) fn parse_prediction(
    status: StatusCode,
    body: &[u8],
) -> Result<Classification, ClassifyError> {
    ensure_success_status(status, body)?;

    let response: PredictResponse = serde_json::from_slice(body).map_err(|err| {
        ClassifyError::new(FailureKind::MalformedResponse, format!("invalid JSON: {err}"))
    })?;

    if response.success != Some(true) {
        let message = response
            .error
            .filter(|message| !message.trim().is_empty())
            .unwrap_or_else(|| "server did not report success".to_string());
        return Err(ClassifyError::new(FailureKind::Rejected, message));
    }

    let prediction = response.prediction.ok_or_else(|| missing_field("prediction"))?;
    let confidence = response.confidence.ok_or_else(|| missing_field("confidence"))?;

    Ok(Classification {
        prediction,
        confidence,
        ranked: response
            .all_predictions
            .into_iter()
            .map(|score| ClassScore {
                label: score.label,
                confidence: score.confidence,
            })
            .collect(),
        processed_image: response.image,
    })
}

pub(crate) fn parse_health(status: StatusCode, body: &[u8]) -> Result<HealthReport, ClassifyError> {
    ensure_success_status(status, body)?;
    let health: HealthBody = decode(body)?;
    Ok(HealthReport {
        status: health.status,
        model_loaded: health.model_loaded,
    })
}

pub(crate) fn parse_categories(
    status: StatusCode,
    body: &[u8],
) -> Result<Vec<String>, ClassifyError> {
    ensure_success_status(status, body)?;
    let categories: CategoriesBody = decode(body)?;
    Ok(categories.categories)
}

fn ensure_success_status(status: StatusCode, body: &[u8]) -> Result<(), ClassifyError> {
    if status.is_success() {
        return Ok(());
    }
    // Error responses usually carry `{ "error": ... }`; fall back to the reason phrase.
    let message = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(|body| body.error)
        .filter(|message| !message.trim().is_empty())
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        });
    Err(ClassifyError::new(
        FailureKind::HttpStatus(status.as_u16()),
        message,
    ))
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ClassifyError> {
    serde_json::from_slice(body).map_err(|err| {
        ClassifyError::new(FailureKind::MalformedResponse, format!("invalid JSON: {err}"))
    })
}

fn missing_field(name: &str) -> ClassifyError {
    ClassifyError::new(
        FailureKind::MalformedResponse,
        format!("response is missing `{name}`"),
    )
}
