use std::time::Duration;

use classify_core::{
    Effect, FailureCategory, FailureInfo, FailureKind, Msg, PredictionResult, RankedPrediction, ServerHealth,
};
use classify_engine::{Classification, ClassifyError, EngineEvent, EngineHandle, ImageUpload};
use client_logging::{client_debug, client_info, client_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub(crate) struct EffectRunner {
    engine: EngineHandle,
    endpoint: String,
}

impl EffectRunner {
    pub(crate) fn new(engine: EngineHandle, endpoint: String) -> Self {
        Self { engine, endpoint }
    }

    /// Hands `effects` to the engine. Returns the messages for effects that
    /// settled immediately because the engine refused them.
    pub(crate) fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        let mut settled = Vec::new();
        for effect in effects {
            match effect {
                Effect::SubmitImage {
                    submission_id,
                    file_name,
                    format,
                    bytes,
                } => {
                    client_info!(
                        "SubmitImage submission_id={} file={} format={} bytes={}",
                        submission_id,
                        file_name,
                        format,
                        bytes.len()
                    );
                    let upload = ImageUpload {
                        file_name,
                        mime_type: format.mime_type().to_string(),
                        bytes,
                    };
                    if let Err(err) = self.engine.classify(submission_id, upload) {
                        client_warn!("Submission {} not sent: {}", submission_id, err);
                        settled.push(Msg::SubmissionSettled {
                            submission_id,
                            outcome: Err(self.map_failure(err)),
                        });
                    }
                }
                Effect::CheckHealth => self.engine.check_health(),
                Effect::LoadCategories => self.engine.load_categories(),
            }
        }
        settled
    }

    pub(crate) fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    pub(crate) fn try_next(&self) -> Option<Msg> {
        self.engine.try_recv().map(|event| self.to_msg(event))
    }

    pub(crate) fn wait_next(&self, timeout: Duration) -> Option<Msg> {
        self.engine
            .recv_timeout(timeout)
            .map(|event| self.to_msg(event))
    }

    fn to_msg(&self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::Classified { request_id, result } => Msg::SubmissionSettled {
                submission_id: request_id,
                outcome: result
                    .map(map_classification)
                    .map_err(|err| self.map_failure(err)),
            },
            EngineEvent::HealthChecked(Ok(report)) => {
                client_debug!("Health: {} model_loaded={}", report.status, report.model_loaded);
                Msg::HealthChecked(ServerHealth::Healthy {
                    model_loaded: report.model_loaded,
                })
            }
            EngineEvent::HealthChecked(Err(err)) => {
                client_warn!("Health check against {} failed: {}", self.endpoint, err);
                Msg::HealthChecked(ServerHealth::Unreachable(err.to_string()))
            }
            EngineEvent::CategoriesLoaded(Ok(categories)) => Msg::CategoriesLoaded(categories),
            EngineEvent::CategoriesLoaded(Err(err)) => {
                client_warn!("Loading categories failed: {}", err);
                Msg::NoOp
            }
        }
    }

    fn map_failure(&self, err: ClassifyError) -> FailureInfo {
        let kind = map_failure_kind(&err.kind);
        let needs_hint = kind.category() == FailureCategory::Transport
            || matches!(kind, FailureKind::HttpStatus(_));
        let info = FailureInfo::new(kind, err.to_string());
        if needs_hint {
            info.with_hint(format!(
                "Make sure the classification server is running at {}",
                self.endpoint
            ))
        } else {
            info
        }
    }
}

fn map_classification(classification: Classification) -> PredictionResult {
    PredictionResult {
        label: classification.prediction,
        confidence: classification.confidence,
        ranked: classification
            .ranked
            .into_iter()
            .map(|score| RankedPrediction {
                label: score.label,
                confidence: score.confidence,
            })
            .collect(),
        processed_image: classification.processed_image,
    }
}

fn map_failure_kind(kind: &classify_engine::FailureKind) -> FailureKind {
    match kind {
        classify_engine::FailureKind::InvalidEndpoint | classify_engine::FailureKind::Network => {
            FailureKind::Transport
        }
        classify_engine::FailureKind::Timeout => FailureKind::Timeout,
        classify_engine::FailureKind::HttpStatus(code) => FailureKind::HttpStatus(*code),
        classify_engine::FailureKind::Rejected => FailureKind::Rejected,
        classify_engine::FailureKind::MalformedResponse
        | classify_engine::FailureKind::TooLarge { .. } => FailureKind::MalformedResponse,
    }
}
