use std::fmt;

use bytes::Bytes;
use client_logging::{client_debug, client_info};

use crate::preview::PreviewRef;
use crate::view_model::{
    AppViewModel, ErrorBanner, PredictionRow, Screen, ServerView, SubmitControl, TOP_PREDICTIONS,
};
use crate::Effect;

pub type InputId = u64;
pub type SubmissionId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Pending,
    Succeeded,
    Failed,
}

/// The image the user picked, together with its derived preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInput {
    pub id: InputId,
    pub file_name: String,
    pub bytes: Bytes,
    pub preview: PreviewRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedPrediction {
    pub label: String,
    /// Percentage in `0.0..=100.0`.
    pub confidence: f64,
}

/// Classification outcome. `ranked` keeps the server's order.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f64,
    pub ranked: Vec<RankedPrediction>,
    /// Resized image echoed back by the server as a `data:` URL.
    pub processed_image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Transport,
    Timeout,
    HttpStatus(u16),
    Rejected,
    MalformedResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    Validation,
    Transport,
    Server,
}

impl FailureKind {
    pub fn category(&self) -> FailureCategory {
        match self {
            FailureKind::Validation => FailureCategory::Validation,
            FailureKind::Transport | FailureKind::Timeout => FailureCategory::Transport,
            FailureKind::HttpStatus(_) | FailureKind::Rejected | FailureKind::MalformedResponse => {
                FailureCategory::Server
            }
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::Validation => write!(f, "validation error"),
            FailureKind::Transport => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
        }
    }
}

/// User-facing description of a failed operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureInfo {
    pub kind: FailureKind,
    pub message: String,
    /// Likely cause, shown after the message.
    pub hint: Option<String>,
}

impl FailureInfo {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            hint: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Validation, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for FailureInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.hint {
            Some(hint) => write!(f, "{}. {}", self.message, hint),
            None => f.write_str(&self.message),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SubmitRejected {
    #[error("no input selected")]
    NoInput,
    #[error("a submission is already pending")]
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServerHealth {
    #[default]
    Unknown,
    Healthy {
        model_loaded: bool,
    },
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerInfo {
    pub health: ServerHealth,
    pub categories: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    input: Option<SelectedInput>,
    status: SubmissionStatus,
    result: Option<PredictionResult>,
    error: Option<FailureInfo>,
    in_flight: Option<SubmissionId>,
    last_input_id: InputId,
    last_submission_id: SubmissionId,
    server: ServerInfo,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> Option<&SelectedInput> {
        self.input.as_ref()
    }

    pub fn status(&self) -> SubmissionStatus {
        self.status
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&FailureInfo> {
        self.error.as_ref()
    }

    pub fn in_flight(&self) -> Option<SubmissionId> {
        self.in_flight
    }

    pub fn server(&self) -> &ServerInfo {
        &self.server
    }

    /// Returns whether the state changed since the last call, clearing the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Checks the preconditions of a submission without changing anything.
    pub fn check_submit(&self) -> Result<(), SubmitRejected> {
        if self.status == SubmissionStatus::Pending {
            return Err(SubmitRejected::AlreadyPending);
        }
        if self.input.is_none() {
            return Err(SubmitRejected::NoInput);
        }
        Ok(())
    }

    pub(crate) fn select_input(&mut self, file_name: String, bytes: Bytes) {
        self.last_input_id += 1;
        let id = self.last_input_id;
        let preview = PreviewRef::derive(id, &file_name, &bytes);
        client_debug!(
            "Input selected id={} name={} bytes={} format={}",
            id,
            file_name,
            preview.byte_len,
            preview.format
        );
        if let Some(stale) = self.in_flight.take() {
            client_debug!("Submission {} superseded by input {}", stale, id);
        }
        self.input = Some(SelectedInput {
            id,
            file_name,
            bytes,
            preview,
        });
        self.result = None;
        self.error = None;
        self.status = SubmissionStatus::Idle;
        self.mark_dirty();
    }

    /// Moves to `Pending` and returns the request to issue.
    pub(crate) fn begin_submission(&mut self) -> Result<Effect, SubmitRejected> {
        self.check_submit()?;
        let submission_id = self.last_submission_id + 1;
        let input = self.input.as_ref().ok_or(SubmitRejected::NoInput)?;
        let effect = Effect::SubmitImage {
            submission_id,
            file_name: input.file_name.clone(),
            format: input.preview.format,
            bytes: input.bytes.clone(),
        };
        client_info!(
            "Submission {} started for input {} ({} bytes)",
            submission_id,
            input.id,
            input.bytes.len()
        );

        self.last_submission_id = submission_id;
        self.in_flight = Some(submission_id);
        self.status = SubmissionStatus::Pending;
        self.error = None;
        self.result = None;
        self.mark_dirty();
        Ok(effect)
    }

    /// Applies a submission outcome. Returns `false` for stale responses.
    pub(crate) fn settle(
        &mut self,
        submission_id: SubmissionId,
        outcome: Result<PredictionResult, FailureInfo>,
    ) -> bool {
        if self.status != SubmissionStatus::Pending || self.in_flight != Some(submission_id) {
            client_debug!(
                "Discarding stale response for submission {} (in flight: {:?}, status: {:?})",
                submission_id,
                self.in_flight,
                self.status
            );
            return false;
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.error = None;
                self.status = SubmissionStatus::Succeeded;
            }
            Err(info) => {
                self.result = None;
                self.error = Some(info);
                self.status = SubmissionStatus::Failed;
            }
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn reset(&mut self) {
        self.input = None;
        self.result = None;
        self.error = None;
        self.in_flight = None;
        self.status = SubmissionStatus::Idle;
        self.mark_dirty();
    }

    pub(crate) fn set_validation_error(&mut self, reason: SubmitRejected) {
        self.error =
            Some(FailureInfo::validation(reason.to_string()).with_hint("Select an image first"));
        self.mark_dirty();
    }

    pub(crate) fn dismiss_error(&mut self) {
        if self.error.take().is_none() {
            return;
        }
        if self.status == SubmissionStatus::Failed {
            self.status = SubmissionStatus::Idle;
        }
        self.mark_dirty();
    }

    pub(crate) fn set_health(&mut self, health: ServerHealth) {
        if self.server.health != health {
            self.server.health = health;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_categories(&mut self, categories: Vec<String>) {
        self.server.categories = Some(categories);
        self.mark_dirty();
    }

    pub fn view(&self) -> AppViewModel {
        let screen = match (&self.input, self.status, &self.result) {
            (None, _, _) => Screen::UploadPrompt,
            (Some(input), SubmissionStatus::Pending, _) => Screen::Working {
                preview: input.preview.clone(),
                submit: SubmitControl {
                    enabled: false,
                    label: "Analyzing...",
                },
            },
            (Some(input), SubmissionStatus::Succeeded, Some(result)) => Screen::Results {
                preview: input.preview.clone(),
                top: PredictionRow::new(&result.label, result.confidence),
                ranked: result
                    .ranked
                    .iter()
                    .take(TOP_PREDICTIONS)
                    .map(|entry| PredictionRow::new(&entry.label, entry.confidence))
                    .collect(),
                total_classes: result.ranked.len(),
            },
            (Some(input), _, _) => Screen::Ready {
                preview: input.preview.clone(),
                submit: SubmitControl {
                    enabled: true,
                    label: "Classify Image",
                },
            },
        };

        AppViewModel {
            screen,
            status: self.status,
            banner: self.error.as_ref().map(ErrorBanner::from),
            server: ServerView {
                health: self.server.health.clone(),
                category_count: self.server.categories.as_ref().map(Vec::len),
            },
            dirty: self.dirty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FailureCategory, FailureKind};

    #[test]
    fn failure_kinds_fall_into_three_categories() {
        let cases = [
            (FailureKind::Validation, FailureCategory::Validation),
            (FailureKind::Transport, FailureCategory::Transport),
            (FailureKind::Timeout, FailureCategory::Transport),
            (FailureKind::HttpStatus(500), FailureCategory::Server),
            (FailureKind::Rejected, FailureCategory::Server),
            (FailureKind::MalformedResponse, FailureCategory::Server),
        ];
        for (kind, category) in cases {
            assert_eq!(kind.category(), category, "{kind}");
        }
    }
}
