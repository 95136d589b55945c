use crate::{FailureInfo, FailureKind, PreviewRef, ServerHealth, SubmissionStatus};

/// Number of ranked entries shown below the top prediction.
pub const TOP_PREDICTIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub screen: Screen,
    pub status: SubmissionStatus,
    /// Shown alongside any screen; never blocks resubmission.
    pub banner: Option<ErrorBanner>,
    pub server: ServerView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Screen {
    #[default]
    UploadPrompt,
    Ready {
        preview: PreviewRef,
        submit: SubmitControl,
    },
    Working {
        preview: PreviewRef,
        submit: SubmitControl,
    },
    Results {
        preview: PreviewRef,
        top: PredictionRow,
        ranked: Vec<PredictionRow>,
        total_classes: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub enabled: bool,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRow {
    pub label: String,
    pub confidence: f64,
    /// Bar length as a fraction of the full width, in `0.0..=1.0`.
    pub bar_fraction: f64,
}

impl PredictionRow {
    pub(crate) fn new(label: &str, confidence: f64) -> Self {
        let bar_fraction = if confidence.is_finite() {
            (confidence / 100.0).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            label: label.to_string(),
            confidence,
            bar_fraction,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorBanner {
    pub kind: FailureKind,
    pub message: String,
    pub hint: Option<String>,
}

impl From<&FailureInfo> for ErrorBanner {
    fn from(info: &FailureInfo) -> Self {
        Self {
            kind: info.kind.clone(),
            message: info.message.clone(),
            hint: info.hint.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServerView {
    pub health: ServerHealth,
    pub category_count: Option<usize>,
}
