//! Classifier client core: pure interaction state machine and view-model helpers.
mod effect;
mod msg;
mod preview;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use preview::{ImageFormat, PreviewRef};
pub use state::{
    AppState, FailureCategory, FailureInfo, FailureKind, InputId, PredictionResult,
    RankedPrediction, SelectedInput, ServerHealth, ServerInfo, SubmissionId, SubmissionStatus,
    SubmitRejected,
};
pub use update::update;
pub use view_model::{
    AppViewModel, ErrorBanner, PredictionRow, Screen, ServerView, SubmitControl, TOP_PREDICTIONS,
};
