use bytes::Bytes;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Application started; query the server once.
    Startup,
    /// User picked an image.
    InputSelected { file_name: String, bytes: Bytes },
    /// User asked to classify the selected image.
    SubmitClicked,
    /// User cleared the selection ("Clear Image" / "Classify another image").
    ResetClicked,
    /// User closed the error banner.
    ErrorDismissed,
    /// User asked for a fresh health check.
    HealthRequested,
    /// User asked for the category listing again.
    CategoriesRequested,
    /// Engine completion for a submission.
    SubmissionSettled {
        submission_id: crate::SubmissionId,
        outcome: Result<crate::PredictionResult, crate::FailureInfo>,
    },
    /// Engine completion for a health check.
    HealthChecked(crate::ServerHealth),
    /// Engine completion for the category listing.
    CategoriesLoaded(Vec<String>),
    /// Fallback for placeholder wiring.
    NoOp,
}
