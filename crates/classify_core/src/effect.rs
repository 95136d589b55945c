use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    SubmitImage {
        submission_id: crate::SubmissionId,
        file_name: String,
        format: crate::ImageFormat,
        bytes: Bytes,
    },
    CheckHealth,
    LoadCategories,
}
