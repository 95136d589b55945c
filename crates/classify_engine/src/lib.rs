//! Classifier engine: HTTP boundary to the classification server and effect execution.
mod classifier;
mod engine;
mod types;
mod wire;

pub use classifier::{Classifier, ClassifierSettings, ReqwestClassifier};
pub use engine::EngineHandle;
pub use types::{
    ClassScore, Classification, ClassifyError, EngineEvent, FailureKind, HealthReport,
    ImageUpload, RequestId,
};
