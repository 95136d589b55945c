use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn};

use crate::classifier::{Classifier, ClassifierSettings, ReqwestClassifier};
use crate::{ClassifyError, EngineEvent, FailureKind, ImageUpload, RequestId};

enum EngineCommand {
    Classify {
        request_id: RequestId,
        upload: ImageUpload,
    },
    CheckHealth,
    LoadCategories,
    Shutdown,
}

/// Runs classifier requests on a background tokio runtime.
///
/// Every command is spawned as its own task; completions come back through
/// `try_recv`/`recv_timeout` in the order they finish. Dropping the handle
/// or calling `shutdown` stops the runtime and abandons anything still in
/// flight.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(settings: ClassifierSettings) -> std::io::Result<Self> {
        Self::with_classifier(Arc::new(ReqwestClassifier::new(settings)))
    }

    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> std::io::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        let worker = thread::Builder::new()
            .name("classify-engine".to_string())
            .spawn(move || {
                while let Ok(command) = cmd_rx.recv() {
                    if matches!(command, EngineCommand::Shutdown) {
                        break;
                    }
                    let classifier = classifier.clone();
                    let event_tx = event_tx.clone();
                    runtime.spawn(async move {
                        handle_command(classifier.as_ref(), command, event_tx).await;
                    });
                }
                client_debug!("Engine worker stopping; shutting down runtime");
                runtime.shutdown_background();
            })?;

        Ok(Self {
            cmd_tx,
            event_rx,
            worker: Some(worker),
        })
    }

    /// Queues one classification. Fails when the worker has stopped, in which
    /// case no completion will ever arrive for `request_id`.
    pub fn classify(
        &self,
        request_id: RequestId,
        upload: ImageUpload,
    ) -> Result<(), ClassifyError> {
        self.cmd_tx
            .send(EngineCommand::Classify { request_id, upload })
            .map_err(|_| {
                ClassifyError::new(FailureKind::Network, "classifier engine is not running")
            })
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    pub fn load_categories(&self) {
        self.send(EngineCommand::LoadCategories);
    }

    /// Stops the worker and waits for it to exit. Later commands are refused.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = self.cmd_tx.send(EngineCommand::Shutdown);
        if worker.join().is_err() {
            client_warn!("Engine worker panicked");
        }
        client_info!("Engine stopped");
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            client_warn!("Engine worker is gone; command dropped");
        }
    }
}

async fn handle_command(
    classifier: &dyn Classifier,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let event = match command {
        EngineCommand::Classify { request_id, upload } => {
            let result = classifier.classify(&upload).await;
            if let Err(err) = &result {
                client_warn!("Request {} failed: {}", request_id, err);
            }
            EngineEvent::Classified { request_id, result }
        }
        EngineCommand::CheckHealth => EngineEvent::HealthChecked(classifier.health().await),
        EngineCommand::LoadCategories => {
            EngineEvent::CategoriesLoaded(classifier.categories().await)
        }
        EngineCommand::Shutdown => return,
    };
    let _ = event_tx.send(event);
}
