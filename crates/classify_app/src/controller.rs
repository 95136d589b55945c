//! Session controller: owns the state, runs effects, and publishes view snapshots.

use std::path::Path;
use std::sync::mpsc;
use std::time::Duration;

use bytes::Bytes;
use classify_core::{update, AppState, AppViewModel, Effect, Msg, SubmissionId, SubmitRejected};
use classify_engine::EngineHandle;
use client_logging::client_debug;

use crate::effects::EffectRunner;

/// Receives a fresh snapshot whenever the state changes.
pub trait ViewSink {
    fn publish(&self, view: &AppViewModel);
}

pub struct ChannelViewSink {
    tx: mpsc::Sender<AppViewModel>,
}

impl ChannelViewSink {
    pub fn new(tx: mpsc::Sender<AppViewModel>) -> Self {
        Self { tx }
    }
}

impl ViewSink for ChannelViewSink {
    fn publish(&self, view: &AppViewModel) {
        let _ = self.tx.send(view.clone());
    }
}

/// One controller per session. All mutations go through `update`.
pub struct Controller {
    state: AppState,
    runner: EffectRunner,
    sinks: Vec<Box<dyn ViewSink>>,
}

impl Controller {
    /// `endpoint` is only used to explain transport failures.
    pub fn new(engine: EngineHandle, endpoint: impl Into<String>) -> Self {
        Self {
            state: AppState::new(),
            runner: EffectRunner::new(engine, endpoint.into()),
            sinks: Vec::new(),
        }
    }

    /// Registers `sink` and immediately sends it the current snapshot.
    pub fn subscribe(&mut self, sink: Box<dyn ViewSink>) {
        sink.publish(&self.state.view());
        self.sinks.push(sink);
    }

    pub fn snapshot(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn start(&mut self) {
        self.dispatch(Msg::Startup);
    }

    pub fn select_input(&mut self, file_name: impl Into<String>, bytes: impl Into<Bytes>) {
        self.dispatch(Msg::InputSelected {
            file_name: file_name.into(),
            bytes: bytes.into(),
        });
    }

    /// Reads `path` and selects it. Read failures leave the state untouched.
    pub fn select_file(&mut self, path: &Path) -> std::io::Result<()> {
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.select_input(file_name, bytes);
        Ok(())
    }

    /// Starts a submission. A rejected submit still surfaces in the state
    /// (validation banner) but issues no request.
    pub fn submit(&mut self) -> Result<SubmissionId, SubmitRejected> {
        let precondition = self.state.check_submit();
        let effects = self.apply(Msg::SubmitClicked);
        let submission = self.state.in_flight();
        self.run(effects);
        precondition?;
        submission.ok_or(SubmitRejected::NoInput)
    }

    pub fn reset(&mut self) {
        self.dispatch(Msg::ResetClicked);
    }

    pub fn dismiss_error(&mut self) {
        self.dispatch(Msg::ErrorDismissed);
    }

    pub fn request_health(&mut self) {
        self.dispatch(Msg::HealthRequested);
    }

    pub fn request_categories(&mut self) {
        self.dispatch(Msg::CategoriesRequested);
    }

    /// Stops the engine. Submissions made afterwards fail as transport errors.
    pub fn shutdown(&mut self) {
        self.runner.shutdown();
    }

    /// Applies every engine completion that is already available.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(msg) = self.runner.try_next() {
            self.dispatch(msg);
            applied += 1;
        }
        applied
    }

    /// Waits up to `timeout` for one engine completion, then drains the rest.
    pub fn pump_timeout(&mut self, timeout: Duration) -> usize {
        match self.runner.wait_next(timeout) {
            Some(msg) => {
                self.dispatch(msg);
                1 + self.pump()
            }
            None => 0,
        }
    }

    pub fn dispatch(&mut self, msg: Msg) {
        let effects = self.apply(msg);
        self.run(effects);
    }

    /// Runs `update` and publishes the new snapshot if anything changed.
    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        client_debug!("dispatch {:?}", MsgLabel(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        if was_dirty {
            let view = self.state.view();
            for sink in &self.sinks {
                sink.publish(&view);
            }
        }
        effects
    }

    fn run(&mut self, effects: Vec<Effect>) {
        for msg in self.runner.enqueue(effects) {
            self.dispatch(msg);
        }
    }
}

/// Debug label that leaves image payloads out of the log.
struct MsgLabel<'a>(&'a Msg);

impl std::fmt::Debug for MsgLabel<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Msg::InputSelected { file_name, bytes } => {
                write!(f, "InputSelected({file_name}, {} bytes)", bytes.len())
            }
            Msg::SubmissionSettled {
                submission_id,
                outcome,
            } => write!(
                f,
                "SubmissionSettled({submission_id}, {})",
                if outcome.is_ok() { "ok" } else { "failed" }
            ),
            Msg::CategoriesLoaded(categories) => {
                write!(f, "CategoriesLoaded({} categories)", categories.len())
            }
            other => write!(f, "{other:?}"),
        }
    }
}
