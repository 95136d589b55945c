use client_logging::{client_debug, client_warn};

use crate::{AppState, Effect, Msg, SubmitRejected};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Startup => vec![Effect::CheckHealth, Effect::LoadCategories],
        Msg::InputSelected { file_name, bytes } => {
            state.select_input(file_name, bytes);
            Vec::new()
        }
        Msg::SubmitClicked => match state.begin_submission() {
            Ok(effect) => vec![effect],
            Err(SubmitRejected::AlreadyPending) => {
                // Submissions are serialized; the pending one stays authoritative.
                client_debug!("Submit ignored: a submission is already pending");
                Vec::new()
            }
            Err(reason @ SubmitRejected::NoInput) => {
                client_warn!("Submit rejected: {}", reason);
                state.set_validation_error(reason);
                Vec::new()
            }
        },
        Msg::ResetClicked => {
            state.reset();
            Vec::new()
        }
        Msg::ErrorDismissed => {
            state.dismiss_error();
            Vec::new()
        }
        Msg::HealthRequested => vec![Effect::CheckHealth],
        Msg::CategoriesRequested => vec![Effect::LoadCategories],
        Msg::SubmissionSettled {
            submission_id,
            outcome,
        } => {
            state.settle(submission_id, outcome);
            Vec::new()
        }
        Msg::HealthChecked(health) => {
            state.set_health(health);
            Vec::new()
        }
        Msg::CategoriesLoaded(categories) => {
            state.set_categories(categories);
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
