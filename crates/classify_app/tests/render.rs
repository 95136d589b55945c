use bytes::Bytes;
use classify_app::ui::render::{render, BAR_WIDTH};
use classify_core::{
    update, AppState, FailureInfo, FailureKind, Msg, PredictionResult, RankedPrediction,
    ServerHealth,
};
use pretty_assertions::assert_eq;

fn selected(name: &str) -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::InputSelected {
            file_name: name.to_string(),
            bytes: Bytes::from_static(b"\x89PNG\r\n\x1a\n0123456789"),
        },
    );
    state
}

fn settled(state: AppState, outcome: Result<PredictionResult, FailureInfo>) -> AppState {
    let (state, _) = update(state, Msg::SubmitClicked);
    let submission_id = state.in_flight().expect("pending");
    let (state, _) = update(
        state,
        Msg::SubmissionSettled {
            submission_id,
            outcome,
        },
    );
    state
}

#[test]
fn upload_prompt_when_nothing_selected() {
    let lines = render(&AppState::new().view());
    assert_eq!(lines[0], "== Fruit & Vegetable Classifier ==");
    assert_eq!(lines[1], "Server: checking...");
    assert_eq!(lines[2], "No image selected.");
}

#[test]
fn ready_screen_shows_preview_and_submit() {
    let lines = render(&selected("apple.png").view());
    assert!(lines.contains(&"Image: apple.png (PNG, 18 bytes)".to_string()));
    assert!(lines.contains(&"[ Classify Image ]  (`submit`)".to_string()));
}

#[test]
fn working_screen_disables_submit() {
    let (state, _) = update(selected("apple.png"), Msg::SubmitClicked);
    let lines = render(&state.view());
    assert!(lines.contains(&"[ Analyzing... ]  (disabled)".to_string()));
}

#[test]
fn results_show_top_prediction_and_top_five_bars() {
    let ranked: Vec<_> = [
        ("bell pepper", 50.0),
        ("apple", 25.0),
        ("pear", 10.0),
        ("kiwi", 6.0),
        ("corn", 5.0),
        ("peas", 4.0),
    ]
    .iter()
    .map(|(label, confidence)| RankedPrediction {
        label: label.to_string(),
        confidence: *confidence,
    })
    .collect();
    let state = settled(
        selected("veg.png"),
        Ok(PredictionResult {
            label: "bell pepper".to_string(),
            confidence: 50.0,
            ranked,
            processed_image: None,
        }),
    );
    let (state, _) = update(
        state,
        Msg::HealthChecked(ServerHealth::Healthy { model_loaded: true }),
    );

    let lines = render(&state.view());
    assert_eq!(lines[1], "Server: healthy");
    assert!(lines.contains(&"Prediction Result: Bell Pepper  50.00%".to_string()));
    assert!(lines.contains(&"Top 5 Predictions (of 6):".to_string()));

    let bars: Vec<_> = lines.iter().filter(|line| line.starts_with("  ")).collect();
    assert_eq!(bars.len(), 5);
    assert!(bars[0].starts_with("  Bell Pepper   50.0%"));
    assert!(bars[0].ends_with(&format!("{}{}", "#".repeat(15), ".".repeat(15))));
    assert!(bars[1].contains(&"#".repeat(8)));
    assert!(!lines.iter().any(|line| line.contains("Peas")));
    assert_eq!(lines.last().unwrap(), "[ Classify Another Image ]  (`reset`)");
    assert_eq!(bars[0].chars().count(), bars[4].chars().count());
    assert!(bars[4].ends_with(&".".repeat(BAR_WIDTH - 2)));
}

#[test]
fn failure_shows_banner_with_hint_next_to_submit() {
    let state = settled(
        selected("apple.png"),
        Err(FailureInfo::new(FailureKind::HttpStatus(500), "http status 500: Internal Server Error")
            .with_hint("Make sure the classification server is running at http://localhost:5000")),
    );

    let lines = render(&state.view());
    assert!(lines.contains(&"[ Classify Image ]  (`submit`)".to_string()));
    assert_eq!(
        lines.last().unwrap(),
        "Error: http status 500: Internal Server Error. Make sure the classification server is running at http://localhost:5000  (`dismiss`)"
    );
}
