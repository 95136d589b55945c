use classify_core::{
    AppViewModel, ErrorBanner, PredictionRow, PreviewRef, Screen, ServerHealth, ServerView,
    SubmitControl,
};

pub const TITLE: &str = "Fruit & Vegetable Classifier";
pub const BAR_WIDTH: usize = 30;

/// Projects a snapshot onto terminal lines.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = vec![format!("== {TITLE} =="), server_line(&view.server)];

    match &view.screen {
        Screen::UploadPrompt => {
            lines.push("No image selected.".to_string());
            lines.push("Use `select <path>` to upload an image (PNG, JPG, JPEG).".to_string());
        }
        Screen::Ready { preview, submit } | Screen::Working { preview, submit } => {
            lines.push(preview_line(preview));
            lines.push(submit_line(submit));
            lines.push("Clear Image: `reset`".to_string());
        }
        Screen::Results {
            preview,
            top,
            ranked,
            total_classes,
        } => {
            lines.push(preview_line(preview));
            lines.push(format!(
                "Prediction Result: {}  {:.2}%",
                capitalize(&top.label),
                top.confidence
            ));
            lines.push(format!("Top {} Predictions (of {}):", ranked.len(), total_classes));
            let label_width = ranked
                .iter()
                .map(|row| row.label.chars().count())
                .max()
                .unwrap_or(0);
            lines.extend(ranked.iter().map(|row| ranked_line(row, label_width)));
            lines.push("[ Classify Another Image ]  (`reset`)".to_string());
        }
    }

    if let Some(banner) = &view.banner {
        lines.push(banner_line(banner));
    }

    lines
}

fn server_line(server: &ServerView) -> String {
    let health = match &server.health {
        ServerHealth::Unknown => "checking...".to_string(),
        ServerHealth::Healthy { model_loaded: true } => "healthy".to_string(),
        ServerHealth::Healthy {
            model_loaded: false,
        } => "up, model not loaded".to_string(),
        ServerHealth::Unreachable(reason) => format!("unreachable ({reason})"),
    };
    match server.category_count {
        Some(count) => format!("Server: {health} | {count} categories"),
        None => format!("Server: {health}"),
    }
}

fn preview_line(preview: &PreviewRef) -> String {
    format!(
        "Image: {} ({}, {} bytes)",
        preview.file_name,
        preview.format,
        format_with_commas(preview.byte_len as u64)
    )
}

fn submit_line(submit: &SubmitControl) -> String {
    if submit.enabled {
        format!("[ {} ]  (`submit`)", submit.label)
    } else {
        format!("[ {} ]  (disabled)", submit.label)
    }
}

fn ranked_line(row: &PredictionRow, label_width: usize) -> String {
    format!(
        "  {:<width$}  {:>5.1}%  {}",
        capitalize(&row.label),
        row.confidence,
        bar(row.bar_fraction),
        width = label_width
    )
}

fn banner_line(banner: &ErrorBanner) -> String {
    match &banner.hint {
        Some(hint) => format!("Error: {}. {}  (`dismiss`)", banner.message, hint),
        None => format!("Error: {}  (`dismiss`)", banner.message),
    }
}

pub fn bar(fraction: f64) -> String {
    let filled = (fraction.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    let mut out = String::with_capacity(BAR_WIDTH * 3);
    out.extend(std::iter::repeat('#').take(filled));
    out.extend(std::iter::repeat('.').take(BAR_WIDTH - filled));
    out
}

fn capitalize(label: &str) -> String {
    label
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}
