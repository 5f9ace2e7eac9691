//! Sidebar: about text, validation metrics and model status.

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::application::ModelStatus;
use crate::domain::VALIDATION_METRICS;
use crate::tui::styles::PremiumTheme;

pub const ABOUT_TEXT: &str =
    "This app uses a LightGBM model trained on historical insurance data to predict customer premiums.";

pub fn render_sidebar(f: &mut Frame, area: Rect, status: &ModelStatus) {
    let mut lines = vec![
        Line::from(Span::styled("About", PremiumTheme::subtitle())),
        Line::from(Span::styled(ABOUT_TEXT, PremiumTheme::text_secondary())),
        Line::from(""),
        Line::from(Span::styled(
            "Model Performance (Validation)",
            PremiumTheme::subtitle(),
        )),
        Line::from(vec![
            Span::styled("RMSE: ", PremiumTheme::text_secondary()),
            Span::styled(VALIDATION_METRICS.rmse, PremiumTheme::text()),
        ]),
        Line::from(vec![
            Span::styled("R²: ", PremiumTheme::text_secondary()),
            Span::styled(VALIDATION_METRICS.r_squared, PremiumTheme::text()),
        ]),
        Line::from(""),
        Line::from(Span::styled("Model", PremiumTheme::subtitle())),
    ];

    match &status.description {
        Some(description) if status.loaded => {
            lines.push(Line::from(Span::styled("● Loaded", PremiumTheme::success())));
            lines.push(Line::from(Span::styled(
                description.clone(),
                PremiumTheme::text(),
            )));
            lines.push(Line::from(Span::styled(
                format!("{} input columns", status.columns),
                PremiumTheme::text_secondary(),
            )));
        }
        _ => {
            lines.push(Line::from(Span::styled(
                "○ Not loaded",
                PremiumTheme::warning(),
            )));
        }
    }
    lines.push(Line::from(vec![
        Span::styled("Source: ", PremiumTheme::text_muted()),
        Span::styled(status.location.clone(), PremiumTheme::text_muted()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::styled("[R] ", PremiumTheme::key_hint()),
        Span::styled("Refresh Model", PremiumTheme::key_desc()),
    ]));

    let sidebar = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::LEFT)
            .border_style(PremiumTheme::border()),
    );

    f.render_widget(sidebar, area);
}
