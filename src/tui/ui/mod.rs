//! UI module: View components for the TUI.

pub mod form;
pub mod result;
pub mod sidebar;

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::tui::styles::PremiumTheme;

pub const PAGE_TITLE: &str = "Insurance Premium Predictor";
pub const PAGE_SUBTITLE: &str = "Predict customer insurance premiums using a trained LightGBM model.";

pub fn render_header(f: &mut Frame, area: Rect) {
    let header = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(" ", PremiumTheme::text()),
            Span::styled(PAGE_TITLE, PremiumTheme::title()),
        ]),
        Line::from(vec![
            Span::styled(" ", PremiumTheme::text()),
            Span::styled(PAGE_SUBTITLE, PremiumTheme::text_secondary()),
        ]),
    ])
    .block(
        Block::default()
            .borders(Borders::BOTTOM)
            .border_style(PremiumTheme::border()),
    );

    f.render_widget(header, area);
}

/// Blocking panel shown while the artifacts cannot be loaded.
pub fn render_load_failure(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled("! Model unavailable", PremiumTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, PremiumTheme::text())),
        Line::from(""),
        Line::from(Span::styled(
            "Restore the model artifacts, then press [R] to retry.",
            PremiumTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(PremiumTheme::danger()),
    );

    f.render_widget(content, area);
}

pub fn render_key_hints(f: &mut Frame, area: Rect, blocked: bool) {
    let mut spans = Vec::new();
    if !blocked {
        spans.extend([
            Span::styled("[↑↓/Tab] ", PremiumTheme::key_hint()),
            Span::styled("Navigate ", PremiumTheme::key_desc()),
            Span::styled("[←→] ", PremiumTheme::key_hint()),
            Span::styled("Adjust ", PremiumTheme::key_desc()),
            Span::styled("[Enter] ", PremiumTheme::key_hint()),
            Span::styled("Predict Premium ", PremiumTheme::key_desc()),
            Span::styled("[D] ", PremiumTheme::key_hint()),
            Span::styled("Defaults ", PremiumTheme::key_desc()),
        ]);
    }
    spans.extend([
        Span::styled("[R] ", PremiumTheme::key_hint()),
        Span::styled("Reload Model ", PremiumTheme::key_desc()),
        Span::styled("[Q] ", PremiumTheme::key_hint()),
        Span::styled("Quit", PremiumTheme::key_desc()),
    ]);

    let footer = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(PremiumTheme::border()),
    );

    f.render_widget(footer, area);
}
