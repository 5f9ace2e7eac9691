//! Quote result panel.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::domain::PremiumQuote;
use crate::tui::styles::PremiumTheme;

/// Outcome of the last submission.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Outcome {
    /// Nothing submitted yet
    #[default]
    Idle,
    Quote(PremiumQuote),
    /// Recoverable failure for one submission
    Failed(String),
}

/// Render the result panel
pub fn render_result(f: &mut Frame, area: Rect, outcome: &Outcome) {
    match outcome {
        Outcome::Idle => render_idle(f, area),
        Outcome::Quote(quote) => render_quote(f, area, quote),
        Outcome::Failed(message) => render_error(f, area, message),
    }
}

fn render_idle(f: &mut Frame, area: Rect) {
    let content = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "Fill in the customer profile and press [Enter] to estimate the premium",
            PremiumTheme::text_muted(),
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Prediction ", PremiumTheme::text_secondary()))
            .borders(Borders::ALL)
            .border_style(PremiumTheme::border()),
    );

    f.render_widget(content, area);
}

fn render_quote(f: &mut Frame, area: Rect, quote: &PremiumQuote) {
    let content = Paragraph::new(vec![
        Line::from(Span::styled(
            "Estimated Annual Premium",
            PremiumTheme::text_secondary(),
        )),
        Line::from(Span::styled(quote.display_premium(), PremiumTheme::premium())),
        Line::from(""),
        Line::from(vec![
            Span::styled(
                format!("Likely range ({}): ", quote.band.label()),
                PremiumTheme::text_secondary(),
            ),
            Span::styled(quote.band.display_range(), PremiumTheme::text()),
        ]),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .title(Span::styled(" Prediction ", PremiumTheme::subtitle()))
            .borders(Borders::ALL)
            .border_style(PremiumTheme::border_focused()),
    );

    f.render_widget(content, area);
}

fn render_error(f: &mut Frame, area: Rect, message: &str) {
    let content = Paragraph::new(vec![
        Line::from(Span::styled("! Error", PremiumTheme::danger())),
        Line::from(""),
        Line::from(Span::styled(message, PremiumTheme::text())),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(Span::styled(" Prediction ", PremiumTheme::text_secondary()))
            .borders(Borders::ALL)
            .border_style(PremiumTheme::danger()),
    );

    f.render_widget(content, area);
}
