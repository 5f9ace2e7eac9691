//! Main TUI application state machine.
//!
//! Handles:
//! - Input event handling
//! - Quote service integration
//! - The blocking load-failure state

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use crate::adapters::FileArtifactStore;
use crate::application::{ModelCache, QuoteService};
use crate::config::AppConfig;
use crate::ports::ArtifactStore;

use super::ui::{
    form::{render_quote_form, QuoteFormState},
    render_header, render_key_hints, render_load_failure,
    result::{render_result, Outcome},
    sidebar::render_sidebar,
};

/// Main application state
pub struct App<S: ArtifactStore = FileArtifactStore> {
    /// Whether the app should quit
    should_quit: bool,

    service: QuoteService<S>,

    form_state: QuoteFormState,

    /// Result of the last submission
    outcome: Outcome,

    /// Set while the artifacts cannot be loaded; blocks the form
    load_error: Option<String>,
}

impl App<FileArtifactStore> {
    /// Create an application reading artifacts from the configured directory.
    #[must_use]
    pub fn new(config: &AppConfig) -> Self {
        let store = FileArtifactStore::new(config.model_dir.clone());
        Self::with_service(QuoteService::new(Arc::new(ModelCache::new(store))))
    }
}

impl<S: ArtifactStore> App<S> {
    /// Create application with an injected quote service.
    pub fn with_service(service: QuoteService<S>) -> Self {
        Self {
            should_quit: false,
            service,
            form_state: QuoteFormState::default(),
            outcome: Outcome::Idle,
            load_error: None,
        }
    }

    /// Run the main application loop.
    ///
    /// A load failure is shown on screen rather than returned.
    ///
    /// # Errors
    /// Returns error if terminal operations fail.
    pub fn run(&mut self) -> Result<()> {
        self.load_model();

        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.main_loop(&mut terminal);

        // Restore terminal
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;

        result
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;

            // Handle input (short poll to stay responsive)
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code, key.modifiers);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Render the whole page.
    pub(crate) fn draw(&self, f: &mut Frame) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Body
                Constraint::Length(2), // Key hints
            ])
            .split(f.area());

        render_header(f, rows[0]);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(36)])
            .split(rows[1]);

        match &self.load_error {
            Some(message) => render_load_failure(f, body[0], message),
            None => {
                let main = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([Constraint::Length(19), Constraint::Min(6)])
                    .split(body[0]);
                render_quote_form(f, main[0], &self.form_state);
                render_result(f, main[1], &self.outcome);
            }
        }

        render_sidebar(f, body[1], &self.service.model_status());
        render_key_hints(f, rows[2], self.load_error.is_some());
    }

    fn load_model(&mut self) {
        match self.service.initialize() {
            Ok(()) => self.load_error = None,
            Err(e) => {
                tracing::error!("{}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    fn reload_model(&mut self) {
        self.outcome = Outcome::Idle;
        match self.service.reload_model() {
            Ok(()) => self.load_error = None,
            Err(e) => {
                tracing::error!("{}", e);
                self.load_error = Some(e.to_string());
            }
        }
    }

    fn handle_key(&mut self, key: KeyCode, modifiers: KeyModifiers) {
        // Global quit handling
        if key == KeyCode::Char('q') && modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        if self.load_error.is_some() {
            self.handle_blocked_key(key);
        } else {
            self.handle_form_key(key);
        }
    }

    /// Only reload and quit are available while the model is missing.
    fn handle_blocked_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload_model(),
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Up | KeyCode::BackTab => self.form_state.prev_field(),
            KeyCode::Down | KeyCode::Tab => self.form_state.next_field(),
            KeyCode::Left => self.form_state.decrement(),
            KeyCode::Right => self.form_state.increment(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reload_model(),
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('d') | KeyCode::Char('D') => {
                self.form_state.reset();
                self.outcome = Outcome::Idle;
            }
            KeyCode::Char(c) => self.form_state.input_char(c),
            KeyCode::Backspace => self.form_state.delete_char(),
            KeyCode::Delete => self.form_state.clear_field(),
            KeyCode::Enter => self.submit(),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let profile = self.form_state.submit();
        match self.service.quote(&profile) {
            Ok(quote) => self.outcome = Outcome::Quote(quote),
            Err(e) if e.is_fatal() => {
                tracing::error!("{}", e);
                self.outcome = Outcome::Idle;
                self.load_error = Some(e.to_string());
            }
            Err(e) => {
                tracing::warn!("{}", e);
                self.outcome = Outcome::Failed(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{MODEL_FILE, SCHEMA_FILE};
    use crate::application::model_cache::test_support::StubStore;
    use ratatui::backend::TestBackend;
    use tempfile::tempdir;

    fn bundled_app() -> App {
        App::new(&AppConfig::default())
    }

    fn press(app: &mut App<impl ArtifactStore>, key: KeyCode) {
        app.handle_key(key, KeyModifiers::NONE);
    }

    fn render(app: &App<impl ArtifactStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(130, 40)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_page_shows_form_sidebar_and_metrics() {
        let mut app = bundled_app();
        app.load_model();
        assert!(app.load_error.is_none());

        let screen = render(&app);
        assert!(screen.contains("Insurance Premium Predictor"));
        assert!(screen.contains("Customer Profile"));
        assert!(screen.contains("Annual Income"));
        assert!(screen.contains("Policy Start Date"));
        assert!(screen.contains("2023-01-01"));
        assert!(screen.contains("RMSE: $845.46"));
        assert!(screen.contains("0.0435"));
        assert!(screen.contains("Refresh Model"));
        assert!(screen.contains("LightGBM (5 trees, 15 features)"));
    }

    #[test]
    fn test_enter_shows_quote_and_band() {
        let mut app = bundled_app();
        app.load_model();
        press(&mut app, KeyCode::Enter);

        let Outcome::Quote(quote) = &app.outcome else {
            panic!("expected a quote, got {:?}", app.outcome);
        };
        assert!((quote.premium - 1061.0).abs() < 1e-9);

        let screen = render(&app);
        assert!(screen.contains("$1,061.00"));
        assert!(screen.contains("$955 - $1,167"));
        assert!(screen.contains("±10%"));
    }

    #[test]
    fn test_missing_artifacts_block_until_reload() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig {
            model_dir: temp.path().to_path_buf(),
            ..AppConfig::default()
        };
        let mut app = App::new(&config);
        app.load_model();
        assert!(app.load_error.is_some());

        // Form input is ignored while blocked.
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.outcome, Outcome::Idle);
        assert_eq!(app.form_state.selected_field, 0);

        let screen = render(&app);
        assert!(screen.contains("Model loading failed"));
        assert!(screen.contains("Not loaded"));
        assert!(!screen.contains("Customer Profile"));

        std::fs::copy("models/new_insurance_model.json", temp.path().join(MODEL_FILE)).unwrap();
        std::fs::copy("models/expected_col.json", temp.path().join(SCHEMA_FILE)).unwrap();
        press(&mut app, KeyCode::Char('r'));
        assert!(app.load_error.is_none());

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.outcome, Outcome::Quote(_)));
    }

    #[test]
    fn test_prediction_failure_keeps_form_usable() {
        let store = StubStore::new(&["Age", "Credit Score"], 0.0, vec![1.0]);
        let mut app = App::with_service(QuoteService::new(Arc::new(ModelCache::new(store))));
        app.load_model();

        press(&mut app, KeyCode::Enter);
        let Outcome::Failed(message) = &app.outcome else {
            panic!("expected a failure, got {:?}", app.outcome);
        };
        assert!(message.starts_with("Prediction failed"));
        assert!(app.load_error.is_none());

        press(&mut app, KeyCode::Down);
        assert_eq!(app.form_state.selected_field, 1);
    }

    #[test]
    fn test_reload_clears_previous_quote() {
        let store = StubStore::new(&["Age"], 0.0, vec![1.0]);
        let mut app = App::with_service(QuoteService::new(Arc::new(ModelCache::new(store))));
        app.load_model();
        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.outcome, Outcome::Quote(_)));

        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.outcome, Outcome::Idle);
        assert!(render(&app).contains("linear stub #2"));
    }

    #[test]
    fn test_defaults_key_resets_form() {
        let mut app = bundled_app();
        app.load_model();
        press(&mut app, KeyCode::Delete);
        press(&mut app, KeyCode::Char('6'));
        press(&mut app, KeyCode::Char('0'));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.form_state.profile().age, 60);

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.form_state, QuoteFormState::default());
    }

    #[test]
    fn test_quit_keys() {
        let mut app = bundled_app();
        app.handle_key(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);

        let mut app = bundled_app();
        press(&mut app, KeyCode::Char('Q'));
        assert!(app.should_quit);
    }
}
