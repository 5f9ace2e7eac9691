//! Customer profile input form.

use chrono::NaiveDate;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::domain::{
    CustomerProfile, IntRange, MaritalStatus, PolicyType, AGE_RANGE, ANNUAL_INCOME_RANGE,
    CREDIT_SCORE_RANGE, EXERCISE_FREQUENCY_RANGE, HEALTH_SCORE_RANGE, INSURANCE_DURATION_RANGE,
    PREVIOUS_CLAIMS_RANGE, VEHICLE_AGE_RANGE,
};
use crate::tui::styles::PremiumTheme;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Form fields in navigation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldId {
    Age,
    AnnualIncome,
    HealthScore,
    PolicyType,
    CreditScore,
    MaritalStatus,
    VehicleAge,
    InsuranceDuration,
    ExerciseFrequency,
    PreviousClaims,
    PolicyStartDate,
}

impl FieldId {
    pub const ALL: [FieldId; 11] = [
        Self::Age,
        Self::AnnualIncome,
        Self::HealthScore,
        Self::PolicyType,
        Self::CreditScore,
        Self::MaritalStatus,
        Self::VehicleAge,
        Self::InsuranceDuration,
        Self::ExerciseFrequency,
        Self::PreviousClaims,
        Self::PolicyStartDate,
    ];

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Editable state of one control.
///
/// Number and date controls keep a text buffer that is folded into the
/// value on commit (leaving the field, stepping, submitting).
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Number {
        range: IntRange,
        step: i64,
        value: i64,
        buffer: String,
    },
    Slider {
        range: IntRange,
        step: i64,
        value: i64,
    },
    Select {
        options: Vec<&'static str>,
        index: usize,
    },
    Date {
        value: NaiveDate,
        buffer: String,
    },
}

impl Control {
    fn number(range: IntRange, step: i64, value: i64) -> Self {
        Self::Number {
            range,
            step,
            value,
            buffer: value.to_string(),
        }
    }

    fn slider(range: IntRange, step: i64, value: i64) -> Self {
        Self::Slider { range, step, value }
    }

    fn date(value: NaiveDate) -> Self {
        Self::Date {
            value,
            buffer: value.format(DATE_FORMAT).to_string(),
        }
    }

    /// Type one character. Returns `false` if the control refused it.
    fn input_char(&mut self, c: char) -> bool {
        match self {
            Self::Number { range, buffer, .. } => {
                if !c.is_ascii_digit() {
                    return false;
                }
                let candidate = if buffer == "0" {
                    c.to_string()
                } else {
                    format!("{buffer}{c}")
                };
                match candidate.parse::<i64>() {
                    Ok(v) if range.max.map_or(true, |max| v <= max) => {
                        *buffer = candidate;
                        true
                    }
                    _ => false,
                }
            }
            Self::Date { buffer, .. } => {
                if (c.is_ascii_digit() || c == '-') && buffer.len() < 10 {
                    buffer.push(c);
                    true
                } else {
                    false
                }
            }
            Self::Slider { .. } | Self::Select { .. } => false,
        }
    }

    fn delete_char(&mut self) {
        if let Self::Number { buffer, .. } | Self::Date { buffer, .. } = self {
            buffer.pop();
        }
    }

    fn clear(&mut self) {
        if let Self::Number { buffer, .. } | Self::Date { buffer, .. } = self {
            buffer.clear();
        }
    }

    /// Fold the text buffer into the value: numbers are clamped, dates that
    /// do not parse revert to the last valid one.
    fn commit(&mut self) {
        match self {
            Self::Number {
                range,
                value,
                buffer,
                ..
            } => {
                if let Ok(parsed) = buffer.parse::<i64>() {
                    *value = range.clamp(parsed);
                }
                *buffer = value.to_string();
            }
            Self::Date { value, buffer } => {
                if let Ok(parsed) = NaiveDate::parse_from_str(buffer.trim(), DATE_FORMAT) {
                    *value = parsed;
                }
                *buffer = value.format(DATE_FORMAT).to_string();
            }
            Self::Slider { .. } | Self::Select { .. } => {}
        }
    }

    /// Step the value by `delta` increments (arrow keys).
    fn adjust(&mut self, delta: i64) {
        self.commit();
        match self {
            Self::Number {
                range,
                step,
                value,
                buffer,
            } => {
                *value = range.clamp(value.saturating_add(delta.saturating_mul(*step)));
                *buffer = value.to_string();
            }
            Self::Slider { range, step, value } => {
                *value = range.clamp(value.saturating_add(delta.saturating_mul(*step)));
            }
            Self::Select { options, index } => {
                let n = options.len() as i64;
                if n > 0 {
                    *index = (*index as i64 + delta).rem_euclid(n) as usize;
                }
            }
            Self::Date { value, buffer } => {
                let next = if delta >= 0 {
                    value.succ_opt()
                } else {
                    value.pred_opt()
                };
                if let Some(d) = next {
                    *value = d;
                }
                *buffer = value.format(DATE_FORMAT).to_string();
            }
        }
    }

    /// Text shown in the control.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Number { buffer, .. } | Self::Date { buffer, .. } => buffer.clone(),
            Self::Slider { value, .. } => value.to_string(),
            Self::Select { options, index } => options.get(*index).copied().unwrap_or("").to_string(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Number { .. } | Self::Date { .. })
    }
}

/// Form field definition
#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub id: FieldId,
    pub label: &'static str,
    pub hint: String,
    pub control: Control,
}

fn range_hint(range: IntRange) -> String {
    match range.max {
        Some(max) => format!("{}-{}", range.min, max),
        None => format!(">= {}", range.min),
    }
}

impl FormField {
    fn numeric(id: FieldId, label: &'static str, range: IntRange, value: i64) -> Self {
        Self::numeric_step(id, label, range, 1, value)
    }

    fn numeric_step(id: FieldId, label: &'static str, range: IntRange, step: i64, value: i64) -> Self {
        Self {
            id,
            label,
            hint: range_hint(range),
            control: Control::number(range, step, value),
        }
    }

    fn slider(id: FieldId, label: &'static str, range: IntRange, step: i64, value: i64) -> Self {
        Self {
            id,
            label,
            hint: range_hint(range),
            control: Control::slider(range, step, value),
        }
    }

    fn select(id: FieldId, label: &'static str, options: Vec<&'static str>, index: usize) -> Self {
        Self {
            id,
            label,
            hint: "←/→ to change".to_string(),
            control: Control::Select { options, index },
        }
    }
}

/// Quote form state
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteFormState {
    pub fields: Vec<FormField>,
    pub selected_field: usize,
    pub error_message: Option<String>,
}

impl Default for QuoteFormState {
    fn default() -> Self {
        Self::from_profile(&CustomerProfile::default())
    }
}

impl QuoteFormState {
    /// Form pre-filled with a profile's values.
    #[must_use]
    pub fn from_profile(p: &CustomerProfile) -> Self {
        let policy_index = PolicyType::ALL
            .iter()
            .position(|t| *t == p.policy_type)
            .unwrap_or(0);
        let marital_index = MaritalStatus::ALL
            .iter()
            .position(|m| *m == p.marital_status)
            .unwrap_or(0);

        let fields = vec![
            FormField::numeric(FieldId::Age, "Age", AGE_RANGE, p.age),
            FormField::numeric_step(
                FieldId::AnnualIncome,
                "Annual Income",
                ANNUAL_INCOME_RANGE,
                1000,
                p.annual_income,
            ),
            FormField::slider(
                FieldId::HealthScore,
                "Health Score",
                HEALTH_SCORE_RANGE,
                1,
                p.health_score,
            ),
            FormField::select(
                FieldId::PolicyType,
                "Policy Type",
                PolicyType::ALL.iter().map(|t| t.label()).collect(),
                policy_index,
            ),
            FormField::slider(
                FieldId::CreditScore,
                "Credit Score",
                CREDIT_SCORE_RANGE,
                10,
                p.credit_score,
            ),
            FormField::select(
                FieldId::MaritalStatus,
                "Marital Status",
                MaritalStatus::ALL.iter().map(|m| m.label()).collect(),
                marital_index,
            ),
            FormField::numeric(FieldId::VehicleAge, "Vehicle Age", VEHICLE_AGE_RANGE, p.vehicle_age),
            FormField::numeric(
                FieldId::InsuranceDuration,
                "Insurance Duration (years)",
                INSURANCE_DURATION_RANGE,
                p.insurance_duration,
            ),
            FormField::slider(
                FieldId::ExerciseFrequency,
                "Exercise Frequency (days/week)",
                EXERCISE_FREQUENCY_RANGE,
                1,
                p.exercise_frequency,
            ),
            FormField::numeric(
                FieldId::PreviousClaims,
                "Previous Claims",
                PREVIOUS_CLAIMS_RANGE,
                p.previous_claims,
            ),
            FormField {
                id: FieldId::PolicyStartDate,
                label: "Policy Start Date",
                hint: "YYYY-MM-DD".to_string(),
                control: Control::date(p.policy_start_date),
            },
        ];

        Self {
            fields,
            selected_field: 0,
            error_message: None,
        }
    }

    fn field(&self, id: FieldId) -> &FormField {
        &self.fields[id.index()]
    }

    fn current_mut(&mut self) -> &mut FormField {
        &mut self.fields[self.selected_field]
    }

    #[must_use]
    pub fn selected_id(&self) -> FieldId {
        self.fields[self.selected_field].id
    }

    /// Move to the next field
    pub fn next_field(&mut self) {
        self.current_mut().control.commit();
        self.selected_field = (self.selected_field + 1) % self.fields.len();
    }

    /// Move to the previous field
    pub fn prev_field(&mut self) {
        self.current_mut().control.commit();
        if self.selected_field == 0 {
            self.selected_field = self.fields.len() - 1;
        } else {
            self.selected_field -= 1;
        }
    }

    /// Add a character to the current field.
    ///
    /// Digits that would push a number past its maximum are refused.
    pub fn input_char(&mut self, c: char) {
        let field = self.current_mut();
        if field.control.input_char(c) {
            self.error_message = None;
            return;
        }
        if let Control::Number {
            range: IntRange { max: Some(max), .. },
            ..
        } = field.control
        {
            if c.is_ascii_digit() {
                self.error_message = Some(format!("{}: maximum is {}", field.label, max));
            }
        }
    }

    /// Delete the last character
    pub fn delete_char(&mut self) {
        self.current_mut().control.delete_char();
    }

    /// Clear the current field
    pub fn clear_field(&mut self) {
        self.current_mut().control.clear();
    }

    pub fn increment(&mut self) {
        self.current_mut().control.adjust(1);
        self.error_message = None;
    }

    pub fn decrement(&mut self) {
        self.current_mut().control.adjust(-1);
        self.error_message = None;
    }

    /// Restore every control to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Commit pending edits and return the complete profile.
    pub fn submit(&mut self) -> CustomerProfile {
        for field in &mut self.fields {
            field.control.commit();
        }
        self.error_message = None;
        self.profile()
    }

    /// Profile built from the committed values.
    #[must_use]
    pub fn profile(&self) -> CustomerProfile {
        CustomerProfile {
            age: self.int(FieldId::Age),
            annual_income: self.int(FieldId::AnnualIncome),
            health_score: self.int(FieldId::HealthScore),
            policy_type: PolicyType::ALL
                .get(self.choice(FieldId::PolicyType))
                .copied()
                .unwrap_or_default(),
            credit_score: self.int(FieldId::CreditScore),
            marital_status: MaritalStatus::ALL
                .get(self.choice(FieldId::MaritalStatus))
                .copied()
                .unwrap_or_default(),
            vehicle_age: self.int(FieldId::VehicleAge),
            insurance_duration: self.int(FieldId::InsuranceDuration),
            exercise_frequency: self.int(FieldId::ExerciseFrequency),
            previous_claims: self.int(FieldId::PreviousClaims),
            policy_start_date: self.date(FieldId::PolicyStartDate),
        }
    }

    fn int(&self, id: FieldId) -> i64 {
        match &self.field(id).control {
            Control::Number { value, .. } | Control::Slider { value, .. } => *value,
            _ => 0,
        }
    }

    fn choice(&self, id: FieldId) -> usize {
        match &self.field(id).control {
            Control::Select { index, .. } => *index,
            _ => 0,
        }
    }

    fn date(&self, id: FieldId) -> NaiveDate {
        match &self.field(id).control {
            Control::Date { value, .. } => *value,
            _ => crate::domain::default_policy_start(),
        }
    }
}

/// Render the quote form
pub fn render_quote_form(f: &mut Frame, area: Rect, state: &QuoteFormState) {
    let block = Block::default()
        .title(Span::styled(" Customer Profile ", PremiumTheme::subtitle()))
        .borders(Borders::ALL)
        .border_style(PremiumTheme::border());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(12), // Two columns of four
            Constraint::Length(3),  // Bottom row
            Constraint::Min(0),
            Constraint::Length(2), // Footer/error
        ])
        .split(inner);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(chunks[0]);

    render_field_column(f, columns[0], state, 0..4);
    render_field_column(f, columns[1], state, 4..8);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(chunks[1]);
    for (slot, index) in (8..11).enumerate() {
        if let Some(field) = state.fields.get(index) {
            render_field(f, bottom[slot], field, index == state.selected_field);
        }
    }

    render_form_footer(f, chunks[3], state);
}

fn render_field_column(
    f: &mut Frame,
    area: Rect,
    state: &QuoteFormState,
    indices: std::ops::Range<usize>,
) {
    let constraints: Vec<Constraint> = indices
        .clone()
        .map(|_| Constraint::Length(3))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    for (slot, index) in indices.enumerate() {
        if let Some(field) = state.fields.get(index) {
            render_field(f, chunks[slot], field, index == state.selected_field);
        }
    }
}

fn render_field(f: &mut Frame, area: Rect, field: &FormField, is_selected: bool) {
    let border_style = if is_selected {
        PremiumTheme::border_focused()
    } else {
        PremiumTheme::border()
    };
    let title_style = if is_selected {
        PremiumTheme::focused()
    } else {
        PremiumTheme::text_secondary()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", field.label), title_style))
        .borders(Borders::ALL)
        .border_style(border_style);

    if let Control::Slider { range, value, .. } = &field.control {
        let span = range.max.map_or(0, |max| max - range.min);
        let ratio = if span > 0 {
            ((value - range.min) as f64 / span as f64).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let gauge = Gauge::default()
            .block(block)
            .gauge_style(PremiumTheme::slider(is_selected))
            .ratio(ratio)
            .label(format!("{value}  ({})", field.hint));
        f.render_widget(gauge, area);
        return;
    }

    let text = field.control.display();
    let mut spans = vec![Span::raw(" ")];
    match &field.control {
        Control::Select { .. } => {
            spans.push(Span::styled("◀ ", PremiumTheme::text_muted()));
            spans.push(Span::styled(text, PremiumTheme::text()));
            spans.push(Span::styled(" ▶", PremiumTheme::text_muted()));
        }
        _ if text.is_empty() => {
            spans.push(Span::styled(field.hint.clone(), PremiumTheme::text_muted()));
        }
        _ => spans.push(Span::styled(text, PremiumTheme::text())),
    }
    if is_selected && field.control.is_text() {
        spans.push(Span::styled("▌", PremiumTheme::cursor()));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_form_footer(f: &mut Frame, area: Rect, state: &QuoteFormState) {
    let content = if let Some(err) = &state.error_message {
        Line::from(vec![
            Span::styled("! ", PremiumTheme::warning()),
            Span::styled(err.clone(), PremiumTheme::warning()),
        ])
    } else {
        let hint = state
            .fields
            .get(state.selected_field)
            .map(|field| field.hint.clone())
            .unwrap_or_default();
        Line::from(vec![Span::styled(hint, PremiumTheme::text_muted())])
    };

    let footer = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::TOP)
            .border_style(PremiumTheme::border()),
    );

    f.render_widget(footer, area);
}
