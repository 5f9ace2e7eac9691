//! Premium quote and its display helpers.

use serde::{Deserialize, Serialize};

/// Relative half-width of the displayed confidence band.
pub const BAND_FRACTION: f64 = 0.10;

/// Label shown next to the band.
pub const BAND_LABEL: &str = "±10%";

/// Validation figures captured when the model was trained.
///
/// Displayed verbatim; nothing here is recomputed at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationMetrics {
    pub rmse: &'static str,
    pub r_squared: &'static str,
}

pub const VALIDATION_METRICS: ValidationMetrics = ValidationMetrics {
    rmse: "$845.46",
    r_squared: "0.0435",
};

/// Fixed-width band around a prediction.
///
/// A display heuristic, not a statistical interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceBand {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceBand {
    #[must_use]
    pub fn around(premium: f64) -> Self {
        Self {
            lower: premium * (1.0 - BAND_FRACTION),
            upper: premium * (1.0 + BAND_FRACTION),
        }
    }

    /// Range formatted as whole currency units, e.g. `$900 - $1,100`.
    #[must_use]
    pub fn display_range(&self) -> String {
        format!(
            "{} - {}",
            format_currency(self.lower, 0),
            format_currency(self.upper, 0)
        )
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        BAND_LABEL
    }
}

/// Result of scoring one customer profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PremiumQuote {
    pub premium: f64,
    pub band: ConfidenceBand,
}

impl PremiumQuote {
    #[must_use]
    pub fn new(premium: f64) -> Self {
        Self {
            premium,
            band: ConfidenceBand::around(premium),
        }
    }

    /// Premium with cents, e.g. `$1,059.75`.
    #[must_use]
    pub fn display_premium(&self) -> String {
        format_currency(self.premium, 2)
    }
}

/// Format a dollar amount with thousands separators.
///
/// Negative amounts keep the sign after the currency symbol (`$-12.00`).
#[must_use]
pub fn format_currency(amount: f64, decimals: usize) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }
    let fixed = format!("{:.*}", decimals, amount.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // "-0" would read oddly once rounded away.
    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if amount < 0.0 && !is_zero { "-" } else { "" };

    match frac_part {
        Some(frac) => format!("${sign}{grouped}.{frac}"),
        None => format!("${sign}{grouped}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_for_one_thousand() {
        let quote = PremiumQuote::new(1000.0);
        assert!((quote.band.lower - 900.0).abs() < 1e-9);
        assert!((quote.band.upper - 1100.0).abs() < 1e-9);
        assert_eq!(quote.band.display_range(), "$900 - $1,100");
        assert_eq!(quote.band.label(), "±10%");
        assert_eq!(quote.display_premium(), "$1,000.00");
    }

    #[test]
    fn test_currency_formatting() {
        assert_eq!(format_currency(1059.75, 2), "$1,059.75");
        assert_eq!(format_currency(1234567.891, 2), "$1,234,567.89");
        assert_eq!(format_currency(999.6, 0), "$1,000");
        assert_eq!(format_currency(12.0, 2), "$12.00");
        assert_eq!(format_currency(0.0, 2), "$0.00");
        assert_eq!(format_currency(-12.0, 2), "$-12.00");
        assert_eq!(format_currency(-0.001, 2), "$0.00");
    }

    #[test]
    fn test_band_tracks_prediction() {
        let quote = PremiumQuote::new(1059.75);
        assert!((quote.band.lower - 0.9 * 1059.75).abs() < 1e-9);
        assert!((quote.band.upper - 1.1 * 1059.75).abs() < 1e-9);
        assert_eq!(quote.band.display_range(), "$954 - $1,166");
    }
}
