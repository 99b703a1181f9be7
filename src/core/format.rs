//! Rounding and display formatting of converted amounts

use super::currency::Currency;
use serde::{Deserialize, Serialize};

/// How a converted amount is rounded before display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Round to the given number of decimal places.
    Decimals(u32),
    /// Round to the nearest multiple of the step.
    NearestMultiple(u32),
}

impl Rounding {
    pub fn for_currency(code: &str) -> Self {
        match code {
            // Gourde prices are not quoted below tens
            "HTG" => Rounding::NearestMultiple(10),
            _ => Rounding::Decimals(2),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        match self {
            Rounding::Decimals(places) => {
                let factor = 10f64.powi(*places as i32);
                (value * factor).round() / factor
            }
            Rounding::NearestMultiple(step) => {
                let step = f64::from(*step);
                (value / step).round() * step
            }
        }
    }

    fn max_fraction_digits(&self) -> usize {
        match self {
            Rounding::Decimals(places) => *places as usize,
            Rounding::NearestMultiple(_) => 0,
        }
    }
}

/// Separators used when rendering numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
    #[serde(default = "default_group_separator")]
    pub group_separator: String,
    #[serde(default = "default_decimal_separator")]
    pub decimal_separator: String,
}

fn default_group_separator() -> String {
    "\u{202f}".to_string()
}

fn default_decimal_separator() -> String {
    ",".to_string()
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            group_separator: default_group_separator(),
            decimal_separator: default_decimal_separator(),
        }
    }
}

impl NumberFormat {
    /// Renders a non-negative value with digit grouping and at most
    /// `max_fraction_digits` decimals. Trailing zero decimals are dropped.
    pub fn format(&self, value: f64, max_fraction_digits: usize) -> String {
        let fixed = format!("{value:.max_fraction_digits$}");
        let (int_part, frac_part) = match fixed.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part.trim_end_matches('0')),
            None => (fixed.as_str(), ""),
        };

        let mut out = String::with_capacity(fixed.len() + 4);
        let digits = int_part.len();
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (digits - i) % 3 == 0 {
                out.push_str(&self.group_separator);
            }
            out.push(ch);
        }
        if !frac_part.is_empty() {
            out.push_str(&self.decimal_separator);
            out.push_str(frac_part);
        }
        out
    }
}

/// Rounds `value` per the currency's rule and prefixes its symbol.
///
/// Returns `None` when the rounded value is not finite.
pub fn format_money(
    currency: &Currency,
    value: f64,
    number_format: &NumberFormat,
) -> Option<String> {
    let rounding = Rounding::for_currency(currency.code);
    // adding 0.0 turns -0.0 into 0.0
    let rounded = rounding.apply(value) + 0.0;
    if !rounded.is_finite() {
        return None;
    }
    Some(format!(
        "{} {}",
        currency.symbol,
        number_format.format(rounded, rounding.max_fraction_digits())
    ))
}
