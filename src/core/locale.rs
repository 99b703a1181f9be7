//! Locale based default currency detection
//!
//! The detection is a heuristic over the raw locale tag, not a region lookup.
//! Rules are evaluated in order and the first match wins, so `en-CA` resolves
//! to CAD before the `en-US` rule is ever considered.

use super::currency::{Currency, base_currency, find_currency};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleMatch {
    /// Case-sensitive substring.
    Contains(&'static str),
    /// Case-sensitive prefix.
    StartsWith(&'static str),
    /// ASCII case-insensitive prefix.
    StartsWithIgnoreCase(&'static str),
}

impl LocaleMatch {
    fn matches(&self, locale: &str) -> bool {
        match self {
            LocaleMatch::Contains(needle) => locale.contains(needle),
            LocaleMatch::StartsWith(prefix) => locale.starts_with(prefix),
            LocaleMatch::StartsWithIgnoreCase(prefix) => locale
                .get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleRule {
    pub pattern: LocaleMatch,
    pub currency: &'static str,
}

pub const LOCALE_RULES: &[LocaleRule] = &[
    LocaleRule {
        pattern: LocaleMatch::Contains("CA"),
        currency: "CAD",
    },
    LocaleRule {
        pattern: LocaleMatch::Contains("GB"),
        currency: "GBP",
    },
    LocaleRule {
        pattern: LocaleMatch::Contains("CH"),
        currency: "CHF",
    },
    LocaleRule {
        pattern: LocaleMatch::StartsWith("ht"),
        currency: "HTG",
    },
    LocaleRule {
        pattern: LocaleMatch::Contains("HT"),
        currency: "HTG",
    },
    LocaleRule {
        pattern: LocaleMatch::StartsWithIgnoreCase("en-US"),
        currency: "USD",
    },
];

/// Picks the display currency for a locale tag such as `fr-CA`.
///
/// Falls back to the base currency when no rule matches.
pub fn detect_default_currency(locale: &str) -> &'static Currency {
    let detected = LOCALE_RULES
        .iter()
        .find(|rule| rule.pattern.matches(locale))
        .and_then(|rule| find_currency(rule.currency))
        .unwrap_or_else(base_currency);
    debug!(locale, currency = detected.code, "Detected default currency");
    detected
}

/// Turns a POSIX locale (`fr_CA.UTF-8`, `de_CH@euro`) into a BCP 47 style tag.
pub fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw
        .split(['.', '@'])
        .next()
        .unwrap_or_default()
        .trim()
        .replace('_', "-");
    match tag.as_str() {
        "" | "C" | "POSIX" => None,
        _ => Some(tag),
    }
}

/// Reads the process locale from the usual environment variables.
pub fn system_locale() -> Option<String> {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find_map(|value| normalize_locale(&value))
}
