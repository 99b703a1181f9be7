//! Supported display currencies

use serde::Serialize;
use std::fmt::Display;

/// Code of the currency canonical prices are stored in.
pub const BASE_CURRENCY: &str = "EUR";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Currency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub name: &'static str,
    pub flag: &'static str,
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} ({})", self.flag, self.name, self.code)
    }
}

pub const EUR: Currency = Currency {
    code: "EUR",
    symbol: "€",
    name: "Euro",
    flag: "🇪🇺",
};

pub const USD: Currency = Currency {
    code: "USD",
    symbol: "$",
    name: "Dollar américain",
    flag: "🇺🇸",
};

pub const CAD: Currency = Currency {
    code: "CAD",
    symbol: "CA$",
    name: "Dollar canadien",
    flag: "🇨🇦",
};

pub const HTG: Currency = Currency {
    code: "HTG",
    symbol: "G",
    name: "Gourde haïtienne",
    flag: "🇭🇹",
};

pub const GBP: Currency = Currency {
    code: "GBP",
    symbol: "£",
    name: "Livre sterling",
    flag: "🇬🇧",
};

pub const CHF: Currency = Currency {
    code: "CHF",
    symbol: "CHF",
    name: "Franc suisse",
    flag: "🇨🇭",
};

/// Every currency prices can be displayed in, in menu order.
pub static SUPPORTED_CURRENCIES: [Currency; 6] = [EUR, USD, CAD, HTG, GBP, CHF];

/// Looks up a supported currency by its code. Codes are matched exactly.
pub fn find_currency(code: &str) -> Option<&'static Currency> {
    SUPPORTED_CURRENCIES.iter().find(|c| c.code == code)
}

/// Returns the canonical entry for `currency` if it is part of the supported set.
pub fn supported(currency: &Currency) -> Option<&'static Currency> {
    find_currency(currency.code).filter(|c| *c == currency)
}

pub fn base_currency() -> &'static Currency {
    &SUPPORTED_CURRENCIES[0]
}
