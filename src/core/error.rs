use thiserror::Error;

/// Misuse of the currency service by calling code.
///
/// Rate source failures are not represented here: they are absorbed by the
/// service, which keeps serving the previous rate table.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurrencyError {
    /// The currency is not part of the supported set.
    #[error("Unsupported currency: {0}")]
    InvalidCurrency(String),

    /// Amounts must be finite and non-negative.
    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    /// The preference could not be written.
    #[error("Preference storage error: {0}")]
    Storage(String),
}

pub type CurrencyResult<T> = std::result::Result<T, CurrencyError>;
