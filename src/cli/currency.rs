use super::ui;
use crate::core::locale::detect_default_currency;
use crate::core::{CurrencyService, RateOrigin, SUPPORTED_CURRENCIES};
use anyhow::Result;
use comfy_table::Cell;

fn origin_label(service: &CurrencyService) -> String {
    let rates = service.rates();
    match (rates.origin(), rates.fetched_at()) {
        (RateOrigin::Remote, Some(at)) => format!("live ({})", at.format("%Y-%m-%d %H:%M UTC")),
        (RateOrigin::Remote, None) => "live".to_string(),
        (RateOrigin::Fallback, _) => "fallback (offline)".to_string(),
    }
}

/// Summary of the active display settings.
pub fn show(service: &CurrencyService) -> String {
    let currency = service.current_currency();
    let locale = if service.locale().is_empty() {
        "unknown"
    } else {
        service.locale()
    };
    let auto_detect = if service.auto_detect() { "on" } else { "off" };

    let lines = [
        ("Currency", ui::style_text(&currency.to_string(), ui::StyleType::Value)),
        ("Auto-detect", auto_detect.to_string()),
        ("Locale", locale.to_string()),
        (
            "Rates",
            ui::style_text(&origin_label(service), ui::StyleType::Subtle),
        ),
    ];

    lines
        .iter()
        .map(|(label, value)| format!("{}: {}", ui::style_text(label, ui::StyleType::Label), value))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Table of every supported currency with its rate against EUR.
pub fn list(service: &CurrencyService) -> String {
    let active = service.current_currency();
    let rates = service.rates();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("Symbol"),
        ui::header_cell("Per 1 EUR"),
    ]);

    for currency in SUPPORTED_CURRENCIES.iter() {
        let rate = rates
            .rate(currency.code)
            .map_or("N/A".to_string(), |r| format!("{r:.4}"));
        table.add_row(vec![
            ui::marker_cell(currency == active),
            Cell::new(currency.code),
            Cell::new(format!("{} {}", currency.flag, currency.name)),
            Cell::new(currency.symbol),
            ui::number_cell(rate),
        ]);
    }

    format!(
        "{}\n\n{}\nRates: {}",
        ui::style_text("Supported currencies", ui::StyleType::Title),
        table,
        origin_label(service)
    )
}

pub fn set(service: &CurrencyService, code: &str) -> Result<String> {
    service.set_currency_code(&code.trim().to_ascii_uppercase())?;
    Ok(format!(
        "Display currency set to {}",
        ui::style_text(&service.current_currency().to_string(), ui::StyleType::Value)
    ))
}

pub fn auto(service: &CurrencyService, enabled: bool) -> Result<String> {
    service.set_auto_detect(enabled)?;
    Ok(if enabled {
        format!(
            "Auto-detect enabled, using {}",
            ui::style_text(&service.current_currency().to_string(), ui::StyleType::Value)
        )
    } else {
        "Auto-detect disabled".to_string()
    })
}

pub fn convert(service: &CurrencyService, amount: f64) -> Result<String> {
    Ok(service.convert(amount)?)
}

pub fn price(service: &CurrencyService, amount: Option<f64>) -> Result<String> {
    Ok(service.format_price(amount)?)
}

/// Currency picked for `locale`, or for the service's locale when none is given.
pub fn detect(service: &CurrencyService, locale: Option<&str>) -> String {
    let locale = locale.unwrap_or_else(|| service.locale());
    let currency = detect_default_currency(locale);
    format!("{locale}: {currency}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ServiceOptions;
    use crate::core::format::NumberFormat;
    use crate::core::rates::RateSource;
    use crate::store::memory::MemoryPreferenceStore;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct Offline;

    #[async_trait]
    impl RateSource for Offline {
        async fn fetch_rates(&self) -> Result<HashMap<String, f64>> {
            Err(anyhow!("offline"))
        }
    }

    fn service(locale: &str) -> CurrencyService {
        CurrencyService::new(
            Arc::new(Offline),
            Arc::new(MemoryPreferenceStore::new()),
            ServiceOptions {
                locale: locale.to_string(),
                price_on_request: "Sur demande".to_string(),
                number_format: NumberFormat {
                    group_separator: " ".to_string(),
                    decimal_separator: ",".to_string(),
                },
            },
        )
    }

    #[test]
    fn test_set_accepts_lowercase_codes() {
        let service = service("de-DE");
        let output = set(&service, " gbp ").unwrap();
        assert!(output.contains("GBP"));
        assert_eq!(service.current_currency().code, "GBP");
        assert!(!service.auto_detect());
    }

    #[test]
    fn test_set_unknown_code_fails() {
        let service = service("de-DE");
        let err = set(&service, "XYZ").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported currency: XYZ");
    }

    #[test]
    fn test_price_and_convert() {
        let service = service("fr-FR");
        assert_eq!(price(&service, None).unwrap(), "Sur demande");
        assert_eq!(price(&service, Some(4200.0)).unwrap(), "€ 4 200");
        assert_eq!(convert(&service, 0.0).unwrap(), "€ 0");
        assert!(convert(&service, -3.0).is_err());
    }

    #[test]
    fn test_detect_uses_given_or_service_locale() {
        let service = service("fr-CH");
        assert!(detect(&service, None).starts_with("fr-CH:"));
        assert!(detect(&service, None).contains("CHF"));
        assert!(detect(&service, Some("en-GB")).contains("GBP"));
    }

    #[test]
    fn test_list_contains_every_currency() {
        let service = service("de-DE");
        let output = list(&service);
        for currency in SUPPORTED_CURRENCIES.iter() {
            assert!(output.contains(currency.code));
        }
        assert!(output.contains("fallback"));
    }

    #[test]
    fn test_show_reports_settings() {
        let service = service("en-CA");
        let output = show(&service);
        assert!(output.contains("CAD"));
        assert!(output.contains("en-CA"));
        assert!(output.contains("fallback"));
    }
}
