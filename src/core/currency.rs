use serde::Serialize;

/// Local currency with its rate relative to 1 USD
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurrencyInfo {
    pub code: &'static str,
    pub symbol: &'static str,
    pub rate: f64,
}

pub const DEFAULT_CURRENCY: CurrencyInfo = CurrencyInfo {
    code: "USD",
    symbol: "$",
    rate: 1.0,
};

/// Country name to currency, rates relative to USD
const CURRENCY_TABLE: &[(&str, CurrencyInfo)] = &[
    ("United States of America", DEFAULT_CURRENCY),
    ("Nigeria", CurrencyInfo { code: "NGN", symbol: "₦", rate: 1600.0 }),
    ("United Kingdom", CurrencyInfo { code: "GBP", symbol: "£", rate: 0.79 }),
    ("Canada", CurrencyInfo { code: "CAD", symbol: "C$", rate: 1.36 }),
    ("India", CurrencyInfo { code: "INR", symbol: "₹", rate: 83.45 }),
    ("Ghana", CurrencyInfo { code: "GHS", symbol: "GH₵", rate: 15.20 }),
    ("Kenya", CurrencyInfo { code: "KES", symbol: "KSh", rate: 131.50 }),
    ("South Africa", CurrencyInfo { code: "ZAR", symbol: "R", rate: 18.80 }),
    ("Pakistan", CurrencyInfo { code: "PKR", symbol: "Rs", rate: 278.50 }),
    ("Mexico", CurrencyInfo { code: "MXN", symbol: "$", rate: 16.70 }),
    ("Brazil", CurrencyInfo { code: "BRL", symbol: "R$", rate: 5.15 }),
    ("United Arab Emirates", CurrencyInfo { code: "AED", symbol: "AED", rate: 3.67 }),
];

/// Currency for a country, falling back to USD for anything unlisted
pub fn get_currency_for_country(country: &str) -> CurrencyInfo {
    CURRENCY_TABLE
        .iter()
        .find(|(name, _)| *name == country)
        .map(|(_, info)| *info)
        .unwrap_or(DEFAULT_CURRENCY)
}

/// Convert a USD amount to the country's currency and format it, e.g. `₦11,200.00`
pub fn format_local_price(usd_amount: f64, country: &str) -> String {
    let info = get_currency_for_country(country);
    format!("{}{}", info.symbol, group_thousands(usd_amount * info.rate))
}

/// Two decimals with comma thousands separators
fn group_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_country() {
        let info = get_currency_for_country("Nigeria");
        assert_eq!(info.code, "NGN");
        assert_eq!(info.rate, 1600.0);
    }

    #[test]
    fn test_unknown_country_defaults_to_usd() {
        assert_eq!(get_currency_for_country("Atlantis"), DEFAULT_CURRENCY);
        assert_eq!(get_currency_for_country("USA"), DEFAULT_CURRENCY);
    }

    #[test]
    fn test_format_local_price() {
        assert_eq!(format_local_price(7.0, "Nigeria"), "₦11,200.00");
        assert_eq!(format_local_price(7.0, "United Kingdom"), "£5.53");
        assert_eq!(format_local_price(7.0, "USA"), "$7.00");
        assert_eq!(format_local_price(1000.0, "Pakistan"), "Rs278,500.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(1234567.5), "1,234,567.50");
    }
}
