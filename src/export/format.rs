//! Display formatting for exported reports (es-PE conventions)

use chrono::{Datelike, NaiveDate};

use crate::simulation::Currency;

/// Placeholder for missing values
pub const MISSING: &str = "-";

/// Round to 2 decimals, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `"S/ 1,234.56"` or `"$ 1,234.56"`; `-` when absent
pub fn format_currency(value: Option<f64>, currency: Currency) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{} {}", currency.symbol(), group_thousands(round2(v))),
        _ => MISSING.to_string(),
    }
}

/// Percentage with 4 decimals; fractions below 1 are scaled by 100
pub fn format_percent(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => {
            let percent = if v < 1.0 { v * 100.0 } else { v };
            format!("{:.4}%", percent)
        }
        _ => MISSING.to_string(),
    }
}

/// `d/m/yyyy` without padding
pub fn format_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{}/{}/{}", d.day(), d.month(), d.year()),
        None => MISSING.to_string(),
    }
}

/// Two decimals with comma thousands separators
pub fn group_thousands(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && formatted != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// Replace every character outside `[A-Za-z0-9]` with `_`
pub fn sanitize_file_component(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// `Simulacion_{client}_{YYYY-MM-DD}`
pub fn file_stem(client_name: Option<&str>, date: NaiveDate) -> String {
    let client = match client_name {
        Some(name) if !name.is_empty() => name,
        _ => "simulacion",
    };
    format!(
        "Simulacion_{}_{}",
        sanitize_file_component(client),
        date.format("%Y-%m-%d")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency() {
        assert_eq!(format_currency(Some(1234.5), Currency::Pen), "S/ 1,234.50");
        assert_eq!(format_currency(Some(8856.2067), Currency::Usd), "$ 8,856.21");
        assert_eq!(format_currency(Some(1_250_000.0), Currency::Pen), "S/ 1,250,000.00");
        assert_eq!(format_currency(Some(-42.0), Currency::Pen), "S/ -42.00");
        assert_eq!(format_currency(None, Currency::Pen), "-");
    }

    #[test]
    fn test_group_thousands_edges() {
        assert_eq!(group_thousands(0.0), "0.00");
        assert_eq!(group_thousands(999.999), "1,000.00");
        assert_eq!(group_thousands(100_000.0), "100,000.00");
        assert_eq!(group_thousands(-0.001), "0.00");
    }

    #[test]
    fn test_percent() {
        assert_eq!(format_percent(Some(0.12)), "12.0000%");
        assert_eq!(format_percent(Some(0.009488792934583046)), "0.9489%");
        assert_eq!(format_percent(Some(12.5)), "12.5000%");
        assert_eq!(format_percent(None), "-");
    }

    #[test]
    fn test_date() {
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2025, 3, 7)), "7/3/2025");
        assert_eq!(format_date(None), "-");
    }

    #[test]
    fn test_file_stem() {
        let date = NaiveDate::from_ymd_opt(2025, 11, 4).unwrap();
        assert_eq!(file_stem(Some("José Pérez"), date), "Simulacion_Jos__P_rez_2025-11-04");
        assert_eq!(file_stem(None, date), "Simulacion_simulacion_2025-11-04");
    }
}
