// SPDX-License-Identifier: Apache-2.0

/// Formats `amount` with two decimals and `,` between thousands groups,
/// e.g. `1234567.5` becomes `1,234,567.50`.
#[must_use]
pub fn format_thousands(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3 + 4);
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount.is_sign_negative() { "-" } else { "" };
    format!("{sign}{grouped}.{cents}")
}

#[must_use]
pub fn format_business_value(currency: &str, amount: f64) -> String {
    format!("{currency} {}", format_thousands(amount))
}
