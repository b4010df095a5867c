//! Currency and percentage formatting for display (en-US conventions).

use rust_decimal::Decimal;

/// Insert `,` separators every three digits of an unsigned integer string.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `$67,432.10` style currency with exactly two fraction digits.
pub fn usd(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));
    let sign = if value < 0.0 && formatted != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}${}.{frac_part}", group_thousands(int_part))
}

/// `$67,890` style currency rounded to whole dollars.
pub fn whole_dollars(value: f64) -> String {
    let formatted = format!("{:.0}", value.abs());
    let sign = if value < 0.0 && formatted != "0" {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(&formatted))
}

/// Whole-dollar formatting for exact decimal amounts.
pub fn whole_dollars_decimal(value: Decimal) -> String {
    let rounded = value.round();
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${}", group_thousands(&rounded.abs().to_string()))
}

/// Signed percentage with two decimals, e.g. `+2.31%` or `-0.87%`.
pub fn signed_percent(value: f64) -> String {
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}
