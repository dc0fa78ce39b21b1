//! Formatting utilities
//!
//! Centralized currency and percentage formatting so every surface renders
//! values the same way. Statements are euro-denominated and the display
//! follows Italian locale conventions: `.` thousands separator, `,` decimal
//! separator, trailing currency symbol (`1.234,56 €`).

use rust_decimal::Decimal;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Trailing " €" (euro, Italian locale)
    Eur,
    /// No currency symbol (for table cells)
    None,
}

/// Core formatting function with full control over output.
///
/// # Examples
/// ```
/// use dietz::utils::{format_currency_with_width, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(
///     format_currency_with_width(dec!(1234.56), 0, CurrencySymbol::Eur),
///     "1.234,56 €"
/// );
/// assert_eq!(
///     format_currency_with_width(dec!(1234), 12, CurrencySymbol::None),
///     "    1.234,00"
/// );
/// ```
pub fn format_currency_with_width(value: Decimal, width: usize, symbol: CurrencySymbol) -> String {
    let is_negative = value < Decimal::ZERO;
    let abs_value = value.abs();

    // Round to 2 decimal places and format
    let formatted = format!("{:.2}", abs_value);
    let parts: Vec<&str> = formatted.split('.').collect();

    let integer_part = parts[0];
    let decimal_part = parts.get(1).unwrap_or(&"00");

    // Add thousands separators (.) to integer part
    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec!['.', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let suffix = match symbol {
        CurrencySymbol::Eur => " €",
        CurrencySymbol::None => "",
    };

    let result = format!("{}{},{}{}", sign, with_separators, decimal_part, suffix);

    // Apply width padding (right-align)
    if width > 0 && result.chars().count() < width {
        format!("{:>width$}", result, width = width)
    } else {
        result
    }
}

/// Format as euro with trailing symbol: "1.234,56 €"
///
/// # Examples
/// ```
/// use dietz::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1234.56)), "1.234,56 €");
/// assert_eq!(format_currency(dec!(-500)), "-500,00 €");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::Eur)
}

/// Format number only (no symbol): "1.234,56"
pub fn format_decimal_it(value: Decimal) -> String {
    format_currency_with_width(value, 0, CurrencySymbol::None)
}

/// Format a fraction as an Italian-locale percentage with two decimals.
///
/// The analysis core stores returns as fractions; the ×100 happens here,
/// at the presentation edge.
///
/// # Examples
/// ```
/// use dietz::utils::format_percentage;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_percentage(dec!(0.0525)), "5,25%");
/// assert_eq!(format_percentage(dec!(-0.012)), "-1,20%");
/// ```
pub fn format_percentage(fraction: Decimal) -> String {
    let value = fraction * Decimal::from(100);
    format!("{}%", format_currency_with_width(value, 0, CurrencySymbol::None))
}
