//! Currency formatting for the deployment's currency.
//!
//! Amounts rendered on the server use [CurrencyFormat::format]. Charts format
//! their axis ticks and tooltips in the browser, so [CurrencyFormat] also
//! carries the locale and ISO currency code for `Intl.NumberFormat`.

use charming::element::JsFunction;

/// How to display money amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyFormat {
    /// Prefix for amounts, e.g. "R".
    pub symbol: String,
    /// ISO 4217 currency code used by the browser, e.g. "ZAR".
    pub code: String,
    /// BCP 47 locale used by the browser, e.g. "en-ZA".
    pub locale: String,
    /// Separator between groups of three digits.
    pub group_separator: char,
    /// Separator between the whole and fractional part.
    pub decimal_separator: char,
}

impl Default for CurrencyFormat {
    /// South African Rand.
    fn default() -> Self {
        Self {
            symbol: "R".to_owned(),
            code: "ZAR".to_owned(),
            locale: "en-ZA".to_owned(),
            group_separator: ' ',
            decimal_separator: ',',
        }
    }
}

impl CurrencyFormat {
    /// Format `number` with two decimal places, e.g. "R1 234,50" or "-R12,00".
    ///
    /// Amounts beyond `u128::MAX` are clamped to it.
    pub fn format(&self, number: f64) -> String {
        let amount = number.abs();
        // The whole part stays exact: every f64 from 2^53 up is an integer.
        let mut whole = amount.trunc() as u128;
        let mut fraction = ((amount - amount.trunc()) * 100.0).round() as u128;

        if fraction == 100 {
            whole += 1;
            fraction = 0;
        }

        let sign = if number < 0.0 && (whole > 0 || fraction > 0) {
            "-"
        } else {
            ""
        };
        let whole = group_digits(&whole.to_string(), self.group_separator);

        format!(
            "{sign}{}{whole}{}{fraction:02}",
            self.symbol, self.decimal_separator
        )
    }

    /// A JavaScript function that formats numbers as currency in the browser.
    ///
    /// Missing values are displayed as "-".
    pub fn js_formatter(&self) -> JsFunction {
        JsFunction::new_with_args(
            "number",
            &format!(
                "const currencyFormatter = new Intl.NumberFormat('{}', {{
                      style: 'currency',
                      currency: '{}',
                      minimumFractionDigits: 2,
                      maximumFractionDigits: 2
                    }});
                    return (number || number === 0) ? currencyFormatter.format(number) : \"-\";",
                self.locale, self.code
            ),
        )
    }
}

/// Insert `separator` between groups of three digits, counting from the right.
fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(separator);
        }
        grouped.push(digit);
    }

    grouped
}
