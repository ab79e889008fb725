//! Currency figures in free-text award amounts.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;

static FIGURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(?:[$€£]\s*(?P<sym>\d[\d,]*(?:\.\d+)?)\s*(?P<sym_mult>k|m|thousand|million|billion)?\b",
        r"|(?P<bare>\d[\d,]*(?:\.\d+)?)\s*(?P<bare_mult>k|m|thousand|million|billion)?\s*(?:usd|dollars)\b)",
    ))
    .expect("valid amount regex")
});

static LONE_FIGURE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d[\d,]*(?:\.\d+)?)\s*$").expect("valid lone figure regex")
});

/// Largest value the `grants.amount_value` column (`NUMERIC(14,2)`) holds.
pub const MAX_STORED_AMOUNT: Decimal = Decimal::from_parts(276_447_231, 23_283, 0, false, 2);

/// Parse the largest currency figure in `text`.
///
/// Understands `$5,000`, `$2.5k`, `$1 million`, `10000 USD`, and a figure
/// standing alone (`5000`, as models answer when asked for an amount).
/// Ranges such as `$1,000 - $5,000` yield the upper bound. Returns `None`
/// when no figure carries a currency marker, or when the amount is too large
/// to store.
#[must_use]
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let amount = match LONE_FIGURE.captures(text) {
        Some(caps) => Decimal::from_str(&caps[1].replace(',', "")).ok().map(|d| d.round_dp(2)),
        None => largest_marked_figure(text),
    }?;
    (amount <= MAX_STORED_AMOUNT).then_some(amount)
}

fn largest_marked_figure(text: &str) -> Option<Decimal> {
    FIGURE
        .captures_iter(text)
        .filter_map(|caps| {
            let (digits, mult) = match caps.name("sym") {
                Some(d) => (d.as_str(), caps.name("sym_mult")),
                None => (caps.name("bare")?.as_str(), caps.name("bare_mult")),
            };
            let base = Decimal::from_str(&digits.replace(',', "")).ok()?;
            let factor = match mult.map(|m| m.as_str().to_lowercase()).as_deref() {
                Some("k" | "thousand") => Decimal::from(1_000),
                Some("m" | "million") => Decimal::from(1_000_000),
                Some("billion") => Decimal::from(1_000_000_000),
                _ => Decimal::ONE,
            };
            base.checked_mul(factor)
        })
        .max()
        .map(|d| d.round_dp(2))
}
