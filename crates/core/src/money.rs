//! Money helpers.
//!
//! Amounts are `rust_decimal::Decimal` with two fractional digits, matching the
//! backend's `DecimalField(decimal_places=2)` columns. Never use floats for money.

use core::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DomainError, DomainResult};

/// Monetary amount in the business currency (PKR).
pub type Amount = Decimal;

/// Number of fractional digits stored by the backend.
pub const MONEY_SCALE: u32 = 2;

/// Round to the backend's storage precision (half away from zero).
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a user- or wire-supplied amount such as `"1,250.50"` or `"400"`.
pub fn parse_amount(raw: &str) -> DomainResult<Amount> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return Err(DomainError::validation("amount is empty"));
    }
    Decimal::from_str(&cleaned)
        .map_err(|e| DomainError::validation(format!("invalid amount {raw:?}: {e}")))
}

/// `value` percent of `total`, rounded to money precision.
pub fn percent_of(total: Amount, percent: Decimal) -> Amount {
    round_money(total * percent / Decimal::ONE_HUNDRED)
}

/// Render an amount the way statements print it: `Rs. 12,500.00`.
pub fn format_rupees(value: Amount) -> String {
    let rounded = round_money(value);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, ch) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("Rs. -{grouped}.{frac_part}")
    } else {
        format!("Rs. {grouped}.{frac_part}")
    }
}
