use bigdecimal::{BigDecimal, One};
use std::str::FromStr;

/// Number of fractional digits kept on every balance mutation.
pub const CENT_SCALE: i64 = 2;

pub fn zero_cents() -> BigDecimal {
    BigDecimal::from(0).with_scale(CENT_SCALE)
}

/// Drops fractional cents: `floor(amount * 100) / 100`, always at scale 2.
///
/// Works on exact decimals, so an amount that is already a whole number of
/// cents comes back unchanged. Negative amounts floor away from zero
/// (`-5.999` becomes `-6.00`), so the result never exceeds the input.
pub fn truncate_to_cents(amount: &BigDecimal) -> BigDecimal {
    let shifted = amount.clone() * BigDecimal::from(100);
    let whole = shifted.with_scale(0);
    let floored = if whole > shifted {
        whole - BigDecimal::one()
    } else {
        whole
    };
    let (cents, _) = floored.with_scale(0).as_bigint_and_exponent();
    BigDecimal::new(cents, CENT_SCALE)
}

/// Longest amount text accepted from a request.
pub const MAX_AMOUNT_LEN: usize = 40;

/// Largest decimal exponent, either way, an amount may carry. Rescaling to
/// cents costs a power of ten of this size.
pub const MAX_AMOUNT_SCALE: i64 = 18;

/// Parses a decimal amount as it arrives on the query string.
pub fn parse_amount(raw: &str) -> Result<BigDecimal, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("amount must not be empty".to_string());
    }
    if trimmed.len() > MAX_AMOUNT_LEN {
        return Err(format!("amount must be at most {} characters", MAX_AMOUNT_LEN));
    }
    let amount = BigDecimal::from_str(trimmed)
        .map_err(|_| format!("'{}' is not a valid decimal amount", raw))?;

    let (_, scale) = amount.as_bigint_and_exponent();
    if !(-MAX_AMOUNT_SCALE..=MAX_AMOUNT_SCALE).contains(&scale) {
        return Err(format!("'{}' is out of the supported amount range", trimmed));
    }
    Ok(amount)
}
