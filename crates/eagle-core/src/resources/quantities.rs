//! Kubernetes quantity parsing
//!
//! Quantities are strings such as `"500m"`, `"2"`, `"1.5Gi"` or `"1e3"`.
//! They are parsed with integer arithmetic into thousandths of a unit and
//! rounded up, the same way the API server reports `MilliValue`/`Value`.

use thiserror::Error;

/// Quantity parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("Empty quantity")]
    Empty,

    #[error("Invalid quantity number: {0}")]
    InvalidNumber(String),

    #[error("Unknown quantity suffix '{suffix}' in {quantity}")]
    UnknownSuffix { quantity: String, suffix: String },

    #[error("Quantity out of range: {0}")]
    Overflow(String),

    #[error("Negative quantity not allowed: {0}")]
    Negative(String),
}

/// Multiplier of a suffix as a `(numerator, denominator)` pair
fn suffix_multiplier(quantity: &str, suffix: &str) -> Result<(i128, i128), QuantityError> {
    let multiplier = match suffix {
        "" => (1, 1),
        "n" => (1, 1_000_000_000),
        "u" => (1, 1_000_000),
        "m" => (1, 1_000),
        "k" => (1_000, 1),
        "M" => (1_000_000, 1),
        "G" => (1_000_000_000, 1),
        "T" => (1_000_000_000_000, 1),
        "P" => (1_000_000_000_000_000, 1),
        "E" => (1_000_000_000_000_000_000, 1),
        "Ki" => (1 << 10, 1),
        "Mi" => (1 << 20, 1),
        "Gi" => (1 << 30, 1),
        "Ti" => (1 << 40, 1),
        "Pi" => (1 << 50, 1),
        "Ei" => (1 << 60, 1),
        _ => return exponent_multiplier(quantity, suffix),
    };
    Ok(multiplier)
}

/// Decimal exponent suffix (`e3`, `E-2`)
fn exponent_multiplier(quantity: &str, suffix: &str) -> Result<(i128, i128), QuantityError> {
    let unknown = || QuantityError::UnknownSuffix {
        quantity: quantity.to_string(),
        suffix: suffix.to_string(),
    };

    let exponent = suffix
        .strip_prefix('e')
        .or_else(|| suffix.strip_prefix('E'))
        .ok_or_else(unknown)?;
    let exponent: i32 = exponent.parse().map_err(|_| unknown())?;

    if exponent.unsigned_abs() > 18 {
        return Err(QuantityError::Overflow(quantity.to_string()));
    }

    let power = 10i128.pow(exponent.unsigned_abs());
    if exponent >= 0 {
        Ok((power, 1))
    } else {
        Ok((1, power))
    }
}

fn parse_digits(quantity: &str, digits: &str) -> Result<i128, QuantityError> {
    if digits.is_empty() {
        return Ok(0);
    }
    if digits.len() > 30 {
        return Err(QuantityError::Overflow(quantity.to_string()));
    }
    digits
        .parse::<i128>()
        .map_err(|_| QuantityError::InvalidNumber(quantity.to_string()))
}

/// Parse a quantity into thousandths of its unit, rounding up
pub fn parse_milli_value(quantity: &str) -> Result<i128, QuantityError> {
    let s = quantity.trim();
    if s.is_empty() {
        return Err(QuantityError::Empty);
    }

    let (negative, body) = if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    };

    let number_end = body
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(body.len());
    let (number, suffix) = body.split_at(number_end);

    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if (int_part.is_empty() && frac_part.is_empty()) || frac_part.contains('.') {
        return Err(QuantityError::InvalidNumber(quantity.to_string()));
    }

    let overflow = || QuantityError::Overflow(quantity.to_string());

    let scale = u32::try_from(frac_part.len())
        .ok()
        .and_then(|len| 10i128.checked_pow(len))
        .ok_or_else(overflow)?;
    let mantissa = parse_digits(quantity, int_part)?
        .checked_mul(scale)
        .and_then(|v| v.checked_add(parse_digits(quantity, frac_part).ok()?))
        .ok_or_else(overflow)?;

    let (mul_num, mul_den) = suffix_multiplier(quantity, suffix)?;

    let numerator = mantissa
        .checked_mul(mul_num)
        .and_then(|v| v.checked_mul(1000))
        .ok_or_else(overflow)?;
    let denominator = scale.checked_mul(mul_den).ok_or_else(overflow)?;

    let milli = numerator / denominator + i128::from(numerator % denominator != 0);

    Ok(if negative { -milli } else { milli })
}

/// Parse a CPU quantity into millicores (e.g., "2" -> 2000, "250m" -> 250)
pub fn parse_cpu(quantity: &str) -> Result<i64, QuantityError> {
    let milli = parse_milli_value(quantity)?;
    i64::try_from(milli).map_err(|_| QuantityError::Overflow(quantity.to_string()))
}

/// Parse a whole-unit quantity such as memory bytes (e.g., "1Gi", "128974848", "1.5k")
pub fn parse_memory(quantity: &str) -> Result<i64, QuantityError> {
    let milli = parse_milli_value(quantity)?;
    let value = if milli >= 0 {
        milli / 1000 + i128::from(milli % 1000 != 0)
    } else {
        milli / 1000
    };
    i64::try_from(value).map_err(|_| QuantityError::Overflow(quantity.to_string()))
}
