//! Decimal string syntax: parsing number literals and the General Decimal
//! Arithmetic to-scientific-string / plain-string renderings.

use num_bigint::{BigInt, BigUint};
use num_traits::{Signed, ToPrimitive, Zero};

use crate::digits::Radix;
use crate::scaled::Scaled;
use crate::{NumberKind, NumericError};

fn syntax(input: &str) -> NumericError {
    NumericError::Parse(input.to_string())
}

fn parse_digits(digits: &[u8]) -> Option<BigUint> {
    if digits.is_empty() {
        return Some(BigUint::zero());
    }
    BigUint::parse_bytes(digits, 10)
}

/// Parses `[+-]` followed by a decimal literal (`12`, `1.5`, `.5`, `2.`,
/// `1e-7`), `Infinity`/`Inf`, or `NaN`/`sNaN` with an optional digit payload.
/// Keywords are case-insensitive.
pub(crate) fn parse_decimal(input: &str) -> Result<Scaled, NumericError> {
    let bytes = input.as_bytes();
    let (negative, body) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        Some(b'+') => (false, &bytes[1..]),
        _ => (false, bytes),
    };
    if body.is_empty() {
        return Err(syntax(input));
    }
    if body[0].is_ascii_alphabetic() {
        return parse_special(input, negative, body);
    }

    let mut x = 0;
    let int_start = x;
    while x < body.len() && body[x].is_ascii_digit() {
        x += 1;
    }
    let int_digits = &body[int_start..x];
    let mut frac_digits: &[u8] = &[];
    if x < body.len() && body[x] == b'.' {
        x += 1;
        let start = x;
        while x < body.len() && body[x].is_ascii_digit() {
            x += 1;
        }
        frac_digits = &body[start..x];
    }
    if int_digits.is_empty() && frac_digits.is_empty() {
        return Err(syntax(input));
    }
    let mut exponent = BigInt::zero();
    if x < body.len() && (body[x] == b'e' || body[x] == b'E') {
        x += 1;
        let start = x;
        if x < body.len() && (body[x] == b'+' || body[x] == b'-') {
            x += 1;
        }
        let digits_start = x;
        while x < body.len() && body[x].is_ascii_digit() {
            x += 1;
        }
        if digits_start == x {
            return Err(syntax(input));
        }
        exponent = BigInt::parse_bytes(&body[start..x], 10).ok_or_else(|| syntax(input))?;
    }
    if x != body.len() {
        return Err(syntax(input));
    }

    let mut digits = Vec::with_capacity(int_digits.len() + frac_digits.len());
    digits.extend_from_slice(int_digits);
    digits.extend_from_slice(frac_digits);
    let mantissa = parse_digits(&digits).ok_or_else(|| syntax(input))?;
    exponent -= BigInt::from(frac_digits.len());
    Ok(Scaled::finite(Radix::Decimal, negative, mantissa, exponent))
}

fn parse_special(input: &str, negative: bool, body: &[u8]) -> Result<Scaled, NumericError> {
    let lower = body.to_ascii_lowercase();
    if lower == b"infinity" || lower == b"inf" {
        return Ok(Scaled::infinity(Radix::Decimal, negative));
    }
    let (kind, rest) = if let Some(rest) = lower.strip_prefix(b"snan") {
        (NumberKind::SignalingNaN, rest)
    } else if let Some(rest) = lower.strip_prefix(b"nan") {
        (NumberKind::QuietNaN, rest)
    } else {
        return Err(syntax(input));
    };
    if !rest.iter().all(u8::is_ascii_digit) {
        return Err(syntax(input));
    }
    let payload = parse_digits(rest).ok_or_else(|| syntax(input))?;
    Ok(Scaled::special(Radix::Decimal, kind, negative, payload))
}

fn special_string(value: &Scaled) -> Option<String> {
    let sign = if value.negative { "-" } else { "" };
    let payload = || {
        if value.mantissa.is_zero() {
            String::new()
        } else {
            value.mantissa.to_string()
        }
    };
    match value.kind {
        NumberKind::Finite => None,
        NumberKind::Infinity => Some(format!("{sign}Infinity")),
        NumberKind::QuietNaN => Some(format!("{sign}NaN{}", payload())),
        NumberKind::SignalingNaN => Some(format!("{sign}sNaN{}", payload())),
    }
}

/// Places a decimal point `point` digits from the left of `coefficient`,
/// padding with zeros on either side as needed.
fn with_point(coefficient: &str, point: i64) -> String {
    let len = coefficient.len() as i64;
    if point <= 0 {
        format!("0.{}{}", "0".repeat((-point) as usize), coefficient)
    } else if point >= len {
        format!("{}{}", coefficient, "0".repeat((point - len) as usize))
    } else {
        let (int, frac) = coefficient.split_at(point as usize);
        format!("{int}.{frac}")
    }
}

/// To-scientific-string of a decimal value.
pub(crate) fn to_scientific(value: &Scaled) -> String {
    if let Some(special) = special_string(value) {
        return special;
    }
    let sign = if value.negative { "-" } else { "" };
    let coefficient = value.mantissa.to_string();
    let adjusted = &value.exponent + BigInt::from(coefficient.len() - 1);
    if !value.exponent.is_positive() && adjusted >= BigInt::from(-6) {
        // Bounded by the coefficient length here.
        let exponent = value.exponent.to_i64().unwrap_or(0);
        if exponent == 0 {
            return format!("{sign}{coefficient}");
        }
        return format!(
            "{sign}{}",
            with_point(&coefficient, coefficient.len() as i64 + exponent)
        );
    }
    let (lead, rest) = coefficient.split_at(1);
    let exp_sign = if adjusted.is_negative() { "" } else { "+" };
    if rest.is_empty() {
        format!("{sign}{lead}E{exp_sign}{adjusted}")
    } else {
        format!("{sign}{lead}.{rest}E{exp_sign}{adjusted}")
    }
}

/// Positional rendering with no exponent.
pub(crate) fn to_plain(value: &Scaled) -> String {
    if let Some(special) = special_string(value) {
        return special;
    }
    let sign = if value.negative { "-" } else { "" };
    let coefficient = value.mantissa.to_string();
    match value.exponent.to_i64() {
        Some(e) if e >= 0 => {
            if value.mantissa.is_zero() {
                format!("{sign}0")
            } else {
                format!("{sign}{coefficient}{}", "0".repeat(e as usize))
            }
        }
        Some(e) => format!(
            "{sign}{}",
            with_point(&coefficient, coefficient.len() as i64 + e)
        ),
        // Unrepresentable positions fall back to exponent notation.
        None => to_scientific(value),
    }
}
