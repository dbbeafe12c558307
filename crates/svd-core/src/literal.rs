//! Numeric and boolean literal decoding.
//!
//! Accepted notations:
//!
//! | form        | syntax                 | example   |
//! |-------------|------------------------|-----------|
//! | decimal     | `-?[0-9]+`             | `34`      |
//! | hexadecimal | `0[xX][0-9a-fA-F]+`    | `0x400`   |
//! | binary      | `#[01xX]+`             | `#10x1`   |
//! | scaled size | `[0-9]+[kKmMgGtT]`     | `4k`      |
//!
//! The sign is only accepted by [`parse_i64`]. Binary literals may contain
//! don't-care digits (`x`), which decode as `0` and are tracked separately by
//! [`BitPattern`].

use thiserror::Error;

/// Text did not match any accepted literal form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{text}' is not a valid {expected}")]
pub struct LiteralError {
    /// Offending text as it appeared in the document.
    pub text: String,
    /// Human readable description of the expected form.
    pub expected: &'static str,
}

impl LiteralError {
    pub(crate) fn new(text: &str, expected: &'static str) -> Self {
        LiteralError {
            text: text.to_string(),
            expected,
        }
    }
}

/// Binary value with an optional set of don't-care bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitPattern {
    value: u64,
    care: u64,
}

impl BitPattern {
    /// Pattern matching exactly one value.
    pub const fn exact(value: u64) -> Self {
        BitPattern {
            value,
            care: u64::MAX,
        }
    }

    /// Decoded value with don't-care bits cleared.
    pub const fn value(self) -> u64 {
        self.value
    }

    /// Mask of the bits that take part in matching.
    pub const fn care_mask(self) -> u64 {
        self.care
    }

    pub const fn has_dont_care(self) -> bool {
        self.care != u64::MAX
    }

    /// Whether `raw` agrees with the pattern on every cared-for bit.
    pub const fn matches(self, raw: u64) -> bool {
        raw & self.care == self.value & self.care
    }
}

/// Decode a non-negative integer in any accepted notation.
pub fn parse_u64(text: &str) -> Result<u64, LiteralError> {
    let trimmed = text.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(LiteralError::new(text, "hexadecimal literal"));
        }
        return u64::from_str_radix(hex, 16)
            .map_err(|_| LiteralError::new(text, "64-bit hexadecimal literal"));
    }
    if trimmed.starts_with('#') {
        return parse_pattern(trimmed).map(BitPattern::value);
    }
    let (digits, scale) = split_scale(trimmed);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(LiteralError::new(text, "unsigned integer"));
    }
    digits
        .parse::<u64>()
        .ok()
        .and_then(|value| value.checked_mul(scale))
        .ok_or_else(|| LiteralError::new(text, "64-bit unsigned integer"))
}

/// Decode an integer that may carry a leading minus sign (decimal only).
pub fn parse_i64(text: &str) -> Result<i64, LiteralError> {
    let trimmed = text.trim();
    match trimmed.strip_prefix('-') {
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(LiteralError::new(text, "signed integer"));
            }
            trimmed
                .parse::<i64>()
                .map_err(|_| LiteralError::new(text, "64-bit signed integer"))
        }
        None => {
            let value = parse_u64(trimmed)?;
            i64::try_from(value).map_err(|_| LiteralError::new(text, "64-bit signed integer"))
        }
    }
}

/// Decode `true`/`false` (any case) or `1`/`0`.
pub fn parse_bool(text: &str) -> Result<bool, LiteralError> {
    let trimmed = text.trim();
    if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(LiteralError::new(text, "boolean"))
    }
}

/// Decode a value that may be a binary literal with don't-care digits.
///
/// Non-binary notations produce an exact pattern.
pub fn parse_pattern(text: &str) -> Result<BitPattern, LiteralError> {
    let trimmed = text.trim();
    let Some(digits) = trimmed.strip_prefix('#') else {
        return parse_u64(trimmed).map(BitPattern::exact);
    };
    if digits.is_empty() || digits.len() > 64 {
        return Err(LiteralError::new(text, "binary literal"));
    }
    let mut value = 0u64;
    let mut dont_care = 0u64;
    for digit in digits.bytes() {
        value <<= 1;
        dont_care <<= 1;
        match digit {
            b'0' => {}
            b'1' => value |= 1,
            b'x' | b'X' => dont_care |= 1,
            _ => return Err(LiteralError::new(text, "binary literal")),
        }
    }
    Ok(BitPattern {
        value,
        care: !dont_care,
    })
}

fn split_scale(text: &str) -> (&str, u64) {
    let exponent = match text.as_bytes().last() {
        Some(b'k' | b'K') => 1,
        Some(b'm' | b'M') => 2,
        Some(b'g' | b'G') => 3,
        Some(b't' | b'T') => 4,
        _ => return (text, 1),
    };
    (&text[..text.len() - 1], 1u64 << (10 * exponent))
}
