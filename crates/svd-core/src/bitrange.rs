use thiserror::Error;
use tracing::debug;

use crate::error::SvdError;
use crate::extract::Reader;

/// Errors produced while decoding a bit range or moving values through it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BitRangeError {
    /// The range covers no bits.
    #[error("bit range at offset {offset} has zero width")]
    ZeroWidth { offset: u32 },
    /// The range reaches past the 64-bit limit or the register width.
    #[error("bit range [{msb}:{offset}] exceeds {limit} bits")]
    OutOfRange { offset: u32, msb: u32, limit: u32 },
    /// Provided value does not fit into the range.
    #[error("value {value} does not fit {width} bits")]
    ValueTooWide { width: u32, value: u64 },
    /// `bitRange` text is not of the form `[msb:lsb]`.
    #[error("'{text}' is not a bit range of the form [msb:lsb]")]
    Syntax { text: String },
}

/// Notation a field used to describe its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BitRangeForm {
    /// `bitOffset` + `bitWidth`.
    OffsetWidth,
    /// `lsb` + `msb`.
    LsbMsb,
    /// `bitRange` written as `[msb:lsb]`.
    Pattern,
}

/// Position of a field inside its register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BitRange {
    offset: u32,
    width: u32,
    form: BitRangeForm,
}

impl BitRange {
    pub fn new(offset: u32, width: u32, form: BitRangeForm) -> Result<Self, BitRangeError> {
        if width == 0 {
            return Err(BitRangeError::ZeroWidth { offset });
        }
        let msb = offset.saturating_add(width - 1);
        if msb >= 64 {
            return Err(BitRangeError::OutOfRange {
                offset,
                msb,
                limit: 64,
            });
        }
        Ok(BitRange {
            offset,
            width,
            form,
        })
    }

    /// Parse the `[msb:lsb]` notation.
    pub fn from_pattern(text: &str) -> Result<Self, BitRangeError> {
        let syntax = || BitRangeError::Syntax {
            text: text.to_string(),
        };
        let inner = text
            .trim()
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .ok_or_else(syntax)?;
        let (msb, lsb) = inner.split_once(':').ok_or_else(syntax)?;
        let msb: u32 = msb.trim().parse().map_err(|_| syntax())?;
        let lsb: u32 = lsb.trim().parse().map_err(|_| syntax())?;
        if msb < lsb {
            return Err(syntax());
        }
        BitRange::from_bounds(lsb, msb, BitRangeForm::Pattern)
    }

    /// Range spanning `lsb..=msb`; callers guarantee `lsb <= msb`.
    fn from_bounds(lsb: u32, msb: u32, form: BitRangeForm) -> Result<Self, BitRangeError> {
        if msb >= 64 {
            return Err(BitRangeError::OutOfRange {
                offset: lsb,
                msb,
                limit: 64,
            });
        }
        BitRange::new(lsb, msb - lsb + 1, form)
    }

    /// Read whichever of the three notations the field node uses.
    pub(crate) fn read(reader: &Reader<'_>) -> Result<Self, SvdError> {
        let range = if let Some(offset) = reader.optional::<u32>("bitOffset")? {
            let width = reader.required::<u32>("bitWidth")?;
            BitRange::new(offset, width, BitRangeForm::OffsetWidth)
        } else if let Some(lsb) = reader.optional::<u32>("lsb")? {
            let msb = reader.required::<u32>("msb")?;
            if msb < lsb {
                return Err(SvdError::malformed(
                    reader.kind(),
                    format!("msb {msb} is below lsb {lsb}"),
                ));
            }
            BitRange::from_bounds(lsb, msb, BitRangeForm::LsbMsb)
        } else {
            let text = reader.required::<String>("bitRange")?;
            BitRange::from_pattern(&text)
        };
        range.map_err(|err| SvdError::malformed(reader.kind(), err.to_string()))
    }

    /// Least significant bit.
    pub fn lsb(&self) -> u32 {
        self.offset
    }

    /// Most significant bit.
    pub fn msb(&self) -> u32 {
        self.offset + self.width - 1
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn form(&self) -> BitRangeForm {
        self.form
    }

    /// Mask of the range within the register.
    pub fn mask(&self) -> u64 {
        field_mask(self.width) << self.offset
    }

    /// Whether the range fits a register of `size` bits.
    pub fn fits(&self, size: u32) -> bool {
        self.msb() < size
    }

    /// Extract the field value from a raw register value.
    pub fn extract(&self, raw: u64) -> u64 {
        let value = (raw >> self.offset) & field_mask(self.width);
        debug!(
            offset = self.offset,
            width = self.width,
            raw,
            value,
            "extract bit range"
        );
        value
    }

    /// Replace the field inside `raw` with `value`.
    pub fn insert(&self, raw: u64, value: u64) -> Result<u64, BitRangeError> {
        if value > field_mask(self.width) {
            return Err(BitRangeError::ValueTooWide {
                width: self.width,
                value,
            });
        }
        let result = (raw & !self.mask()) | (value << self.offset);
        debug!(
            offset = self.offset,
            width = self.width,
            raw,
            value,
            result,
            "insert bit range"
        );
        Ok(result)
    }
}

fn field_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}
