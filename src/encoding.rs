use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::trace;

/// Symbol value of the stop character, identical for every code set.
pub const STOP_SYMBOL_VALUE: u8 = 106;

/// Checksums are taken modulo the number of Code 128 symbol values.
const CHECKSUM_MODULUS: u64 = 103;

/// First code point outside 7-bit ASCII; from here on the font shift applies.
const EXTENDED_START: u32 = 127;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown code type '{0}' (expected A, B or C)")]
    InvalidCodeType(String),
    #[error("unknown font shift '{0}' (expected common, uncommon or barcodesoft)")]
    InvalidFontShift(String),
    #[error("character '{ch}' (U+{code_point:04X}) at position {position} has no symbol value")]
    UnencodableCharacter {
        ch: char,
        code_point: u32,
        position: usize,
    },
}

/// Code set selected by the start symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CodeType {
    A,
    #[default]
    B,
    C,
}

/// Glyph layout of the barcode font, expressed as the offset that moves
/// symbol values above 94 (and 8-bit characters) into the font's code points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FontShift {
    #[default]
    Common,
    Uncommon,
    Barcodesoft,
}

// Rows are in variant declaration order and indexed by discriminant.
static CODE_TYPES: [(&str, CodeType, u8); 3] = [
    ("A", CodeType::A, 103),
    ("B", CodeType::B, 104),
    ("C", CodeType::C, 105),
];

static FONT_SHIFTS: [(&str, FontShift, u8); 3] = [
    ("common", FontShift::Common, 100),
    ("uncommon", FontShift::Uncommon, 105),
    ("barcodesoft", FontShift::Barcodesoft, 145),
];

impl CodeType {
    /// All code types in registry order.
    pub fn all() -> impl Iterator<Item = CodeType> {
        CODE_TYPES.iter().map(|(_, ty, _)| *ty)
    }

    pub fn name(self) -> &'static str {
        CODE_TYPES[self as usize].0
    }

    /// Symbol value of the start character for this code set.
    pub fn start_value(self) -> u8 {
        CODE_TYPES[self as usize].2
    }
}

impl FontShift {
    pub fn all() -> impl Iterator<Item = FontShift> {
        FONT_SHIFTS.iter().map(|(_, shift, _)| *shift)
    }

    pub fn name(self) -> &'static str {
        FONT_SHIFTS[self as usize].0
    }

    pub fn add_value(self) -> u8 {
        FONT_SHIFTS[self as usize].2
    }
}

impl FromStr for CodeType {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CODE_TYPES
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, ty, _)| *ty)
            .ok_or_else(|| EncodeError::InvalidCodeType(s.to_string()))
    }
}

impl FromStr for FontShift {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FONT_SHIFTS
            .iter()
            .find(|(name, _, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, shift, _)| *shift)
            .ok_or_else(|| EncodeError::InvalidFontShift(s.to_string()))
    }
}

// Stored selectors resolve through the registries like any other name.
impl TryFrom<String> for CodeType {
    type Error = EncodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CodeType> for String {
    fn from(value: CodeType) -> Self {
        value.name().to_string()
    }
}

impl TryFrom<String> for FontShift {
    type Error = EncodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FontShift> for String {
    fn from(value: FontShift) -> Self {
        value.name().to_string()
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for FontShift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A barcode split into its four parts. `Display` yields the font string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBarcode {
    pub start: char,
    pub data: String,
    pub checksum: char,
    pub stop: char,
    /// Checksum symbol value, 0..=102.
    pub checksum_value: u8,
}

impl EncodedBarcode {
    pub fn code_points(&self) -> Vec<u32> {
        self.to_string().chars().map(u32::from).collect()
    }
}

impl fmt::Display for EncodedBarcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}{}", self.start, self.data, self.checksum, self.stop)
    }
}

impl From<EncodedBarcode> for String {
    fn from(value: EncodedBarcode) -> Self {
        value.to_string()
    }
}

pub trait BarcodeEncoding {
    fn name(&self) -> &'static str;
    fn encode(&self, text: &str) -> Result<String, EncodeError>;
    fn is_encodable(&self, text: &str) -> bool {
        self.encode(text).is_ok()
    }
}

/// Code 128 encoder producing strings for Code 128 barcode fonts such as
/// Libre Barcode 128.
///
/// Data characters pass through unchanged, one symbol per character, and are
/// framed by a start symbol, a position-weighted modulo-103 checksum symbol and
/// the stop symbol. Characters below 127 take their standard symbol value
/// (`code point - 32`); from 127 upward the font shift is subtracted instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Code128Encoder {
    code_type: CodeType,
    font_shift: FontShift,
}

impl Code128Encoder {
    pub fn new(code_type: CodeType, font_shift: FontShift) -> Self {
        Self {
            code_type,
            font_shift,
        }
    }

    pub fn code_type(&self) -> CodeType {
        self.code_type
    }

    pub fn font_shift(&self) -> FontShift {
        self.font_shift
    }

    /// Symbol value of a data character at a 1-based position.
    pub fn symbol_value(&self, ch: char, position: usize) -> Result<u32, EncodeError> {
        let code_point = u32::from(ch);
        let offset = if code_point < EXTENDED_START {
            32
        } else {
            u32::from(self.font_shift.add_value())
        };
        code_point
            .checked_sub(offset)
            .ok_or(EncodeError::UnencodableCharacter {
                ch,
                code_point,
                position,
            })
    }

    pub fn encode_parts(&self, text: &str) -> Result<EncodedBarcode, EncodeError> {
        let add = self.font_shift.add_value();
        let start_value = self.code_type.start_value();

        let mut weighted = u64::from(start_value) % CHECKSUM_MODULUS;
        for (idx, ch) in text.chars().enumerate() {
            let position = idx + 1;
            let value = u64::from(self.symbol_value(ch, position)?) % CHECKSUM_MODULUS;
            let weight = position as u64 % CHECKSUM_MODULUS;
            weighted = (weighted + value * weight) % CHECKSUM_MODULUS;
        }
        let checksum_value = weighted as u8;

        // All sums stay below 256: max is 106 + 145.
        let checksum = if checksum_value < 95 {
            char::from(checksum_value + 32)
        } else {
            char::from(checksum_value + add)
        };

        trace!(
            code_type = %self.code_type,
            font_shift = %self.font_shift,
            checksum = checksum_value,
            "encoded {} characters",
            text.chars().count()
        );

        Ok(EncodedBarcode {
            start: char::from(start_value + add),
            data: text.to_string(),
            checksum,
            stop: char::from(STOP_SYMBOL_VALUE + add),
            checksum_value,
        })
    }
}

impl BarcodeEncoding for Code128Encoder {
    fn name(&self) -> &'static str {
        "Code128"
    }

    fn encode(&self, text: &str) -> Result<String, EncodeError> {
        self.encode_parts(text).map(String::from)
    }
}

/// Encode with selectors given by name, e.g. `encode("Kotu-12345", "B", "common")`.
pub fn encode(text: &str, code_type: &str, font_shift: &str) -> Result<String, EncodeError> {
    let code_type: CodeType = code_type.parse()?;
    let font_shift: FontShift = font_shift.parse()?;
    Code128Encoder::new(code_type, font_shift).encode(text)
}
