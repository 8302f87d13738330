//! 32-bit platform error code - the universal key into the database.
//!
//! # Bit Layout
//!
//! ```text
//!  31  30  29-28     27-16          15-0
//! +---+---+------+-------------+-------------+
//! | E | F | RSV  |  FACILITY   |  ERROR_NUM  |
//! +---+---+------+-------------+-------------+
//! ```
//!
//! - **E** (`IS_ERROR`): set for every error code
//! - **F** (`IS_FATAL`): set when the error is fatal
//! - **RSV** (`RESERVED`): always zero in a well-formed code
//! - **FACILITY**: subsystem identifier (0x000-0xFFF)
//! - **ERROR_NUM**: identifier within the facility (0x0000-0xFFFF)
//!
//! # Zero-Allocation Guarantee
//!
//! Everything in this module is `const`-evaluable bit arithmetic. `Display`
//! writes straight to the formatter.
//!
//! # Example
//!
//! ```rust
//! use sce_errors::ErrorCode;
//!
//! let code: ErrorCode = "0x80010002".parse().unwrap();
//! assert!(code.is_error());
//! assert_eq!(code.facility(), 0x001);
//! assert_eq!(code.error_num(), 0x0002);
//! assert_eq!(code.to_string(), "0x80010002");
//! ```

use std::fmt;
use std::str::FromStr;

// ============================================================================
// Bit Layout
// ============================================================================

/// Masks for each field of an [`ErrorCode`].
pub mod masks {
    /// 1 if this is an error code, 0 otherwise.
    pub const IS_ERROR: u32 = 0x8000_0000;
    /// 1 if this is a fatal error, 0 otherwise.
    pub const IS_FATAL: u32 = 0x4000_0000;
    /// Always 0 in a well-formed code.
    pub const RESERVED: u32 = 0x3000_0000;
    /// Facility identifier.
    pub const FACILITY: u32 = 0x0FFF_0000;
    /// Error identifier within the facility.
    pub const ERROR_NUM: u32 = 0x0000_FFFF;

    /// Shift applied to extract the facility field.
    pub const FACILITY_SHIFT: u32 = 16;
}

/// Largest facility id the layout can carry.
pub const MAX_FACILITY: u16 = 0x0FFF;

// ============================================================================
// Error Code
// ============================================================================

/// A raw 32-bit platform error code.
///
/// This is a value, not a stored entity: databases are keyed by the
/// facility and error-num fields extracted from it.
///
/// # Copy Semantics
///
/// Unlike database entries, a code is just four bytes. It is `Copy` and
/// passed by value everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(u32);

impl ErrorCode {
    /// Wrap a raw value. Every `u32` is representable; validity is a
    /// classification question, see [`crate::resolver::classify`].
    #[inline]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Build a well-formed error code from its fields.
    ///
    /// `IS_ERROR` is always set and the reserved bits are always clear.
    /// Facility ids above [`MAX_FACILITY`] are truncated to 12 bits.
    #[inline]
    pub const fn from_parts(fatal: bool, facility: u16, error_num: u16) -> Self {
        let mut raw = masks::IS_ERROR;
        if fatal {
            raw |= masks::IS_FATAL;
        }
        raw |= ((facility as u32) << masks::FACILITY_SHIFT) & masks::FACILITY;
        raw |= error_num as u32;
        Self(raw)
    }

    /// The raw 32-bit value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 & masks::IS_ERROR != 0
    }

    #[inline]
    pub const fn is_fatal(self) -> bool {
        self.0 & masks::IS_FATAL != 0
    }

    /// True when any of bits 29-28 is set.
    #[inline]
    pub const fn has_reserved_bits(self) -> bool {
        self.0 & masks::RESERVED != 0
    }

    /// Facility field (0x000-0xFFF).
    #[inline]
    pub const fn facility(self) -> u16 {
        ((self.0 & masks::FACILITY) >> masks::FACILITY_SHIFT) as u16
    }

    /// Error-num field.
    #[inline]
    pub const fn error_num(self) -> u16 {
        (self.0 & masks::ERROR_NUM) as u16
    }
}

impl From<u32> for ErrorCode {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl From<ErrorCode> for u32 {
    fn from(code: ErrorCode) -> Self {
        code.0
    }
}

impl fmt::Display for ErrorCode {
    /// Zero-allocation formatting: `0x` followed by 8 uppercase hex digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

impl fmt::UpperHex for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&self.0, f)
    }
}

// ============================================================================
// Literal Parsing
// ============================================================================

/// Failure to parse an error code literal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeParseError {
    /// Nothing left after stripping whitespace and the `0x` prefix.
    #[error("empty error code literal")]
    Empty,

    /// A character outside `[0-9a-fA-F]`.
    #[error("invalid hexadecimal digit in `{0}`")]
    InvalidDigit(String),

    /// Valid hex, but more than 32 bits wide.
    #[error("`{0}` is too long - error codes are only 4 bytes wide")]
    TooWide(String),
}

/// Strip surrounding whitespace and an optional `0x`/`0X` prefix.
pub(crate) fn strip_hex_prefix(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed)
}

/// Parse a hexadecimal literal into a `u64`, distinguishing bad digits from
/// overflow. Shared by code literals and the database codec.
pub(crate) fn parse_hex(input: &str) -> Result<u64, CodeParseError> {
    let digits = strip_hex_prefix(input);
    if digits.is_empty() {
        return Err(CodeParseError::Empty);
    }
    if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CodeParseError::InvalidDigit(input.to_owned()));
    }
    // Leading zeros never overflow.
    let significant = digits.trim_start_matches('0');
    if significant.len() > 16 {
        return Err(CodeParseError::TooWide(input.to_owned()));
    }
    if significant.is_empty() {
        return Ok(0);
    }
    u64::from_str_radix(significant, 16).map_err(|_| CodeParseError::InvalidDigit(input.to_owned()))
}

impl FromStr for ErrorCode {
    type Err = CodeParseError;

    /// Parse a hexadecimal literal, with or without `0x` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = parse_hex(s)?;
        u32::try_from(value)
            .map(Self)
            .map_err(|_| CodeParseError::TooWide(s.to_owned()))
    }
}

// ============================================================================
// Tests
// ============================================================================
