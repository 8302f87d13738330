//! Short-code table: user-facing codes such as `C1-2345-6` mapped to the
//! 32-bit error codes they stand for.
//!
//! The table travels as a flat JSON object of short code to hex literal:
//!
//! ```json
//! { "C1-2345-6": "0x80010002" }
//! ```
//!
//! Short codes are matched case-insensitively; the table stores them
//! uppercased.

use crate::codec::{DecodeError, EncodeError};
use crate::codes::{CodeParseError, ErrorCode};
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

// ============================================================================
// Input Resolution
// ============================================================================

/// How a user input was turned into a code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    /// The input was a hex literal.
    Literal(ErrorCode),
    /// The input was a short code, stored here uppercased.
    ShortCode { short_code: String, code: ErrorCode },
}

impl ResolvedInput {
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Literal(code) | Self::ShortCode { code, .. } => *code,
        }
    }
}

impl fmt::Display for ResolvedInput {
    /// `Short code C1-2345-6 -> 0x80010002` for short codes, the bare code
    /// otherwise.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(code) => write!(f, "{code}"),
            Self::ShortCode { short_code, code } => write!(f, "Short code {short_code} -> {code}"),
        }
    }
}

/// User input that names no code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    /// Valid hex, but wider than 32 bits.
    #[error(transparent)]
    TooWide(CodeParseError),

    /// Not hex, and not in the short-code table.
    #[error("`{0}` is an unknown short code or an invalid input")]
    UnknownShortCode(String),
}

// ============================================================================
// Document
// ============================================================================

/// Short-code document entries, keys uppercased, in document order.
struct ShortCodeDocument(Vec<(String, String)>);

impl<'de> Deserialize<'de> for ShortCodeDocument {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ShortCodeVisitor;

        impl<'de> Visitor<'de> for ShortCodeVisitor {
            type Value = ShortCodeDocument;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object mapping short codes to hex literals")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = Vec::new();
                while let Some((short_code, literal)) = access.next_entry::<String, String>()? {
                    entries.push((short_code.trim().to_uppercase(), literal));
                }
                Ok(ShortCodeDocument(entries))
            }
        }

        deserializer.deserialize_map(ShortCodeVisitor)
    }
}

// ============================================================================
// Table
// ============================================================================

/// Mapping of uppercase short codes to error codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShortCodeTable {
    codes: BTreeMap<String, ErrorCode>,
}

impl ShortCodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a short-code document.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Malformed`] if the document is not a JSON object of
    /// strings, or a value is not a 32-bit hex literal. All-or-nothing.
    /// Keys differing only in case name the same short code; the last one in
    /// the document wins.
    pub fn decode(document: &[u8]) -> Result<Self, DecodeError> {
        let ShortCodeDocument(entries) = serde_json::from_slice(document)?;

        let mut table = Self::new();
        for (short_code, literal) in entries {
            let code = literal
                .parse::<ErrorCode>()
                .map_err(|e| DecodeError::malformed(format_args!("short code `{short_code}`: {e}")))?;
            table.insert(&short_code, code);
        }

        debug!(entries = table.len(), "decoded short-code table");
        Ok(table)
    }

    /// Serialize as a JSON object with `0x%08X` values, keys sorted.
    pub fn encode(&self) -> Result<Vec<u8>, EncodeError> {
        let out: BTreeMap<&str, String> = self
            .codes
            .iter()
            .map(|(short_code, code)| (short_code.as_str(), code.to_string()))
            .collect();
        Ok(serde_json::to_vec(&out)?)
    }

    /// Insert or replace a mapping. The short code is uppercased.
    pub fn insert(&mut self, short_code: &str, code: ErrorCode) -> Option<ErrorCode> {
        self.codes.insert(short_code.trim().to_uppercase(), code)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Look up a short code, ignoring case and surrounding whitespace.
    pub fn resolve(&self, short_code: &str) -> Option<ErrorCode> {
        self.codes.get(&short_code.trim().to_uppercase()).copied()
    }

    /// Resolve free-form user input: a hex literal first, then a short code.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sce_errors::{ErrorCode, short_codes::{ShortCodeTable, ResolvedInput}};
    ///
    /// let mut table = ShortCodeTable::new();
    /// table.insert("C1-2345-6", ErrorCode::new(0x8001_0002));
    ///
    /// assert_eq!(table.resolve_input("80010002").unwrap(), ResolvedInput::Literal(ErrorCode::new(0x8001_0002)));
    /// assert_eq!(table.resolve_input("c1-2345-6").unwrap().code(), ErrorCode::new(0x8001_0002));
    /// ```
    pub fn resolve_input(&self, input: &str) -> Result<ResolvedInput, InputError> {
        match input.parse::<ErrorCode>() {
            Ok(code) => Ok(ResolvedInput::Literal(code)),
            Err(err @ CodeParseError::TooWide(_)) => Err(InputError::TooWide(err)),
            Err(_) => {
                let short_code = input.trim().to_uppercase();
                match self.codes.get(&short_code) {
                    Some(code) => Ok(ResolvedInput::ShortCode {
                        short_code,
                        code: *code,
                    }),
                    None => Err(InputError::UnknownShortCode(input.to_owned())),
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
