//! JSON wire format for error databases.
//!
//! # Document Shape
//!
//! ```json
//! {
//!   "001": {
//!     "name": "Kernel",
//!     "description": "Kernel core",
//!     "blacklist": [ { "min": "0010", "max": "0020" } ],
//!     "errors": {
//!       "0001": { "name": "NO_MEMORY", "description": "Out of memory" }
//!     }
//!   }
//! }
//! ```
//!
//! JSON keys cannot be integers, so facility ids, error-nums and blacklist
//! bounds travel as hexadecimal strings. Decoding accepts an optional `0x`
//! prefix; encoding always writes bare, zero-padded, uppercase digits
//! (3 for facilities, 4 for error-nums and bounds).
//!
//! # Atomicity
//!
//! Decoding is all-or-nothing. The wire structs are fully deserialized and
//! validated before a single [`Database`] node is built, so a failure never
//! leaves a partial database behind.

use crate::codes::{MAX_FACILITY, parse_hex};
use crate::models::{Blacklist, BlacklistEntry, Database, ErrorEntry, Facility};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace};

// ============================================================================
// Errors
// ============================================================================

/// The document could not be turned into a [`Database`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Not UTF-8 JSON, a required field is missing, a hex literal is bad or
    /// out of range, or a blacklist range is inverted.
    #[error("malformed error database: {0}")]
    Malformed(String),
}

impl DecodeError {
    pub(crate) fn malformed(detail: impl fmt::Display) -> Self {
        Self::Malformed(detail.to_string())
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err)
    }
}

/// The database could not be serialized.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("failed to serialize error database: {0}")]
    Serialize(#[from] serde_json::Error),

    /// A facility id that does not fit the 12-bit field would not decode back.
    #[error("facility id 0x{0:X} does not fit the 12-bit facility field")]
    FacilityOutOfRange(u16),
}

// ============================================================================
// Configuration
// ============================================================================

/// Output layout for [`encode_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeStyle {
    /// Single line, no insignificant whitespace. Byte-stable.
    #[default]
    Compact,
    /// Indented, for human review of database files.
    Pretty,
}

// ============================================================================
// Hex Helpers
// ============================================================================

/// Parse a hex field and check it against the field's maximum.
pub(crate) fn hex_field(input: &str, max: u16, what: &str) -> Result<u16, String> {
    let value = parse_hex(input).map_err(|e| format!("{what}: {e}"))?;
    u16::try_from(value)
        .ok()
        .filter(|v| *v <= max)
        .ok_or_else(|| format!("{what} `{input}` exceeds 0x{max:X}"))
}

/// Object whose keys are hex ids, parsed in document order so that a
/// repeated id (however it is spelled) resolves to the last occurrence.
struct HexKeyed<T, const MAX: u16>(BTreeMap<u16, T>);

impl<'de, T, const MAX: u16> Deserialize<'de> for HexKeyed<T, MAX>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HexKeyedVisitor<T, const MAX: u16>(PhantomData<T>);

        impl<'de, T, const MAX: u16> Visitor<'de> for HexKeyedVisitor<T, MAX>
        where
            T: Deserialize<'de>,
        {
            type Value = HexKeyed<T, MAX>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an object keyed by hexadecimal ids up to 0x{MAX:X}")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut entries = BTreeMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    let id = hex_field(&key, MAX, "key").map_err(de::Error::custom)?;
                    let value = access.next_value::<T>()?;
                    entries.insert(id, value);
                }
                Ok(HexKeyed(entries))
            }
        }

        deserializer.deserialize_map(HexKeyedVisitor(PhantomData))
    }
}

// ============================================================================
// Wire Types (decode side)
// ============================================================================

#[derive(Deserialize)]
struct WireError {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Deserialize)]
struct WireRange {
    min: String,
    max: String,
}

#[derive(Deserialize)]
struct WireFacility {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    blacklist: Option<Vec<WireRange>>,
    errors: HexKeyed<WireError, { u16::MAX }>,
}

type WireDatabase = HexKeyed<WireFacility, { MAX_FACILITY }>;

fn build_blacklist(facility: u16, ranges: Vec<WireRange>) -> Result<Blacklist, DecodeError> {
    ranges
        .into_iter()
        .map(|range| {
            let min = hex_field(&range.min, u16::MAX, "blacklist min").map_err(DecodeError::Malformed)?;
            let max = hex_field(&range.max, u16::MAX, "blacklist max").map_err(DecodeError::Malformed)?;
            BlacklistEntry::new(min, max)
                .map_err(|e| DecodeError::malformed(format_args!("facility 0x{facility:03X}: {e}")))
        })
        .collect()
}

fn build_facility(id: u16, wire: WireFacility) -> Result<Facility, DecodeError> {
    let blacklist = build_blacklist(id, wire.blacklist.unwrap_or_default())?;
    let errors = wire
        .errors
        .0
        .into_iter()
        .map(|(num, e)| {
            (
                num,
                ErrorEntry {
                    name: e.name,
                    description: e.description,
                },
            )
        })
        .collect();

    Ok(Facility {
        name: wire.name,
        description: wire.description,
        blacklist,
        errors,
    })
}

// ============================================================================
// Wire Types (encode side)
// ============================================================================

#[derive(Serialize)]
struct ErrorOut<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct RangeOut {
    min: String,
    max: String,
}

#[derive(Serialize)]
struct FacilityOut<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    blacklist: Vec<RangeOut>,
    errors: BTreeMap<String, ErrorOut<'a>>,
}

impl<'a> From<&'a Facility> for FacilityOut<'a> {
    fn from(facility: &'a Facility) -> Self {
        Self {
            name: &facility.name,
            description: facility.description.as_deref(),
            blacklist: facility
                .blacklist
                .iter()
                .map(|range| RangeOut {
                    min: format!("{:04X}", range.min()),
                    max: format!("{:04X}", range.max()),
                })
                .collect(),
            errors: facility
                .errors
                .iter()
                .map(|(num, e)| {
                    (
                        format!("{num:04X}"),
                        ErrorOut {
                            name: &e.name,
                            description: e.description.as_deref(),
                        },
                    )
                })
                .collect(),
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Parse a JSON document into a [`Database`].
///
/// # Errors
///
/// [`DecodeError::Malformed`] on invalid UTF-8/JSON, a missing `name` or
/// `errors` field, an unparsable or out-of-range hex literal, or an inverted
/// blacklist range. Nothing is returned on failure.
///
/// # Example
///
/// ```rust
/// let doc = br#"{"001": {"name": "Kernel", "errors": {"0001": {"name": "NO_MEMORY"}}}}"#;
/// let db = sce_errors::codec::decode(doc).unwrap();
/// assert_eq!(db.facility(0x001).unwrap().name, "Kernel");
/// ```
pub fn decode(document: &[u8]) -> Result<Database, DecodeError> {
    let wire: WireDatabase = serde_json::from_slice(document).map_err(|e| {
        debug!(error = %e, bytes = document.len(), "rejected error database");
        DecodeError::from(e)
    })?;

    let mut db = Database::new();
    for (id, facility) in wire.0 {
        trace!(facility = id, "decoding facility");
        db.insert(id, build_facility(id, facility)?);
    }

    debug!(
        facilities = db.len(),
        errors = db.error_count(),
        "decoded error database"
    );
    Ok(db)
}

/// [`decode`] for callers already holding a `str`.
pub fn decode_str(document: &str) -> Result<Database, DecodeError> {
    decode(document.as_bytes())
}

/// Serialize a [`Database`] as compact JSON.
///
/// Output is deterministic: the same database always yields the same bytes,
/// with keys in ascending id order.
pub fn encode(db: &Database) -> Result<Vec<u8>, EncodeError> {
    encode_with(db, EncodeStyle::Compact)
}

/// Serialize a [`Database`] with an explicit [`EncodeStyle`].
pub fn encode_with(db: &Database, style: EncodeStyle) -> Result<Vec<u8>, EncodeError> {
    let mut out: BTreeMap<String, FacilityOut<'_>> = BTreeMap::new();
    for (id, facility) in db {
        if *id > MAX_FACILITY {
            return Err(EncodeError::FacilityOutOfRange(*id));
        }
        out.insert(format!("{id:03X}"), FacilityOut::from(facility));
    }

    let bytes = match style {
        EncodeStyle::Compact => serde_json::to_vec(&out)?,
        EncodeStyle::Pretty => serde_json::to_vec_pretty(&out)?,
    };
    debug!(facilities = db.len(), bytes = bytes.len(), ?style, "encoded error database");
    Ok(bytes)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "001": {
            "name": "Kernel",
            "description": "Kernel core",
            "blacklist": [ { "min": "0x0010", "max": "0x0020" } ],
            "errors": {
                "0001": { "name": "NO_MEMORY", "description": "Out of memory" },
                "0x0002": { "name": "NOT_FOUND" }
            }
        },
        "0x0FF": { "name": "Empty", "errors": {} }
    }"#;

    // ========================================================================
    // Decode
    // ========================================================================

    #[test]
    fn decodes_full_document() {
        let db = decode_str(SAMPLE).unwrap();
        assert_eq!(db.len(), 2);

        let kernel = db.facility(0x001).unwrap();
        assert_eq!(kernel.name, "Kernel");
        assert_eq!(kernel.description.as_deref(), Some("Kernel core"));
        assert_eq!(kernel.blacklist.as_slice(), &[BlacklistEntry::new(0x10, 0x20).unwrap()]);
        assert_eq!(kernel.error(0x0001).unwrap().description.as_deref(), Some("Out of memory"));
        assert_eq!(kernel.error(0x0002).unwrap().name, "NOT_FOUND");
        assert!(kernel.error(0x0002).unwrap().description.is_none());

        let empty = db.facility(0x0FF).unwrap();
        assert!(empty.errors.is_empty());
        assert!(empty.blacklist.is_empty());
    }

    #[test]
    fn null_optional_fields_are_absent() {
        let db = decode_str(
            r#"{"2": {"name": "X", "description": null, "blacklist": null,
                      "errors": {"1": {"name": "E", "description": null}}}}"#,
        )
        .unwrap();
        let f = db.facility(0x002).unwrap();
        assert!(f.description.is_none());
        assert!(f.blacklist.is_empty());
        assert!(f.error(1).unwrap().description.is_none());
    }

    #[test]
    fn duplicate_ids_last_write_wins() {
        let db = decode_str(
            r#"{"001": {"name": "first", "errors": {}},
                "1":   {"name": "second", "errors": {"A": {"name": "a"}, "000a": {"name": "b"}}}}"#,
        )
        .unwrap();
        let f = db.facility(0x001).unwrap();
        assert_eq!(f.name, "second");
        assert_eq!(f.error(0x000A).unwrap().name, "b");
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn rejects_invalid_json_and_utf8() {
        assert!(matches!(decode(b"{not json"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b"\xff\xfe"), Err(DecodeError::Malformed(_))));
        assert!(matches!(decode(b"[]"), Err(DecodeError::Malformed(_))));
    }

    #[test]
    fn rejects_missing_required_fields() {
        assert!(decode_str(r#"{"001": {"errors": {}}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "Kernel"}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {"1": {}}}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {}, "blacklist": [{"min": "1"}]}}"#).is_err());
    }

    #[test]
    fn rejects_bad_hex() {
        let err = decode_str(r#"{"xyz": {"name": "K", "errors": {}}}"#).unwrap_err();
        assert!(err.to_string().contains("xyz"));
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {"zz": {"name": "E"}}}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {}, "blacklist": [{"min": "g", "max": "1"}]}}"#).is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(decode_str(r#"{"1000": {"name": "K", "errors": {}}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {"10000": {"name": "E"}}}}"#).is_err());
        assert!(decode_str(r#"{"001": {"name": "K", "errors": {}, "blacklist": [{"min": "0", "max": "10000"}]}}"#).is_err());
    }

    #[test]
    fn rejects_inverted_blacklist_range() {
        let err = decode_str(
            r#"{"001": {"name": "K", "errors": {}, "blacklist": [{"min": "20", "max": "10"}]}}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn ignores_unknown_fields() {
        let db = decode_str(r#"{"001": {"name": "K", "errors": {}, "comment": 42}}"#).unwrap();
        assert_eq!(db.facility(1).unwrap().name, "K");
    }

    // ========================================================================
    // Encode
    // ========================================================================

    #[test]
    fn encodes_zero_padded_uppercase_and_omits_absent_fields() {
        let db = Database::new().with_facility(
            0x00A,
            Facility::new("Net")
                .with_blacklisted(BlacklistEntry::new(0xab, 0xcd).unwrap())
                .with_error(0x00FE, ErrorEntry::new("BAD")),
        );
        let text = String::from_utf8(encode(&db).unwrap()).unwrap();
        assert_eq!(
            text,
            r#"{"00A":{"name":"Net","blacklist":[{"min":"00AB","max":"00CD"}],"errors":{"00FE":{"name":"BAD"}}}}"#
        );
        assert!(!text.contains("null"));
    }

    #[test]
    fn empty_blacklist_is_omitted_and_errors_kept() {
        let db = Database::new().with_facility(0x001, Facility::new("K"));
        assert_eq!(encode(&db).unwrap(), br#"{"001":{"name":"K","errors":{}}}"#.to_vec());
    }

    #[test]
    fn encode_rejects_facility_beyond_field_width() {
        let db = Database::new().with_facility(0x1000, Facility::new("K"));
        assert!(matches!(encode(&db), Err(EncodeError::FacilityOutOfRange(0x1000))));
    }

    #[test]
    fn round_trip_preserves_database() {
        let db = decode_str(SAMPLE).unwrap();
        for style in [EncodeStyle::Compact, EncodeStyle::Pretty] {
            let bytes = encode_with(&db, style).unwrap();
            assert_eq!(decode(&bytes).unwrap(), db);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let db = decode_str(SAMPLE).unwrap();
        let reordered = decode_str(
            r#"{"0FF": {"name": "Empty", "errors": {}},
                "001": {"errors": {"0002": {"name": "NOT_FOUND"},
                                   "0001": {"description": "Out of memory", "name": "NO_MEMORY"}},
                        "blacklist": [{"min": "10", "max": "20"}],
                        "description": "Kernel core", "name": "Kernel"}}"#,
        )
        .unwrap();
        assert_eq!(encode(&db).unwrap(), encode(&reordered).unwrap());
    }
}
