//! Property-based tests for sce_errors
//!
//! These tests use proptest to generate random databases and codes and verify
//! invariants hold.

use proptest::prelude::*;
use sce_errors::{
    BlacklistEntry, CodeKind, Database, ErrorCode, ErrorEntry, Facility, MergePolicy, SentinelError,
    classify, codec, describe, merge,
};

// ============================================================================
// STRATEGIES
// ============================================================================

fn text() -> impl Strategy<Value = String> {
    "\\PC{0,24}"
}

fn error_entry() -> impl Strategy<Value = ErrorEntry> {
    (text(), proptest::option::of(text())).prop_map(|(name, description)| ErrorEntry { name, description })
}

fn blacklist_entry() -> impl Strategy<Value = BlacklistEntry> {
    (any::<u16>(), any::<u16>()).prop_map(|(a, b)| BlacklistEntry::new(a.min(b), a.max(b)).unwrap())
}

/// Up to four ranges, each confined to its own quarter of the number space,
/// so no range of a facility contains another.
fn blacklist() -> impl Strategy<Value = Vec<BlacklistEntry>> {
    proptest::collection::vec((any::<u16>(), any::<u16>()), 0..4).prop_map(|pairs| {
        pairs
            .into_iter()
            .enumerate()
            .map(|(band, (a, b))| {
                let base = (band as u16) << 14;
                let (a, b) = (base | (a & 0x3FFF), base | (b & 0x3FFF));
                BlacklistEntry::new(a.min(b), a.max(b)).unwrap()
            })
            .collect()
    })
}

fn facility() -> impl Strategy<Value = Facility> {
    (
        text(),
        proptest::option::of(text()),
        blacklist(),
        proptest::collection::btree_map(any::<u16>(), error_entry(), 0..8),
    )
        .prop_map(|(name, description, blacklist, errors)| Facility {
            name,
            description,
            blacklist: blacklist.into_iter().collect(),
            errors,
        })
}

fn database() -> impl Strategy<Value = Database> {
    proptest::collection::btree_map(0u16..=0xFFF, facility(), 0..8).prop_map(|m| m.into_iter().collect())
}

fn contains_null(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => true,
        serde_json::Value::Array(items) => items.iter().any(contains_null),
        serde_json::Value::Object(map) => map.values().any(contains_null),
        _ => false,
    }
}

// ============================================================================
// CODEC PROPERTIES
// ============================================================================

proptest! {
    /// Encoding then decoding yields the same database
    #[test]
    fn encode_decode_round_trip(db in database()) {
        let bytes = codec::encode(&db).unwrap();
        prop_assert_eq!(codec::decode(&bytes).unwrap(), db);
    }

    /// Re-encoding a decoded document is byte-identical
    #[test]
    fn encoding_is_a_fixed_point(db in database()) {
        let first = codec::encode(&db).unwrap();
        let second = codec::encode(&codec::decode(&first).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Decoding arbitrary bytes never panics
    #[test]
    fn decode_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..256)) {
        let _ = codec::decode(&bytes);
    }

    /// Encoded output never contains JSON null
    #[test]
    fn absent_fields_are_omitted(db in database()) {
        let value: serde_json::Value = serde_json::from_slice(&codec::encode(&db).unwrap()).unwrap();
        prop_assert!(!contains_null(&value));
    }
}

// ============================================================================
// CLASSIFICATION PROPERTIES
// ============================================================================

proptest! {
    /// The sentinel range always wins, whatever the database holds
    #[test]
    fn sentinel_range_always_classifies_as_sentinel(offset in 0u32..=0xD, db in database()) {
        let code = ErrorCode::new(0x9001_0000 + offset);
        let kind = classify(&db, code);
        prop_assert_eq!(kind, CodeKind::VendorSentinel(SentinelError::ALL[offset as usize]));
        prop_assert_eq!(kind.fatal(), Some(false));
    }

    /// Codes without the error bit are never decoded
    #[test]
    fn error_bit_clear_is_not_an_error(raw in 0u32..0x8000_0000, db in database()) {
        let is_not_error = matches!(classify(&db, ErrorCode::new(raw)), CodeKind::NotAnError { .. });
        prop_assert!(is_not_error);
    }

    /// Well-formed codes reflect the fatal bit
    #[test]
    fn fatal_bit_is_reported(fatal in any::<bool>(), facility in 0u16..=0xFFF, num in any::<u16>()) {
        let code = ErrorCode::from_parts(fatal, facility, num);
        match classify(&Database::new(), code) {
            CodeKind::Decoded { fatal: reported, .. } => prop_assert_eq!(reported, fatal),
            other => prop_assert!(false, "unexpected kind {:?}", other),
        }
    }

    /// Blacklisted numbers are never decoded
    #[test]
    fn blacklisted_numbers_are_never_decoded(
        range in blacklist_entry(),
        pick in any::<u16>(),
        facility in 0u16..=0xFFF,
    ) {
        let span = u32::from(range.max() - range.min()) + 1;
        let num = range.min() + (u32::from(pick) % span) as u16;
        let db = Database::new().with_facility(facility, Facility::new("F").with_blacklisted(range));
        let kind = classify(&db, ErrorCode::from_parts(false, facility, num));
        prop_assert_eq!(kind, CodeKind::Blacklisted { facility, error_num: num });
    }

    /// Rendering never panics and never ends with a newline
    #[test]
    fn reports_are_trimmed(raw in any::<u32>(), db in database()) {
        let report = describe(&db, ErrorCode::new(raw));
        prop_assert!(!report.is_empty());
        prop_assert!(!report.ends_with('\n'));
    }
}

// ============================================================================
// MERGE PROPERTIES
// ============================================================================

proptest! {
    /// Merging a database into a copy of itself changes nothing
    #[test]
    fn preserve_merge_is_idempotent(db in database()) {
        prop_assert_eq!(merge(db.clone(), db.clone(), MergePolicy::Preserve), db);
    }

    /// Overwrite-merging into itself changes nothing either
    #[test]
    fn overwrite_merge_with_self_is_identity(db in database()) {
        prop_assert_eq!(merge(db.clone(), db.clone(), MergePolicy::Overwrite), db);
    }

    /// Every source facility and error id ends up in the result
    #[test]
    fn merge_keeps_all_ids(dest in database(), src in database(), overwrite in any::<bool>()) {
        let merged = merge(dest.clone(), src.clone(), overwrite);
        for (id, facility) in dest.iter().chain(src.iter()) {
            let out = merged.facility(*id);
            prop_assert!(out.is_some());
            if let Some(out) = out {
                for num in facility.errors.keys() {
                    prop_assert!(out.errors.contains_key(num));
                }
            }
        }
    }

    /// Preserve never shrinks or drops a destination blacklist range
    #[test]
    fn preserve_blacklist_only_grows(dest in database(), src in database()) {
        let merged = merge(dest.clone(), src, MergePolicy::Preserve);
        for (id, before) in &dest {
            let after = &merged.facility(*id).unwrap().blacklist;
            prop_assert_eq!(after.len(), before.blacklist.len());
            for (old, new) in before.blacklist.iter().zip(after.iter()) {
                prop_assert!(new.min() <= old.min() && new.max() >= old.max());
            }
        }
    }

    /// Preserve keeps destination names
    #[test]
    fn preserve_keeps_names(dest in database(), src in database()) {
        let merged = merge(dest.clone(), src, MergePolicy::Preserve);
        for (id, before) in &dest {
            let after = merged.facility(*id).unwrap();
            prop_assert_eq!(&after.name, &before.name);
            for (num, error) in &before.errors {
                prop_assert_eq!(&after.errors[num].name, &error.name);
            }
        }
    }
}
