//! Folding one error database into another.
//!
//! # Policy
//!
//! | field | `Preserve` | `Overwrite` |
//! |---|---|---|
//! | new facility / new error | copied | copied |
//! | facility / error name | kept | replaced |
//! | description | filled in only if missing | replaced if source has one |
//! | blacklist | strictly contained ranges widened | replaced wholesale |
//!
//! A source description never erases a destination description by being
//! absent, under either policy.
//!
//! # Blacklist Growth
//!
//! Under `Preserve`, a destination range is widened only when a source range
//! is wider on *both* ends. Ranges are never shrunk, dropped, added, or
//! coalesced when they merely overlap. This is a deliberate approximation of
//! interval-set union: it keeps existing ranges stable across repeated merges.
//!
//! # Ownership
//!
//! The destination is mutated in place and handed back. There is no copy of
//! the pre-merge state; callers needing one must clone before merging.

use crate::codec::{self, DecodeError};
use crate::models::{Database, Facility};
use std::collections::btree_map::Entry;
use tracing::{debug, trace};

// ============================================================================
// Configuration
// ============================================================================

/// How conflicting fields are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Keep destination values; only fill gaps and grow blacklist ranges.
    #[default]
    Preserve,
    /// Source values win wherever present.
    Overwrite,
}

impl MergePolicy {
    #[inline]
    pub const fn overwrites(self) -> bool {
        matches!(self, Self::Overwrite)
    }
}

impl From<bool> for MergePolicy {
    /// `true` means overwrite.
    fn from(overwrite: bool) -> Self {
        if overwrite { Self::Overwrite } else { Self::Preserve }
    }
}

// ============================================================================
// Errors & Stats
// ============================================================================

/// Which side of a merge was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeSide {
    Destination,
    Source,
}

impl std::fmt::Display for MergeSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Destination => "destination",
            Self::Source => "source",
        })
    }
}

/// The only way a merge can fail: nothing to merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("cannot merge: {which} database is missing")]
    MissingInput { which: MergeSide },
}

/// What a merge changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MergeStats {
    pub facilities_added: usize,
    pub facilities_updated: usize,
    pub errors_added: usize,
    pub blacklist_ranges_widened: usize,
}

// ============================================================================
// Field Rules
// ============================================================================

/// Description rule shared by facilities and errors.
fn merge_description(dest: &mut Option<String>, src: Option<String>, policy: MergePolicy) {
    if let Some(description) = src {
        if dest.is_none() || policy.overwrites() {
            *dest = Some(description);
        }
    }
}

fn merge_facility(dest: &mut Facility, src: Facility, policy: MergePolicy, stats: &mut MergeStats) {
    if policy.overwrites() {
        dest.name = src.name;
    }
    merge_description(&mut dest.description, src.description, policy);

    if policy.overwrites() {
        dest.blacklist = src.blacklist;
    } else {
        for wider in &src.blacklist {
            for range in dest.blacklist.iter_mut() {
                if wider.strictly_contains(range) {
                    trace!(
                        from_min = range.min(),
                        from_max = range.max(),
                        to_min = wider.min(),
                        to_max = wider.max(),
                        "widening blacklist range"
                    );
                    range.widen_to(wider);
                    stats.blacklist_ranges_widened += 1;
                }
            }
        }
    }

    for (num, error) in src.errors {
        match dest.errors.entry(num) {
            Entry::Vacant(slot) => {
                slot.insert(error);
                stats.errors_added += 1;
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if policy.overwrites() {
                    existing.name = error.name;
                }
                merge_description(&mut existing.description, error.description, policy);
            }
        }
    }
}

// ============================================================================
// Public API
// ============================================================================

/// Fold `src` into `dest` in place.
pub fn merge_into(dest: &mut Database, src: Database, policy: MergePolicy) -> MergeStats {
    let mut stats = MergeStats::default();

    for (id, facility) in src {
        match dest.entry(id) {
            Entry::Vacant(slot) => {
                stats.errors_added += facility.errors.len();
                slot.insert(facility);
                stats.facilities_added += 1;
            }
            Entry::Occupied(mut slot) => {
                merge_facility(slot.get_mut(), facility, policy, &mut stats);
                stats.facilities_updated += 1;
            }
        }
    }

    debug!(
        ?policy,
        facilities_added = stats.facilities_added,
        facilities_updated = stats.facilities_updated,
        errors_added = stats.errors_added,
        blacklist_ranges_widened = stats.blacklist_ranges_widened,
        "merged error databases"
    );
    stats
}

/// Fold `src` into `dest` and return the result.
///
/// # Example
///
/// ```rust
/// use sce_errors::{Database, Facility, merge::{merge, MergePolicy}};
///
/// let dest = Database::new().with_facility(1, Facility::new("Kernel"));
/// let src = Database::new().with_facility(1, Facility::new("Renamed").with_description("core"));
///
/// let merged = merge(dest, src, MergePolicy::Preserve);
/// let kernel = merged.facility(1).unwrap();
/// assert_eq!(kernel.name, "Kernel");
/// assert_eq!(kernel.description.as_deref(), Some("core"));
/// ```
pub fn merge(mut dest: Database, src: Database, policy: impl Into<MergePolicy>) -> Database {
    merge_into(&mut dest, src, policy.into());
    dest
}

/// [`merge`] for callers whose inputs may be absent.
///
/// # Errors
///
/// [`MergeError::MissingInput`] naming the first missing side.
pub fn try_merge(
    dest: Option<Database>,
    src: Option<Database>,
    policy: impl Into<MergePolicy>,
) -> Result<Database, MergeError> {
    let dest = dest.ok_or(MergeError::MissingInput {
        which: MergeSide::Destination,
    })?;
    let src = src.ok_or(MergeError::MissingInput {
        which: MergeSide::Source,
    })?;
    Ok(merge(dest, src, policy))
}

/// Decode `document` and fold it into `dest`.
///
/// # Errors
///
/// Any [`DecodeError`] from the codec. Decoding happens first, so `dest` is
/// untouched on failure.
pub fn merge_document(
    dest: &mut Database,
    document: &[u8],
    policy: MergePolicy,
) -> Result<MergeStats, DecodeError> {
    let src = codec::decode(document)?;
    Ok(merge_into(dest, src, policy))
}

// ============================================================================
// Tests
// ============================================================================
