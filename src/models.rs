//! In-memory error-code database.
//!
//! # Hierarchy
//!
//! ```text
//! Database
//!  └── Facility (keyed by facility id, 0x000-0xFFF)
//!       ├── blacklist: [BlacklistEntry]   inclusive error-num ranges
//!       └── errors: ErrorEntry            keyed by error-num
//! ```
//!
//! Ownership is strictly hierarchical: nothing here has a lifetime outside
//! the `Database` that owns it. Optional text fields are `Option<String>`,
//! never empty-string-by-convention.
//!
//! # Ordering
//!
//! Facilities and errors live in `BTreeMap`s. Insertion order carries no
//! meaning; sorted storage makes iteration, dumps and encoding deterministic.

use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Inline capacity for blacklists. Most facilities carry zero to a few ranges.
pub(crate) const BLACKLIST_INLINE: usize = 4;

/// Blacklist storage.
pub type Blacklist = SmallVec<[BlacklistEntry; BLACKLIST_INLINE]>;

// ============================================================================
// Blacklist
// ============================================================================

/// Inclusive range of error-nums a facility never legitimately uses.
///
/// Invariant: `min <= max`. Enforced by [`BlacklistEntry::new`] and by the
/// codec; the fields are private so it cannot be broken afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlacklistEntry {
    min: u16,
    max: u16,
}

/// Returned when a blacklist range is built with `min > max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("inverted blacklist range: min 0x{min:04X} > max 0x{max:04X}")]
pub struct InvertedRange {
    /// Requested lower bound.
    pub min: u16,
    /// Requested upper bound.
    pub max: u16,
}

impl BlacklistEntry {
    /// Create a range, rejecting `min > max`.
    #[inline]
    pub const fn new(min: u16, max: u16) -> Result<Self, InvertedRange> {
        if min > max {
            Err(InvertedRange { min, max })
        } else {
            Ok(Self { min, max })
        }
    }

    /// Single-number range.
    #[inline]
    pub const fn single(num: u16) -> Self {
        Self { min: num, max: num }
    }

    #[inline]
    pub const fn min(&self) -> u16 {
        self.min
    }

    #[inline]
    pub const fn max(&self) -> u16 {
        self.max
    }

    #[inline]
    pub const fn contains(&self, error_num: u16) -> bool {
        self.min <= error_num && error_num <= self.max
    }

    /// True when `self` is wider than `other` on both ends.
    #[inline]
    pub const fn strictly_contains(&self, other: &BlacklistEntry) -> bool {
        self.min < other.min && self.max > other.max
    }

    /// Grow to `other`'s bounds. Only called when `other` strictly contains
    /// `self`, so the invariant holds.
    #[inline]
    pub(crate) fn widen_to(&mut self, other: &BlacklistEntry) {
        self.min = other.min;
        self.max = other.max;
    }
}

// ============================================================================
// Error Entry
// ============================================================================

/// A named error within a facility.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ErrorEntry {
    /// Symbolic name, e.g. `SCE_KERNEL_ERROR_NO_MEMORY`.
    pub name: String,
    pub description: Option<String>,
}

impl ErrorEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ============================================================================
// Facility
// ============================================================================

/// A numeric namespace owning a set of error codes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Facility {
    pub name: String,
    pub description: Option<String>,
    /// Ordered; order is preserved through encode/decode and merge.
    pub blacklist: Blacklist,
    pub errors: BTreeMap<u16, ErrorEntry>,
}

impl Facility {
    /// Facility with a name and nothing else. An empty error table is valid:
    /// the facility name can be known before any of its errors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_blacklisted(mut self, entry: BlacklistEntry) -> Self {
        self.blacklist.push(entry);
        self
    }

    pub fn with_error(mut self, error_num: u16, entry: ErrorEntry) -> Self {
        self.errors.insert(error_num, entry);
        self
    }

    #[inline]
    pub fn error(&self, error_num: u16) -> Option<&ErrorEntry> {
        self.errors.get(&error_num)
    }

    /// True if any blacklist range covers `error_num`.
    #[inline]
    pub fn is_blacklisted(&self, error_num: u16) -> bool {
        self.blacklist.iter().any(|range| range.contains(error_num))
    }
}

// ============================================================================
// Database
// ============================================================================

/// Mapping from facility id to [`Facility`].
///
/// Built wholesale by [`crate::codec::decode`]; the only in-place mutation
/// path after that is [`crate::merge::merge_into`]. Holds no interior
/// mutability, so a shared `&Database` can serve any number of concurrent
/// lookups.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Database {
    facilities: BTreeMap<u16, Facility>,
}

impl Database {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn facility(&self, id: u16) -> Option<&Facility> {
        self.facilities.get(&id)
    }

    #[inline]
    pub fn facility_mut(&mut self, id: u16) -> Option<&mut Facility> {
        self.facilities.get_mut(&id)
    }

    /// Insert or replace a facility, returning the previous one.
    pub fn insert(&mut self, id: u16, facility: Facility) -> Option<Facility> {
        self.facilities.insert(id, facility)
    }

    /// Builder form of [`Database::insert`].
    pub fn with_facility(mut self, id: u16, facility: Facility) -> Self {
        self.facilities.insert(id, facility);
        self
    }

    pub fn remove(&mut self, id: u16) -> Option<Facility> {
        self.facilities.remove(&id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Total number of named errors across all facilities.
    pub fn error_count(&self) -> usize {
        self.facilities.values().map(|f| f.errors.len()).sum()
    }

    /// Facilities in ascending id order.
    pub fn iter(&self) -> btree_map::Iter<'_, u16, Facility> {
        self.facilities.iter()
    }

    /// True if `facility` exists and blacklists `error_num`. Unknown
    /// facilities blacklist nothing.
    pub fn is_blacklisted(&self, facility: u16, error_num: u16) -> bool {
        self.facility(facility)
            .is_some_and(|f| f.is_blacklisted(error_num))
    }

    pub(crate) fn entry(&mut self, id: u16) -> btree_map::Entry<'_, u16, Facility> {
        self.facilities.entry(id)
    }
}

impl<'a> IntoIterator for &'a Database {
    type Item = (&'a u16, &'a Facility);
    type IntoIter = btree_map::Iter<'a, u16, Facility>;

    fn into_iter(self) -> Self::IntoIter {
        self.facilities.iter()
    }
}

impl IntoIterator for Database {
    type Item = (u16, Facility);
    type IntoIter = btree_map::IntoIter<u16, Facility>;

    fn into_iter(self) -> Self::IntoIter {
        self.facilities.into_iter()
    }
}

impl FromIterator<(u16, Facility)> for Database {
    fn from_iter<I: IntoIterator<Item = (u16, Facility)>>(iter: I) -> Self {
        Self {
            facilities: iter.into_iter().collect(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: u16, max: u16) -> BlacklistEntry {
        BlacklistEntry::new(min, max).unwrap()
    }

    #[test]
    fn blacklist_entry_rejects_inverted_range() {
        assert_eq!(
            BlacklistEntry::new(0x20, 0x10),
            Err(InvertedRange { min: 0x20, max: 0x10 })
        );
        assert!(BlacklistEntry::new(0x10, 0x10).is_ok());
    }

    #[test]
    fn blacklist_containment_is_inclusive() {
        let r = range(0x10, 0x20);
        assert!(r.contains(0x10));
        assert!(r.contains(0x15));
        assert!(r.contains(0x20));
        assert!(!r.contains(0x0F));
        assert!(!r.contains(0x21));
    }

    #[test]
    fn strict_containment_requires_both_ends_wider() {
        let inner = range(0x10, 0x20);
        assert!(range(0x00, 0xFF).strictly_contains(&inner));
        assert!(!range(0x10, 0xFF).strictly_contains(&inner));
        assert!(!range(0x00, 0x20).strictly_contains(&inner));
        assert!(!inner.strictly_contains(&inner));
        assert!(!inner.strictly_contains(&range(0x00, 0xFF)));
    }

    #[test]
    fn facility_blacklist_lookup() {
        let facility = Facility::new("Kernel")
            .with_blacklisted(range(0x10, 0x20))
            .with_blacklisted(BlacklistEntry::single(0x100));
        assert!(facility.is_blacklisted(0x15));
        assert!(facility.is_blacklisted(0x100));
        assert!(!facility.is_blacklisted(0x101));
    }

    #[test]
    fn database_lookup_and_counts() {
        let db = Database::new()
            .with_facility(
                0x001,
                Facility::new("Kernel")
                    .with_error(0x0001, ErrorEntry::new("NO_MEMORY"))
                    .with_error(0x0002, ErrorEntry::new("NOT_FOUND")),
            )
            .with_facility(0x002, Facility::new("Sysmem"));

        assert_eq!(db.len(), 2);
        assert_eq!(db.error_count(), 2);
        assert_eq!(
            db.facility(0x001).and_then(|f| f.error(0x0001)).map(|e| e.name.as_str()),
            Some("NO_MEMORY")
        );
        assert!(db.facility(0x003).is_none());
        assert!(!db.is_blacklisted(0x003, 0x0001));
    }

    #[test]
    fn iteration_is_sorted_by_facility_id() {
        let db: Database = [
            (0x300, Facility::new("c")),
            (0x001, Facility::new("a")),
            (0x020, Facility::new("b")),
        ]
        .into_iter()
        .collect();

        let ids: Vec<u16> = db.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![0x001, 0x020, 0x300]);
    }
}
