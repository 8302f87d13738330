//! Classification of raw codes against a [`Database`].
//!
//! # Decision Order
//!
//! The first matching rule wins:
//!
//! 1. **Vendor sentinel** - `0x90010000..=0x9001000D` (taiHEN). These codes
//!    carry RESERVED bits, so they must be matched before any mask test.
//! 2. **Not an error** - IS_ERROR clear (possibly a SceUID).
//! 3. **Malformed** - RESERVED bits set.
//! 4. **Blacklisted** - the facility lists the error-num as never used.
//! 5. **Decoded** - facility and error looked up; missing entries become
//!    [`Lookup::Unknown`] carrying the raw id.
//!
//! Classification only borrows from the database and never formats text.
//! See [`crate::report`] for rendering.

use crate::codes::ErrorCode;
use crate::models::{Database, ErrorEntry, Facility};
use std::fmt;

// ============================================================================
// Vendor Sentinels
// ============================================================================

/// First code of the taiHEN sentinel range.
pub const SENTINEL_BASE: u32 = 0x9001_0000;

/// Last code of the taiHEN sentinel range (inclusive).
pub const SENTINEL_LAST: u32 = 0x9001_000D;

/// Errors reported by the taiHEN framework.
///
/// This range violates the general bit layout (bits 29-28 are set), so it is
/// always matched first and always reported non-fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SentinelError {
    System = 0,
    Memory,
    NotFound,
    InvalidArgs,
    InvalidKernelAddr,
    PatchExists,
    HookError,
    NotImplemented,
    UserMemory,
    NotAllowed,
    StubNotResolved,
    InvalidModule,
    ModuleOverflow,
    Blocking,
}

impl SentinelError {
    /// Table order matches `code - SENTINEL_BASE`.
    pub const ALL: [SentinelError; 14] = [
        Self::System,
        Self::Memory,
        Self::NotFound,
        Self::InvalidArgs,
        Self::InvalidKernelAddr,
        Self::PatchExists,
        Self::HookError,
        Self::NotImplemented,
        Self::UserMemory,
        Self::NotAllowed,
        Self::StubNotResolved,
        Self::InvalidModule,
        Self::ModuleOverflow,
        Self::Blocking,
    ];

    /// Match a code against the sentinel range.
    pub const fn from_code(code: ErrorCode) -> Option<Self> {
        let raw = code.raw();
        if raw >= SENTINEL_BASE && raw <= SENTINEL_LAST {
            Some(Self::ALL[(raw - SENTINEL_BASE) as usize])
        } else {
            None
        }
    }

    /// Position in the sentinel table.
    #[inline]
    pub const fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn code(self) -> ErrorCode {
        ErrorCode::new(SENTINEL_BASE + self as u32)
    }

    /// Symbolic name as taiHEN headers spell it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::System => "TAI_ERROR_SYSTEM",
            Self::Memory => "TAI_ERROR_MEMORY",
            Self::NotFound => "TAI_ERROR_NOT_FOUND",
            Self::InvalidArgs => "TAI_ERROR_INVALID_ARGS",
            Self::InvalidKernelAddr => "TAI_ERROR_INVALID_KERNEL_ADDR",
            Self::PatchExists => "TAI_ERROR_PATCH_EXISTS",
            Self::HookError => "TAI_ERROR_HOOK_ERROR",
            Self::NotImplemented => "TAI_ERROR_NOT_IMPLEMENTED",
            Self::UserMemory => "TAI_ERROR_USER_MEMORY",
            Self::NotAllowed => "TAI_ERROR_NOT_ALLOWED",
            Self::StubNotResolved => "TAI_ERROR_STUB_NOT_RESOLVED",
            Self::InvalidModule => "TAI_ERROR_INVALID_MODULE",
            Self::ModuleOverflow => "TAI_ERROR_MODULE_OVERFLOW",
            Self::Blocking => "TAI_ERROR_BLOCKING",
        }
    }
}

impl fmt::Display for SentinelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Identifier Heuristic
// ============================================================================

/// Can this value be a SceUID (kernel object handle) rather than an error?
///
/// Top nibble `0x4`, a bit set somewhere in `0xF0000`, and the low bit set.
#[inline]
pub const fn looks_like_uid(code: ErrorCode) -> bool {
    let raw = code.raw();
    (raw & 0xF000_0000) == 0x4000_0000 && (raw & 0x000F_0000) != 0 && (raw & 1) == 1
}

// ============================================================================
// Classification Result
// ============================================================================

/// Result of a name lookup: either borrowed from the database or the raw id
/// that was not found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Known {
        name: &'a str,
        description: Option<&'a str>,
    },
    Unknown(u16),
}

impl<'a> Lookup<'a> {
    fn facility(id: u16, facility: Option<&'a Facility>) -> Self {
        match facility {
            Some(f) => Self::Known {
                name: &f.name,
                description: f.description.as_deref(),
            },
            None => Self::Unknown(id),
        }
    }

    fn error(num: u16, entry: Option<&'a ErrorEntry>) -> Self {
        match entry {
            Some(e) => Self::Known {
                name: &e.name,
                description: e.description.as_deref(),
            },
            None => Self::Unknown(num),
        }
    }

    /// Name if known.
    pub const fn name(&self) -> Option<&'a str> {
        match self {
            Self::Known { name, .. } => Some(*name),
            Self::Unknown(_) => None,
        }
    }

    pub const fn description(&self) -> Option<&'a str> {
        match self {
            Self::Known { description, .. } => *description,
            Self::Unknown(_) => None,
        }
    }

    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

/// What a 32-bit value turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeKind<'a> {
    /// taiHEN framework error.
    VendorSentinel(SentinelError),
    /// IS_ERROR clear. `maybe_uid` when [`looks_like_uid`] matched.
    NotAnError { maybe_uid: bool },
    /// IS_ERROR set but RESERVED bits nonzero.
    MalformedReserved,
    /// Error-num is inside one of the facility's blacklist ranges.
    Blacklisted { facility: u16, error_num: u16 },
    /// The general case.
    Decoded {
        facility: Lookup<'a>,
        error: Lookup<'a>,
        fatal: bool,
    },
}

impl CodeKind<'_> {
    /// True for kinds that describe an actual error (sentinel or decoded).
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::VendorSentinel(_) | Self::Decoded { .. })
    }

    /// Fatality, when the kind carries one. Sentinels are never fatal.
    pub const fn fatal(&self) -> Option<bool> {
        match self {
            Self::VendorSentinel(_) => Some(false),
            Self::Decoded { fatal, .. } => Some(*fatal),
            _ => None,
        }
    }
}

// ============================================================================
// Classify
// ============================================================================

/// Classify `code` against `db`.
///
/// # Example
///
/// ```rust
/// use sce_errors::{ErrorCode, resolver::{classify, CodeKind, SentinelError}, Database};
///
/// let db = Database::new();
/// assert_eq!(
///     classify(&db, ErrorCode::new(0x9001_0000)),
///     CodeKind::VendorSentinel(SentinelError::System)
/// );
/// ```
pub fn classify(db: &Database, code: ErrorCode) -> CodeKind<'_> {
    if let Some(sentinel) = SentinelError::from_code(code) {
        return CodeKind::VendorSentinel(sentinel);
    }

    if !code.is_error() {
        return CodeKind::NotAnError {
            maybe_uid: looks_like_uid(code),
        };
    }

    if code.has_reserved_bits() {
        return CodeKind::MalformedReserved;
    }

    let facility_id = code.facility();
    let error_num = code.error_num();
    let facility = db.facility(facility_id);

    if facility.is_some_and(|f| f.is_blacklisted(error_num)) {
        return CodeKind::Blacklisted {
            facility: facility_id,
            error_num,
        };
    }

    CodeKind::Decoded {
        facility: Lookup::facility(facility_id, facility),
        error: Lookup::error(error_num, facility.and_then(|f| f.error(error_num))),
        fatal: code.is_fatal(),
    }
}

// ============================================================================
// Tests
// ============================================================================
