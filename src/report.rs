//! Human-readable reports.
//!
//! Everything that turns classification results or databases into text
//! lives here, so [`crate::resolver`] stays testable without string
//! comparisons. Wording is fixed but not a wire format.
//!
//! # Report Shape
//!
//! ```text
//! Facility : Kernel (Kernel core)
//! Error code : NO_MEMORY
//! Error description : Out of memory
//! Fatal : No
//! ```

use crate::codes::ErrorCode;
use crate::models::Database;
use crate::resolver::{CodeKind, Lookup, classify};
use std::fmt::{self, Write};

/// Vendor line for sentinel codes.
const SENTINEL_FACILITY: &str = "taiHEN (taiHEN framework)";

const NOT_ERROR_UID: &str = "Not an error code - may be a SceUID.";
const NOT_ERROR: &str = "Error bit not set - not an error code.";
const RESERVED_SET: &str = "Reserved bits not clear - not an error code.";
const BLACKLISTED: &str = "Illegal error code.";

// ============================================================================
// Lookup Display
// ============================================================================

/// Renders a facility lookup: known name, or the placeholder with its id.
struct FacilityName<'a>(&'a Lookup<'a>);

impl fmt::Display for FacilityName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Lookup::Known { name, .. } => f.write_str(name),
            Lookup::Unknown(id) => write!(f, "Unknown facility (0x{id:03X})"),
        }
    }
}

/// Renders an error lookup: known name, or the placeholder with its number.
struct ErrorName<'a>(&'a Lookup<'a>);

impl fmt::Display for ErrorName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Lookup::Known { name, .. } => f.write_str(name),
            Lookup::Unknown(num) => write!(f, "Unknown error code (0x{num:04X})"),
        }
    }
}

fn fatal_line(fatal: bool) -> &'static str {
    if fatal { "Fatal : Yes" } else { "Fatal : No" }
}

// ============================================================================
// Render
// ============================================================================

impl fmt::Display for CodeKind<'_> {
    /// Writes the report without intermediate allocation. No trailing newline.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeKind::VendorSentinel(sentinel) => {
                writeln!(f, "Facility : {SENTINEL_FACILITY}")?;
                writeln!(f, "Error code : {sentinel}")?;
                f.write_str(fatal_line(false))
            }
            CodeKind::NotAnError { maybe_uid: true } => f.write_str(NOT_ERROR_UID),
            CodeKind::NotAnError { maybe_uid: false } => f.write_str(NOT_ERROR),
            CodeKind::MalformedReserved => f.write_str(RESERVED_SET),
            CodeKind::Blacklisted { .. } => f.write_str(BLACKLISTED),
            CodeKind::Decoded {
                facility,
                error,
                fatal,
            } => {
                write!(f, "Facility : {}", FacilityName(facility))?;
                if let Some(description) = facility.description() {
                    write!(f, " ({description})")?;
                }
                writeln!(f)?;
                writeln!(f, "Error code : {}", ErrorName(error))?;
                if let Some(description) = error.description() {
                    writeln!(f, "Error description : {description}")?;
                }
                f.write_str(fatal_line(*fatal))
            }
        }
    }
}

/// Render a classification as a multi-line report.
pub fn render(kind: &CodeKind<'_>) -> String {
    kind.to_string()
}

/// Classify and render in one step.
///
/// # Example
///
/// ```rust
/// use sce_errors::{Database, ErrorCode, report::describe};
///
/// let report = describe(&Database::new(), ErrorCode::new(0x8002_0001));
/// assert_eq!(
///     report,
///     "Facility : Unknown facility (0x002)\nError code : Unknown error code (0x0001)\nFatal : No"
/// );
/// ```
pub fn describe(db: &Database, code: ErrorCode) -> String {
    render(&classify(db, code))
}

// ============================================================================
// Database Dump
// ============================================================================

/// Render the full content of a database, facilities in ascending id order.
pub fn dump(db: &Database) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_dump(&mut out, db);
    out
}

fn write_dump(out: &mut String, db: &Database) -> fmt::Result {
    writeln!(out, "Number of facilities : {}", db.len())?;
    for (id, facility) in db {
        writeln!(out, " Facility #0x{id:03X} :")?;
        writeln!(out, "  - Name : {}", facility.name)?;
        writeln!(
            out,
            "  - Description : {}",
            facility.description.as_deref().unwrap_or("None")
        )?;
        writeln!(out, "  - Number of blacklisted ranges : {}", facility.blacklist.len())?;
        for range in &facility.blacklist {
            writeln!(out, "    -> [0x{:04X} - 0x{:04X}]", range.min(), range.max())?;
        }
        writeln!(out, "  - Number of errors : {}", facility.errors.len())?;
        for (num, error) in &facility.errors {
            writeln!(out, "    Error 0x{num:04X} :")?;
            writeln!(out, "     - Name : {}", error.name)?;
            writeln!(
                out,
                "     - Description : {}",
                error.description.as_deref().unwrap_or("None")
            )?;
        }
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
