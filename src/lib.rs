//! # SCE Errors
//!
//! Platform error-code database engine.
//!
//! Decodes 32-bit platform error codes into facility and error names, and
//! merges independently maintained error-code databases.
//!
//! ## Components
//!
//! 1. **Codes** ([`codes`]): the bit layout of a 32-bit code
//! 2. **Models** ([`models`]): `Database → Facility → {ErrorEntry, BlacklistEntry}`
//! 3. **Codec** ([`codec`]): the JSON database format, atomic decode and byte-stable encode
//! 4. **Resolver** ([`resolver`]): classification, vendor sentinels first
//! 5. **Report** ([`report`]): text rendering of classifications and dumps
//! 6. **Merger** ([`merge`]): policy-driven folding of one database into another
//! 7. **Short codes** ([`short_codes`]): `C1-2345-6` style aliases
//!
//! ## Principles
//!
//! - The core performs no I/O. Callers hand in bytes and get back values.
//! - Every failure is returned as a value; nothing is printed.
//! - Lookups borrow from the database; a shared `&Database` is safe to query
//!   from many threads at once.
//! - Merging needs `&mut Database`, so exclusive access is checked by the
//!   compiler rather than by convention.
//! - Diagnostics go through `tracing`; nothing is emitted unless the host
//!   installs a subscriber.
//!
//! ## Quick Start
//!
//! ```rust
//! use sce_errors::{codec, report, ErrorCode};
//!
//! let doc = br#"{
//!     "001": {
//!         "name": "Kernel",
//!         "errors": { "0001": { "name": "NO_MEMORY" } }
//!     }
//! }"#;
//!
//! let db = codec::decode(doc)?;
//! let code: ErrorCode = "0x80010001".parse()?;
//!
//! assert_eq!(
//!     report::describe(&db, code),
//!     "Facility : Kernel\nError code : NO_MEMORY\nFatal : No"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Merging
//!
//! ```rust
//! use sce_errors::{codec, merge::{merge_document, MergePolicy}};
//!
//! let mut live = codec::decode(br#"{"001": {"name": "Kernel", "errors": {}}}"#)?;
//! let stats = merge_document(
//!     &mut live,
//!     br#"{"002": {"name": "Sysmem", "errors": {}}}"#,
//!     MergePolicy::Preserve,
//! )?;
//!
//! assert_eq!(stats.facilities_added, 1);
//! assert_eq!(live.len(), 2);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(clippy::all)]

pub mod codec;
pub mod codes;
pub mod merge;
pub mod models;
pub mod report;
pub mod resolver;
pub mod short_codes;

pub use codec::{DecodeError, EncodeError, EncodeStyle, decode, encode};
pub use codes::{CodeParseError, ErrorCode};
pub use merge::{MergeError, MergePolicy, MergeStats, merge, merge_into};
pub use models::{BlacklistEntry, Database, ErrorEntry, Facility};
pub use report::{describe, dump, render};
pub use resolver::{CodeKind, Lookup, SentinelError, classify};
pub use short_codes::{InputError, ResolvedInput, ShortCodeTable};

/// Any failure the engine can report.
///
/// Each operation returns its own narrow error type; this enum exists for
/// callers that chain several of them with `?`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Code(#[from] CodeParseError),
}

/// Type alias for Results using the crate-wide error type.
pub type Result<T> = std::result::Result<T, Error>;
