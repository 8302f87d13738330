#![no_main]

use libfuzzer_sys::fuzz_target;
use sce_errors::{Database, ErrorCode, ErrorEntry, Facility, BlacklistEntry, describe};

fuzz_target!(|data: (u32, u16, u16)| {
    let (raw, min, max) = data;
    let code = ErrorCode::new(raw);

    let Ok(range) = BlacklistEntry::new(min.min(max), min.max(max)) else {
        return;
    };
    let db = Database::new().with_facility(
        code.facility(),
        Facility::new("Fuzz")
            .with_blacklisted(range)
            .with_error(code.error_num(), ErrorEntry::new("FUZZ")),
    );

    let report = describe(&db, code);
    assert!(!report.is_empty());
    assert!(!report.ends_with('\n'));
});
