#![no_main]

use libfuzzer_sys::fuzz_target;
use sce_errors::{ErrorCode, ShortCodeTable};

fuzz_target!(|input: &str| {
    let mut table = ShortCodeTable::new();
    table.insert("C1-2345-6", ErrorCode::new(0x8001_0002));

    if let Ok(resolved) = table.resolve_input(input) {
        let _ = resolved.code();
    }
    let _ = input.parse::<ErrorCode>();
});
