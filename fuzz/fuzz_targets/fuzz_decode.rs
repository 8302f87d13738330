#![no_main]

use libfuzzer_sys::fuzz_target;
use sce_errors::{codec, merge, MergePolicy};

fuzz_target!(|data: &[u8]| {
    let Ok(db) = codec::decode(data) else {
        return;
    };

    // Anything accepted must re-encode and decode back to itself.
    let bytes = codec::encode(&db).expect("decoded database must encode");
    let again = codec::decode(&bytes).expect("encoded database must decode");
    assert_eq!(again, db);

    assert_eq!(merge(db.clone(), db.clone(), MergePolicy::Overwrite), db);
});
