//! Resolve error codes against a small in-memory database.
//!
//! ```text
//! cargo run --example resolve_codes -- 0x80010001 c1-2345-6 90010003
//! RUST_LOG=sce_errors=trace cargo run --example resolve_codes
//! ```

use sce_errors::{MergePolicy, ResolvedInput, ShortCodeTable, codec, merge::merge_document, report};
use tracing_subscriber::EnvFilter;

const KERNEL_DB: &[u8] = br#"{
    "001": {
        "name": "Kernel",
        "description": "Kernel core",
        "blacklist": [{ "min": "0100", "max": "01FF" }],
        "errors": {
            "0001": { "name": "NO_MEMORY", "description": "Out of memory" },
            "0002": { "name": "NOT_FOUND" }
        }
    }
}"#;

const COMMUNITY_DB: &[u8] = br#"{
    "001": {
        "name": "KernelCore",
        "blacklist": [{ "min": "00F0", "max": "02FF" }],
        "errors": {
            "0002": { "name": "ENOENT", "description": "No such object" },
            "0003": { "name": "BUSY" }
        }
    },
    "055": {
        "name": "Network",
        "errors": { "0001": { "name": "NOT_CONNECTED" } }
    }
}"#;

const SHORT_CODES: &[u8] = br#"{
    "C1-2345-6": "0x80010002",
    "NP-0001-1": "0x80550001"
}"#;

fn main() -> sce_errors::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    println!("--- Error Code Resolution Example ---\n");

    // 1. Load the base database and fold a community contribution into it.
    let mut db = codec::decode(KERNEL_DB)?;
    let stats = merge_document(&mut db, COMMUNITY_DB, MergePolicy::Preserve)?;
    println!(
        "Merged: {} facilities added, {} updated, {} errors added, {} ranges widened\n",
        stats.facilities_added,
        stats.facilities_updated,
        stats.errors_added,
        stats.blacklist_ranges_widened
    );

    // 2. Resolve each input: hex literal first, then short code.
    let short_codes = ShortCodeTable::decode(SHORT_CODES)?;
    let mut inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        inputs = ["0x80010001", "c1-2345-6", "NP-0001-1", "C0010004", "80010150", "90010003", "0x44030001", "bogus"]
            .map(str::to_owned)
            .into();
    }

    for input in &inputs {
        println!("> {input}");
        match short_codes.resolve_input(input) {
            Ok(resolved) => {
                if let ResolvedInput::ShortCode { .. } = resolved {
                    println!("{resolved}");
                }
                println!("{}\n", report::describe(&db, resolved.code()));
            }
            Err(err) => println!("{err}\n"),
        }
    }

    // 3. Show the merged database, then write it back out.
    print!("{}", report::dump(&db));
    let bytes = codec::encode_with(&db, codec::EncodeStyle::Pretty)?;
    println!("\nEncoded database is {} bytes", bytes.len());

    Ok(())
}
