//! Scanner fuzz target: feed arbitrary text to the IE container scanner, then run
//! every scanned container's codec over the same bytes as entropy.
//! Neither step may panic; malformed input must come back as an error.
//! Build with: cargo fuzz run scan_fuzz (requires nightly and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let s = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };
    let scanned = match proto_ies_gen::scan(s) {
        Ok(scanned) => scanned,
        Err(_) => return,
    };
    for def in &scanned.definitions {
        let codec = proto_ies_gen::ContainerCodec::new(def, proto_ies_gen::ByteValueCodec);
        if let Ok(list) = codec.materialize(&mut proto_ies_gen::EntropySource::from_bytes(data)) {
            let mut sink = proto_ies_gen::EntropySink::new(Vec::new());
            codec.serialize(&list, &mut sink).expect("materialized list must serialize");
        }
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run scan_fuzz");
}
