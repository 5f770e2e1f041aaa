//! Fuzz target: `RawRecord::from_json` → `DataFrame::decode`
//!
//! Drives arbitrary byte sequences through the JSON record parser and the
//! frame codec and asserts that they never panic and that every accepted
//! frame satisfies the codec's structural guarantees.
//!
//! cargo fuzz run fuzz_record_decode

#![no_main]

use biolink::frame::{DataFrame, RawRecord};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(payload) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(raw) = RawRecord::from_json(payload) {
        if let Ok(frame) = DataFrame::decode(raw) {
            // Decode must never accept a frame without samples.
            assert!(!frame.analog_channels.is_empty());
        }
    }
});
