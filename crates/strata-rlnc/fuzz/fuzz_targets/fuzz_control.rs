#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_rlnc::wire::ControlHeader;

/// ControlHeader::decode must never panic, and an accepted header must
/// re-encode to the bytes it consumed.
fuzz_target!(|data: &[u8]| {
    let mut buf = data;
    if let Ok(header) = ControlHeader::decode(&mut buf) {
        let consumed = data.len() - buf.len();
        let mut out = Vec::with_capacity(header.encoded_len());
        header.encode(&mut out);
        assert_eq!(&out[..], &data[..consumed]);
    }
});
