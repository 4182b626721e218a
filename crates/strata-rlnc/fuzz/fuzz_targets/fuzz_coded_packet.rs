#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_rlnc::wire::{CodedPacket, CodedPacketHeader, Frame};

/// Coded header and frame parsing must reject garbage without panicking,
/// and anything accepted must re-encode to the same bytes.
fuzz_target!(|data: &[u8]| {
    let mut buf = data;
    let _ = CodedPacketHeader::decode(&mut buf);

    let mut buf = data;
    if let Ok(pkt) = CodedPacket::decode(&mut buf) {
        assert_eq!(&pkt.to_bytes()[..], data);
    }

    let mut buf = data;
    let _ = Frame::decode(&mut buf);
});
