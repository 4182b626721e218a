#![no_main]

use libfuzzer_sys::fuzz_target;
use strata_rlnc::config::CodingConfig;
use strata_rlnc::decoder::Decoder;
use strata_rlnc::wire::CodedPacket;

/// Feed arbitrary coded packets to a small decoder.
///
/// The first byte picks the generation size; the rest is split into
/// length-prefixed chunks, each parsed as a coded packet. Rank must never
/// exceed the generation size and decoding must never panic.
fuzz_target!(|data: &[u8]| {
    let Some((&n, mut rest)) = data.split_first() else {
        return;
    };
    let n = (n % 16) as u16 + 1;
    let Ok(config) = CodingConfig::new(n, 32) else {
        return;
    };
    let Ok(mut dec) = Decoder::new(config) else {
        return;
    };

    while let Some((&len, tail)) = rest.split_first() {
        let len = (len as usize).min(tail.len());
        let mut chunk = &tail[..len];
        rest = &tail[len..];
        if let Ok(pkt) = CodedPacket::decode(&mut chunk) {
            let _ = dec.process_coded_packet(&pkt);
        }
        assert!(dec.rank() <= n as usize);
    }
    let _ = dec.decoded_packets();
    let _ = dec.missing_packets();
});
