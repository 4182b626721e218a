#![no_main]

use bytes::Bytes;
use libfuzzer_sys::fuzz_target;
use strata_rlnc::config::{CodingConfig, SessionConfig};
use strata_rlnc::session::ReceiverSession;

/// Drive the receiver session with arbitrary frames. It must never panic,
/// whatever mix of coded, control and malformed input it sees.
fuzz_target!(|data: &[u8]| {
    let config = SessionConfig {
        coding: CodingConfig {
            generation_size: 4,
            packet_size: 16,
        },
        ..SessionConfig::default()
    };
    let Ok(rx) = ReceiverSession::new(config) else {
        return;
    };
    let mut rx = rx.with_innovative_acks(true);

    rx.receive(Bytes::copy_from_slice(data));
    if data.len() >= 16 {
        let mid = data.len() / 2;
        rx.receive(Bytes::copy_from_slice(&data[..mid]));
        rx.receive(Bytes::copy_from_slice(&data[mid..]));
    }
    rx.request_missing();

    for _ in rx.drain_delivered() {}
    for _ in rx.drain_output() {}
});
