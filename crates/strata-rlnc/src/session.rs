//! # Generation Sessions
//!
//! Pure logic, no I/O: the sender session turns application packets into
//! coded [`Frame`]s and reacts to control frames; the receiver session turns
//! frames back into application packets and produces the control replies.
//! Sockets and clocks belong to the caller, which passes `now` in.
//!
//! ## Generation protocol
//!
//! ```text
//!   Sender                                         Receiver
//!   fill generation g (n packets)
//!   n + redundancy coded frames  ───────────────▶  store rows, rank ↑
//!                                ◀── INNOVATIVE_ACK (optional, per packet)
//!                                ◀── REQUEST_UNCODED g [seq..] (on demand)
//!   identity-coded copies        ───────────────▶
//!                                ◀── ACKNOWLEDGE g  (rank == n, decoded)
//!   advance to g + 1
//! ```
//!
//! Without an ACKNOWLEDGE the sender re-sends a fresh batch of coded frames
//! every `generation_timeout`, and abandons the generation after
//! `max_retransmissions` rounds. The receiver skips ahead to any later
//! generation it sees while still collecting, and re-acknowledges frames of
//! the generation it just finished.
//!
//! Sequence numbers are `generation_id * generation_size + slot`, which is
//! what [`Decoder::missing_packets`] assumes.

use bytes::Bytes;
use quanta::Instant;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::CodingError;
use crate::stats::{ReceiverSessionStats, SenderSessionStats};
use crate::wire::{CodedPacket, ControlHeader, ControlType, Frame};

// ─── Sender ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct InFlight {
    generation_id: u32,
    sent_at: Instant,
    rounds: u32,
}

/// Sender side of the generation protocol.
#[derive(Debug)]
pub struct SenderSession {
    config: SessionConfig,
    encoder: Encoder,
    /// Application packets waiting for a free generation.
    pending: VecDeque<Bytes>,
    in_flight: Option<InFlight>,
    output: VecDeque<Bytes>,
    stats: SenderSessionStats,
}

impl SenderSession {
    pub fn new(config: SessionConfig) -> Result<Self, CodingError> {
        let encoder = Encoder::new(config.coding)?;
        Ok(Self::with_encoder(config, encoder))
    }

    /// Session with a reproducible coefficient stream.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Result<Self, CodingError> {
        let encoder = Encoder::with_seed(config.coding, seed)?;
        Ok(Self::with_encoder(config, encoder))
    }

    fn with_encoder(config: SessionConfig, encoder: Encoder) -> Self {
        SenderSession {
            config,
            encoder,
            pending: VecDeque::new(),
            in_flight: None,
            output: VecDeque::new(),
            stats: SenderSessionStats::default(),
        }
    }

    /// Queue an application packet. Frames are produced as soon as a
    /// generation fills and no other generation is awaiting acknowledgment.
    pub fn push(&mut self, data: Bytes, now: Instant) -> Result<(), CodingError> {
        if data.is_empty() {
            return Err(CodingError::EmptyPacket);
        }
        self.pending.push_back(data);
        self.pump(now);
        Ok(())
    }

    /// Seal a partially filled generation, padding the free slots with
    /// zero-filled packets. No-op while a generation is in flight.
    pub fn flush(&mut self, now: Instant) {
        self.pump(now);
        if self.in_flight.is_some() || self.encoder.packet_count() == 0 {
            return;
        }
        while !self.encoder.is_generation_complete() {
            let seq = self.next_seq();
            if self.encoder.add_packet(&[0], seq).is_err() {
                break;
            }
        }
        debug!(
            generation = self.encoder.generation_id(),
            "partial generation padded"
        );
        self.seal(now);
    }

    /// Handle a frame from the receiver.
    pub fn receive(&mut self, raw: Bytes, now: Instant) {
        let mut buf = raw;
        let control = match Frame::decode(&mut buf) {
            Ok(Frame::Control(c)) => c,
            Ok(Frame::Coded(pkt)) => {
                debug!(
                    generation = pkt.generation_id(),
                    "sender ignoring coded frame"
                );
                return;
            }
            Err(err) => {
                self.stats.malformed_frames += 1;
                warn!(%err, "malformed frame dropped");
                return;
            }
        };

        let current = self.in_flight.map(|f| f.generation_id);
        match control.control_type {
            ControlType::Acknowledge if current == Some(control.generation_id) => {
                self.stats.generations_acked += 1;
                info!(generation = control.generation_id, "generation acknowledged");
                self.advance(now);
            }
            ControlType::RequestUncoded if current == Some(control.generation_id) => {
                self.stats.uncoded_requests += 1;
                for &seq in &control.sequence_numbers {
                    if let Some(pkt) = self.encoder.generate_uncoded_packet(seq) {
                        self.emit(pkt);
                    }
                }
            }
            ControlType::InnovativeAck => self.stats.innovative_acks += 1,
            ControlType::HopAck => self.stats.hop_acks += 1,
            _ => debug!(%control, "control frame for inactive generation ignored"),
        }
    }

    /// Re-send or abandon the in-flight generation once its timer expires.
    pub fn poll_timeout(&mut self, now: Instant) {
        let Some(flight) = self.in_flight else {
            return;
        };
        if now.duration_since(flight.sent_at) < self.config.generation_timeout {
            return;
        }

        if flight.rounds >= self.config.max_retransmissions {
            self.stats.generations_abandoned += 1;
            warn!(
                generation = flight.generation_id,
                rounds = flight.rounds,
                "generation abandoned"
            );
            self.advance(now);
            return;
        }

        self.stats.retransmission_rounds += 1;
        debug!(
            generation = flight.generation_id,
            round = flight.rounds + 1,
            "generation timed out, re-sending"
        );
        self.emit_batch();
        self.in_flight = Some(InFlight {
            sent_at: now,
            rounds: flight.rounds + 1,
            ..flight
        });
    }

    /// Frames ready to send.
    pub fn drain_output(&mut self) -> impl Iterator<Item = Bytes> + '_ {
        self.output.drain(..)
    }

    pub fn pending_output(&self) -> usize {
        self.output.len()
    }

    /// Generation awaiting acknowledgment, if any.
    pub fn in_flight_generation(&self) -> Option<u32> {
        self.in_flight.map(|f| f.generation_id)
    }

    /// Application packets not yet placed in a generation.
    pub fn queued_packets(&self) -> usize {
        self.pending.len()
    }

    pub fn encoder(&self) -> &Encoder {
        &self.encoder
    }

    pub fn stats(&self) -> &SenderSessionStats {
        &self.stats
    }

    fn next_seq(&self) -> u32 {
        self.encoder
            .generation_id()
            .wrapping_mul(self.encoder.generation_size() as u32)
            .wrapping_add(self.encoder.packet_count() as u32)
    }

    fn pump(&mut self, now: Instant) {
        while self.in_flight.is_none() {
            while !self.encoder.is_generation_complete() {
                let Some(data) = self.pending.pop_front() else {
                    return;
                };
                let seq = self.next_seq();
                if let Err(err) = self.encoder.add_packet(&data, seq) {
                    warn!(%err, seq, "packet dropped");
                }
            }
            self.seal(now);
        }
    }

    fn seal(&mut self, now: Instant) {
        self.emit_batch();
        self.in_flight = Some(InFlight {
            generation_id: self.encoder.generation_id(),
            sent_at: now,
            rounds: 0,
        });
    }

    fn emit_batch(&mut self) {
        let count = self.encoder.generation_size() as usize + self.config.redundancy;
        for _ in 0..count {
            match self.encoder.generate_coded_packet() {
                Some(pkt) => self.emit(pkt),
                None => break,
            }
        }
    }

    fn emit(&mut self, pkt: CodedPacket) {
        self.output.push_back(Frame::Coded(pkt).to_bytes());
        self.stats.frames_sent += 1;
    }

    fn advance(&mut self, now: Instant) {
        self.in_flight = None;
        self.encoder.next_generation();
        self.pump(now);
    }
}

// ─── Receiver ───────────────────────────────────────────────────────────────

/// An original packet recovered by the receiver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredPacket {
    pub generation_id: u32,
    /// `generation_id * generation_size + slot`.
    pub sequence: u32,
    /// Normalized to `packet_size`; padding is the application's to strip.
    pub payload: Bytes,
}

/// Receiver side of the generation protocol.
#[derive(Debug)]
pub struct ReceiverSession {
    decoder: Decoder,
    innovative_acks: bool,
    output: VecDeque<Bytes>,
    delivered: VecDeque<DeliveredPacket>,
    stats: ReceiverSessionStats,
}

impl ReceiverSession {
    pub fn new(config: SessionConfig) -> Result<Self, CodingError> {
        Ok(ReceiverSession {
            decoder: Decoder::new(config.coding)?,
            innovative_acks: false,
            output: VecDeque::new(),
            delivered: VecDeque::new(),
            stats: ReceiverSessionStats::default(),
        })
    }

    /// Emit an INNOVATIVE_ACK for every packet that raises the rank.
    pub fn with_innovative_acks(mut self, enabled: bool) -> Self {
        self.innovative_acks = enabled;
        self
    }

    /// Handle a frame from the sender.
    pub fn receive(&mut self, raw: Bytes) {
        self.stats.frames_received += 1;
        let mut buf = raw;
        let pkt = match Frame::decode(&mut buf) {
            Ok(Frame::Coded(pkt)) => pkt,
            Ok(Frame::Control(c)) => {
                debug!(%c, "receiver ignoring control frame");
                return;
            }
            Err(err) => {
                self.stats.malformed_frames += 1;
                warn!(%err, "malformed frame dropped");
                return;
            }
        };

        let generation = pkt.generation_id();
        let current = self.decoder.generation_id();
        // Wrapping forward distance; the upper half of the range is behind.
        let ahead = generation.wrapping_sub(current);
        if ahead >= u32::MAX / 2 {
            self.stats.stale_packets += 1;
            if generation == current.wrapping_sub(1) {
                // Our ACKNOWLEDGE was lost; the sender is still re-sending.
                self.send_control(ControlHeader::new(ControlType::Acknowledge, generation));
            } else {
                debug!(generation, current, "stale coded frame dropped");
            }
            return;
        }
        if ahead > 0 {
            // The sender abandoned every generation in between.
            warn!(from = current, to = generation, "sender moved on, skipping ahead");
            self.stats.generations_skipped += u64::from(ahead);
            self.decoder.jump_to(generation);
        }

        let reception = match self.decoder.process_coded_packet(&pkt) {
            Ok(r) => r,
            Err(CodingError::NoFreeRow { .. }) => {
                // Every row is taken but the rank is short: give up one
                // dependent row for the new packet.
                if self.decoder.drop_redundant_row().is_none() {
                    return;
                }
                self.stats.redundant_rows_dropped += 1;
                match self.decoder.process_coded_packet(&pkt) {
                    Ok(r) => r,
                    Err(_) => return,
                }
            }
            Err(_) => return,
        };
        if self.innovative_acks && reception.is_innovative() {
            self.send_control(ControlHeader::new(ControlType::InnovativeAck, generation));
        }
        if reception.decoded {
            self.complete_generation();
        }
    }

    /// Queue a REQUEST_UNCODED for the current generation's missing slots.
    /// Returns whether a request was queued.
    pub fn request_missing(&mut self) -> bool {
        let missing = self.decoder.missing_packets();
        if missing.is_empty() {
            return false;
        }
        let request = ControlHeader::new(ControlType::RequestUncoded, self.decoder.generation_id())
            .with_sequences(missing);
        self.send_control(request);
        true
    }

    /// Control frames ready to send back.
    pub fn drain_output(&mut self) -> impl Iterator<Item = Bytes> + '_ {
        self.output.drain(..)
    }

    /// Recovered application packets, in generation and slot order.
    pub fn drain_delivered(&mut self) -> impl Iterator<Item = DeliveredPacket> + '_ {
        self.delivered.drain(..)
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn stats(&self) -> &ReceiverSessionStats {
        &self.stats
    }

    fn complete_generation(&mut self) {
        let generation = self.decoder.generation_id();
        let n = self.decoder.generation_size() as u32;
        let base = generation.wrapping_mul(n);
        for (slot, payload) in self.decoder.decoded_packets().iter().enumerate() {
            self.delivered.push_back(DeliveredPacket {
                generation_id: generation,
                sequence: base.wrapping_add(slot as u32),
                payload: payload.clone(),
            });
            self.stats.packets_delivered += 1;
        }
        self.send_control(ControlHeader::new(ControlType::Acknowledge, generation));
        self.decoder.next_generation();
    }

    fn send_control(&mut self, control: ControlHeader) {
        self.output.push_back(Frame::Control(control).to_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CodingConfig;
    use crate::wire::CodedPacketHeader;
    use std::time::Duration;

    fn session_config(n: u16, size: usize) -> SessionConfig {
        SessionConfig {
            coding: CodingConfig::new(n, size).unwrap(),
            redundancy: 1,
            generation_timeout: Duration::from_millis(100),
            max_retransmissions: 2,
        }
    }

    fn ack(generation: u32) -> Bytes {
        Frame::Control(ControlHeader::new(ControlType::Acknowledge, generation)).to_bytes()
    }

    #[test]
    fn sender_waits_for_full_generation() {
        let now = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(3, 8), 1).unwrap();
        tx.push(Bytes::from_static(b"one"), now).unwrap();
        tx.push(Bytes::from_static(b"two"), now).unwrap();
        assert_eq!(tx.pending_output(), 0);
        tx.push(Bytes::from_static(b"three"), now).unwrap();
        assert_eq!(tx.pending_output(), 4);
        assert_eq!(tx.in_flight_generation(), Some(0));
    }

    #[test]
    fn sender_holds_next_generation_until_ack() {
        let now = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(2, 8), 2).unwrap();
        for i in 0..4u8 {
            tx.push(Bytes::from(vec![i + 1; 8]), now).unwrap();
        }
        assert_eq!(tx.drain_output().count(), 3);
        assert_eq!(tx.queued_packets(), 2);

        tx.receive(ack(5), now);
        assert_eq!(tx.in_flight_generation(), Some(0));

        tx.receive(ack(0), now);
        assert_eq!(tx.in_flight_generation(), Some(1));
        assert_eq!(tx.queued_packets(), 0);
        assert_eq!(tx.drain_output().count(), 3);
        assert_eq!(tx.stats().generations_acked, 1);
    }

    #[test]
    fn sender_retransmits_then_abandons() {
        let t0 = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(2, 8), 3).unwrap();
        tx.push(Bytes::from_static(b"a"), t0).unwrap();
        tx.push(Bytes::from_static(b"b"), t0).unwrap();
        tx.drain_output().for_each(drop);

        tx.poll_timeout(t0 + Duration::from_millis(50));
        assert_eq!(tx.pending_output(), 0);

        tx.poll_timeout(t0 + Duration::from_millis(100));
        assert_eq!(tx.drain_output().count(), 3);
        tx.poll_timeout(t0 + Duration::from_millis(200));
        assert_eq!(tx.drain_output().count(), 3);
        assert_eq!(tx.stats().retransmission_rounds, 2);

        tx.poll_timeout(t0 + Duration::from_millis(300));
        assert_eq!(tx.in_flight_generation(), None);
        assert_eq!(tx.stats().generations_abandoned, 1);
        assert_eq!(tx.encoder().generation_id(), 1);
    }

    #[test]
    fn sender_answers_uncoded_requests() {
        let now = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(2, 4), 4).unwrap();
        tx.push(Bytes::from_static(b"abcd"), now).unwrap();
        tx.push(Bytes::from_static(b"efgh"), now).unwrap();
        tx.drain_output().for_each(drop);

        let request = ControlHeader::new(ControlType::RequestUncoded, 0).with_sequences([1, 9]);
        tx.receive(Frame::Control(request).to_bytes(), now);
        let frames: Vec<Bytes> = tx.drain_output().collect();
        assert_eq!(frames.len(), 1);
        match Frame::decode(&mut frames[0].clone()).unwrap() {
            Frame::Coded(pkt) => {
                assert!(pkt.is_uncoded());
                assert_eq!(&pkt.payload[..], b"efgh");
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn flush_pads_partial_generation() {
        let now = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(4, 4), 5).unwrap();
        tx.push(Bytes::from_static(b"only"), now).unwrap();
        tx.flush(now);
        assert_eq!(tx.in_flight_generation(), Some(0));
        assert_eq!(tx.encoder().sequence_numbers(), vec![0, 1, 2, 3]);
        assert_eq!(tx.pending_output(), 5);
    }

    #[test]
    fn malformed_frames_are_counted() {
        let now = Instant::now();
        let mut tx = SenderSession::with_seed(session_config(2, 4), 6).unwrap();
        tx.receive(Bytes::from_static(&[9, 9]), now);
        assert_eq!(tx.stats().malformed_frames, 1);

        let mut rx = ReceiverSession::new(session_config(2, 4)).unwrap();
        rx.receive(Bytes::from_static(&[0, 0, 0]));
        assert_eq!(rx.stats().malformed_frames, 1);
    }

    fn acks_for(frames: Vec<Bytes>, generation: u32) -> usize {
        frames
            .into_iter()
            .filter_map(|mut b| match Frame::decode(&mut b) {
                Ok(Frame::Control(c)) => Some(c),
                _ => None,
            })
            .filter(|c| c.control_type == ControlType::Acknowledge && c.generation_id == generation)
            .count()
    }

    #[test]
    fn receiver_delivers_and_acknowledges() {
        let now = Instant::now();
        let cfg = session_config(2, 4);
        let mut tx = SenderSession::with_seed(cfg.clone(), 7).unwrap();
        let mut rx = ReceiverSession::new(cfg).unwrap().with_innovative_acks(true);
        tx.push(Bytes::from_static(b"wxyz"), now).unwrap();
        tx.push(Bytes::from_static(b"1234"), now).unwrap();

        let frames: Vec<Bytes> = tx.drain_output().collect();
        let mut fed = 0;
        while rx.decoder().generation_id() == 0 {
            rx.receive(frames[fed].clone());
            fed += 1;
        }
        let delivered: Vec<DeliveredPacket> = rx.drain_delivered().collect();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].sequence, 0);
        assert_eq!(&delivered[0].payload[..], b"wxyz");
        assert_eq!(&delivered[1].payload[..], b"1234");

        let replies: Vec<Bytes> = rx.drain_output().collect();
        assert!(replies.iter().any(|b| matches!(
            Frame::decode(&mut b.clone()),
            Ok(Frame::Control(c)) if c.control_type == ControlType::InnovativeAck
        )));
        assert_eq!(acks_for(replies, 0), 1);

        // A generation-0 frame after the decode means the ACK was lost: re-ACK.
        rx.receive(frames[0].clone());
        assert_eq!(rx.decoder().generation_id(), 1);
        assert_eq!(rx.stats().stale_packets, 1);
        assert_eq!(acks_for(rx.drain_output().collect(), 0), 1);
        assert_eq!(rx.drain_delivered().count(), 0);
    }

    #[test]
    fn receiver_requests_missing_slots() {
        let mut rx = ReceiverSession::new(session_config(3, 4)).unwrap();
        assert!(rx.request_missing());
        let mut frame = rx.drain_output().next().unwrap();
        match Frame::decode(&mut frame).unwrap() {
            Frame::Control(c) => {
                assert_eq!(c.control_type, ControlType::RequestUncoded);
                assert_eq!(c.sequence_numbers, vec![0, 1, 2]);
            }
            other => panic!("unexpected frame {:?}", other),
        }
    }

    #[test]
    fn receiver_skips_to_next_generation() {
        let now = Instant::now();
        let cfg = session_config(2, 4);
        let mut tx = SenderSession::with_seed(cfg.clone(), 8).unwrap();
        let mut rx = ReceiverSession::new(cfg).unwrap();
        for p in [b"aaaa", b"bbbb", b"cccc", b"dddd"] {
            tx.push(Bytes::from_static(p), now).unwrap();
        }
        // Deliver one frame of generation 0, then let the sender give up on it.
        let first: Vec<Bytes> = tx.drain_output().collect();
        rx.receive(first[0].clone());
        for ms in [100, 200] {
            tx.poll_timeout(now + Duration::from_millis(ms));
            tx.drain_output().for_each(drop);
        }
        tx.poll_timeout(now + Duration::from_millis(300));
        assert_eq!(tx.in_flight_generation(), Some(1));

        let frames: Vec<Bytes> = tx.drain_output().collect();
        for frame in frames {
            rx.receive(frame);
        }
        assert_eq!(rx.stats().generations_skipped, 1);
        let delivered: Vec<DeliveredPacket> = rx.drain_delivered().collect();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].generation_id, 1);
        assert_eq!(delivered[0].sequence, 2);
        assert_eq!(&delivered[1].payload[..], b"dddd");
    }

    #[test]
    fn receiver_skips_over_several_abandoned_generations() {
        let now = Instant::now();
        let cfg = SessionConfig {
            max_retransmissions: 0,
            ..session_config(2, 4)
        };
        let mut tx = SenderSession::with_seed(cfg.clone(), 9).unwrap();
        let mut rx = ReceiverSession::new(cfg).unwrap();
        for p in [b"aaaa", b"bbbb", b"cccc", b"dddd", b"eeee", b"ffff"] {
            tx.push(Bytes::from_static(p), now).unwrap();
        }
        // Generations 0 and 1 never reach the receiver.
        tx.drain_output().for_each(drop);
        tx.poll_timeout(now + Duration::from_millis(100));
        assert_eq!(tx.in_flight_generation(), Some(1));
        tx.drain_output().for_each(drop);
        tx.poll_timeout(now + Duration::from_millis(200));
        assert_eq!(tx.in_flight_generation(), Some(2));
        assert_eq!(tx.stats().generations_abandoned, 2);

        let frames: Vec<Bytes> = tx.drain_output().collect();
        for frame in frames {
            rx.receive(frame);
        }
        assert_eq!(rx.stats().generations_skipped, 2);
        let delivered: Vec<DeliveredPacket> = rx.drain_delivered().collect();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].generation_id, 2);
        assert_eq!(delivered[0].sequence, 4);
        assert_eq!(delivered[1].sequence, 5);
        assert_eq!(&delivered[1].payload[..], b"ffff");

        for reply in rx.drain_output().collect::<Vec<_>>() {
            tx.receive(reply, now + Duration::from_millis(250));
        }
        assert_eq!(tx.stats().generations_acked, 1);
        assert_eq!(tx.in_flight_generation(), None);
    }

    #[test]
    fn receiver_skip_ahead_wraps_generation_ids() {
        let mut rx = ReceiverSession::new(session_config(2, 1)).unwrap();
        let coded = |generation: u32| {
            Frame::Coded(CodedPacket {
                header: CodedPacketHeader::new(generation, 2, vec![1, 0]),
                payload: Bytes::from_static(&[7]),
            })
            .to_bytes()
        };
        rx.receive(coded(u32::MAX / 2 - 1));
        rx.receive(coded(u32::MAX - 3));
        assert_eq!(rx.decoder().generation_id(), u32::MAX - 3);
        let skipped = rx.stats().generations_skipped;

        rx.receive(coded(1));
        assert_eq!(rx.decoder().generation_id(), 1);
        assert_eq!(rx.stats().generations_skipped - skipped, 5);

        // Far behind: dropped without touching the current generation.
        rx.receive(coded(u32::MAX - 5));
        assert_eq!(rx.decoder().generation_id(), 1);
        assert_eq!(rx.decoder().rank(), 1);
        assert_eq!(rx.stats().stale_packets, 1);
    }

    #[test]
    fn receiver_frees_a_dependent_row_when_full() {
        let mut rx = ReceiverSession::new(session_config(2, 2)).unwrap();
        let coded = |coeffs: Vec<u8>, payload: &'static [u8]| {
            Frame::Coded(CodedPacket {
                header: CodedPacketHeader::new(0, 2, coeffs),
                payload: Bytes::from_static(payload),
            })
            .to_bytes()
        };
        // Originals [1, 0] and [0, 1]: x = 1*a + 2*b, 2*x, then a + 3*b.
        rx.receive(coded(vec![1, 2], &[1, 2]));
        rx.receive(coded(vec![2, 4], &[2, 4]));
        assert_eq!(rx.decoder().rank(), 1);
        assert_eq!(rx.decoder().stored_rows(), 2);

        rx.receive(coded(vec![1, 3], &[1, 3]));
        assert_eq!(rx.stats().redundant_rows_dropped, 1);
        let delivered: Vec<DeliveredPacket> = rx.drain_delivered().collect();
        assert_eq!(delivered.len(), 2);
        assert_eq!(&delivered[0].payload[..], &[1, 0]);
        assert_eq!(&delivered[1].payload[..], &[0, 1]);
    }
}
