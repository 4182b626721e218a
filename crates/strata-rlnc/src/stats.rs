//! # Coding Statistics
//!
//! Counters kept by the encoder, decoder and sessions. Serializable for JSON
//! export alongside the transport stats.

use serde::Serialize;

// ─── Encoder Stats ──────────────────────────────────────────────────────────

/// Sender-side coding counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EncoderStats {
    /// Original packets accepted into a generation.
    pub packets_added: u64,
    /// Packets refused (full, duplicate or empty).
    pub packets_rejected: u64,
    /// Random linear combinations produced.
    pub coded_generated: u64,
    /// Identity-coded copies produced.
    pub uncoded_generated: u64,
    /// Generations advanced past.
    pub generations_completed: u64,
}

impl EncoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Coded packets emitted per original packet accepted.
    pub fn overhead_ratio(&self) -> f64 {
        if self.packets_added == 0 {
            0.0
        } else {
            (self.coded_generated + self.uncoded_generated) as f64 / self.packets_added as f64
        }
    }
}

// ─── Decoder Stats ──────────────────────────────────────────────────────────

/// Receiver-side coding counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecoderStats {
    /// Coded packets offered to the decoder.
    pub packets_received: u64,
    /// Packets stored in a matrix row.
    pub packets_stored: u64,
    /// Stored packets that did not raise the rank.
    pub packets_redundant: u64,
    /// Packets refused (wrong generation, decoded, no free row, ...).
    pub packets_rejected: u64,
    /// Generations fully recovered.
    pub generations_decoded: u64,
    /// Decode attempts aborted on a zero pivot.
    pub decode_failures: u64,
}

impl DecoderStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of stored packets that raised the rank.
    pub fn innovation_rate(&self) -> f64 {
        if self.packets_stored == 0 {
            0.0
        } else {
            let innovative = self.packets_stored.saturating_sub(self.packets_redundant);
            innovative as f64 / self.packets_stored as f64
        }
    }
}

// ─── Session Stats ──────────────────────────────────────────────────────────

/// Generation-level ACK/retransmit counters for a sender session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SenderSessionStats {
    pub frames_sent: u64,
    pub generations_acked: u64,
    pub generations_abandoned: u64,
    pub retransmission_rounds: u64,
    pub uncoded_requests: u64,
    pub innovative_acks: u64,
    pub hop_acks: u64,
    pub malformed_frames: u64,
}

/// Counters for a receiver session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReceiverSessionStats {
    pub frames_received: u64,
    pub packets_delivered: u64,
    pub generations_skipped: u64,
    /// Dependent rows freed so a full, rank-deficient matrix could keep
    /// collecting.
    pub redundant_rows_dropped: u64,
    pub stale_packets: u64,
    pub malformed_frames: u64,
}
