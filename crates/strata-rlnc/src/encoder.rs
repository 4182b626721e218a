//! # Generation Encoder
//!
//! Buffers up to `generation_size` original packets, keyed by sequence
//! number, and emits random linear combinations of everything buffered.
//!
//! Slot order is ascending sequence number: coefficient `i` of every coded
//! packet applies to the `i`-th smallest buffered sequence number. Slots past
//! the current occupancy carry coefficient 0, so a partially filled
//! generation still codes correctly.
//!
//! Coefficients are redrawn on every call. Two independently drawn vectors
//! over GF(256) are linearly dependent with probability at most 1/255.

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::config::CodingConfig;
use crate::error::CodingError;
use crate::gf256;
use crate::stats::EncoderStats;
use crate::wire::{CodedPacket, CodedPacketHeader};

/// Sender side of one coding flow.
#[derive(Debug)]
pub struct Encoder {
    config: CodingConfig,
    generation_id: u32,
    /// seq → payload normalized to `packet_size`.
    packets: BTreeMap<u32, Bytes>,
    rng: StdRng,
    stats: EncoderStats,
}

impl Encoder {
    /// Create an encoder seeded from the thread RNG.
    pub fn new(config: CodingConfig) -> Result<Self, CodingError> {
        Self::with_seed(config, rand::random())
    }

    /// Create an encoder with a reproducible coefficient stream.
    pub fn with_seed(config: CodingConfig, seed: u64) -> Result<Self, CodingError> {
        config.validate()?;
        Ok(Encoder {
            config,
            generation_id: 0,
            packets: BTreeMap::new(),
            rng: StdRng::seed_from_u64(seed),
            stats: EncoderStats::default(),
        })
    }

    /// Buffer an original packet for the current generation.
    ///
    /// The copy is truncated or zero-padded to `packet_size`. Nothing changes
    /// on rejection.
    pub fn add_packet(&mut self, data: &[u8], seq: u32) -> Result<(), CodingError> {
        let rejection = if data.is_empty() {
            Some(CodingError::EmptyPacket)
        } else if self.packets.len() >= self.config.generation_len() {
            Some(CodingError::GenerationFull {
                generation: self.generation_id,
                size: self.config.generation_size,
            })
        } else if self.packets.contains_key(&seq) {
            Some(CodingError::DuplicateSequence(seq))
        } else {
            None
        };
        if let Some(err) = rejection {
            warn!(generation = self.generation_id, seq, %err, "packet not added");
            self.stats.packets_rejected += 1;
            return Err(err);
        }

        self.packets
            .insert(seq, normalize(data, self.config.packet_size));
        self.stats.packets_added += 1;
        debug!(
            generation = self.generation_id,
            seq,
            buffered = self.packets.len(),
            "packet added"
        );
        Ok(())
    }

    /// Whether every slot of the generation is occupied.
    pub fn is_generation_complete(&self) -> bool {
        self.packets.len() >= self.config.generation_len()
    }

    /// A fresh random linear combination of every buffered packet, or `None`
    /// if nothing is buffered.
    pub fn generate_coded_packet(&mut self) -> Option<CodedPacket> {
        if self.packets.is_empty() {
            warn!(
                generation = self.generation_id,
                "cannot code: generation is empty"
            );
            return None;
        }

        let mut coefficients = vec![0u8; self.config.generation_len()];
        for c in coefficients.iter_mut().take(self.packets.len()) {
            *c = self.rng.random_range(1..=255u8);
        }

        let mut payload = vec![0u8; self.config.packet_size];
        for (data, &c) in self.packets.values().zip(&coefficients) {
            gf256::mul_add_slice(&mut payload, data, c);
        }

        self.stats.coded_generated += 1;
        debug!(
            generation = self.generation_id,
            sources = self.packets.len(),
            "coded packet generated"
        );
        Some(CodedPacket {
            header: CodedPacketHeader::new(
                self.generation_id,
                self.config.generation_size,
                coefficients,
            ),
            payload: Bytes::from(payload),
        })
    }

    /// The original packet `seq` with an identity coefficient vector, or
    /// `None` if `seq` is not buffered.
    pub fn generate_uncoded_packet(&mut self, seq: u32) -> Option<CodedPacket> {
        let Some(slot) = self.packets.keys().position(|&s| s == seq) else {
            warn!(
                generation = self.generation_id,
                seq, "cannot send uncoded: sequence not buffered"
            );
            return None;
        };

        let mut coefficients = vec![0u8; self.config.generation_len()];
        coefficients[slot] = 1;

        self.stats.uncoded_generated += 1;
        Some(CodedPacket {
            header: CodedPacketHeader::new(
                self.generation_id,
                self.config.generation_size,
                coefficients,
            ),
            payload: self.packets[&seq].clone(),
        })
    }

    /// Advance to the next generation, dropping every buffered packet.
    pub fn next_generation(&mut self) {
        self.generation_id = self.generation_id.wrapping_add(1);
        self.packets.clear();
        self.stats.generations_completed += 1;
        info!(generation = self.generation_id, "encoder advanced");
    }

    /// Change the generation geometry. The buffer is cleared; the generation
    /// id is kept.
    pub fn reconfigure(&mut self, config: CodingConfig) -> Result<(), CodingError> {
        config.validate()?;
        self.config = config;
        self.packets.clear();
        Ok(())
    }

    pub fn generation_id(&self) -> u32 {
        self.generation_id
    }

    pub fn generation_size(&self) -> u16 {
        self.config.generation_size
    }

    pub fn packet_size(&self) -> usize {
        self.config.packet_size
    }

    pub fn config(&self) -> &CodingConfig {
        &self.config
    }

    /// Number of buffered packets.
    pub fn packet_count(&self) -> usize {
        self.packets.len()
    }

    /// Buffered sequence numbers in slot order.
    pub fn sequence_numbers(&self) -> Vec<u32> {
        self.packets.keys().copied().collect()
    }

    /// Normalized payload of a buffered packet.
    pub fn packet(&self, seq: u32) -> Option<&Bytes> {
        self.packets.get(&seq)
    }

    pub fn stats(&self) -> &EncoderStats {
        &self.stats
    }
}

/// Truncate or zero-pad to `len`.
pub(crate) fn normalize(data: &[u8], len: usize) -> Bytes {
    if data.len() == len {
        return Bytes::copy_from_slice(data);
    }
    let mut out = vec![0u8; len];
    let n = data.len().min(len);
    out[..n].copy_from_slice(&data[..n]);
    Bytes::from(out)
}
