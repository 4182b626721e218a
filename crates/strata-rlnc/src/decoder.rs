//! # Generation Decoder
//!
//! Holds a `generation_size × generation_size` coefficient matrix and a
//! parallel `generation_size × packet_size` payload matrix. Each accepted
//! coded packet is written into the first all-zero row; once the
//! coefficient matrix reaches full rank the generation is solved by
//! Gauss-Jordan elimination with the payloads as the augmented side.
//!
//! ```text
//!   Collecting ──rank == n──▶ Decodable ──decode──▶ Decoded
//!        ▲                                              │
//!        └──────────────── next_generation() ───────────┘
//! ```
//!
//! Rank is recomputed from scratch on every query. That is O(n³), fine for
//! generations of tens of packets.

use bytes::Bytes;
use std::collections::BTreeSet;
use tracing::{debug, error, info, trace, warn};

use crate::config::CodingConfig;
use crate::encoder::normalize;
use crate::error::CodingError;
use crate::gf256;
use crate::stats::DecoderStats;
use crate::wire::CodedPacket;

/// Where a decoder is in its generation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Rank below generation size.
    Collecting,
    /// Full rank, payloads not yet materialized.
    Decodable,
    /// Originals recovered; further packets are refused.
    Decoded,
}

/// Outcome of storing a coded packet.
///
/// Storage success is the compatibility "innovative" signal. A stored packet
/// can still be a linear combination of earlier rows; [`is_innovative`]
/// answers that strictly.
///
/// [`is_innovative`]: Reception::is_innovative
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reception {
    /// Matrix row the packet was written to.
    pub row: usize,
    pub rank_before: usize,
    pub rank_after: usize,
    /// The generation was solved as a result of this packet.
    pub decoded: bool,
}

impl Reception {
    /// Whether the packet raised the rank of the coefficient matrix.
    pub fn is_innovative(&self) -> bool {
        self.rank_after > self.rank_before
    }
}

/// One equation: coefficient row plus payload (right-hand side).
#[derive(Clone, Debug)]
struct DecoderRow {
    coeffs: Vec<u8>,
    data: Vec<u8>,
}

impl DecoderRow {
    fn zeroed(n: usize, packet_size: usize) -> Self {
        DecoderRow {
            coeffs: vec![0; n],
            data: vec![0; packet_size],
        }
    }

    fn is_empty(&self) -> bool {
        self.coeffs.iter().all(|&c| c == 0)
    }

    fn clear(&mut self) {
        self.coeffs.fill(0);
        self.data.fill(0);
    }
}

/// Receiver side of one coding flow.
#[derive(Debug)]
pub struct Decoder {
    config: CodingConfig,
    generation_id: u32,
    rows: Vec<DecoderRow>,
    decoded: bool,
    decoded_packets: Vec<Bytes>,
    stats: DecoderStats,
}

impl Decoder {
    pub fn new(config: CodingConfig) -> Result<Self, CodingError> {
        Self::starting_at(config, 0)
    }

    /// A decoder whose current generation is `generation_id`.
    pub fn starting_at(config: CodingConfig, generation_id: u32) -> Result<Self, CodingError> {
        config.validate()?;
        let n = config.generation_len();
        Ok(Decoder {
            rows: (0..n)
                .map(|_| DecoderRow::zeroed(n, config.packet_size))
                .collect(),
            config,
            generation_id,
            decoded: false,
            decoded_packets: Vec::new(),
            stats: DecoderStats::default(),
        })
    }

    /// Store a coded packet of the current generation.
    ///
    /// Refused without any state change if the generation is already
    /// decoded, the generation id differs, the coefficient vector is empty
    /// or all zero, or every row is taken. Coefficients are padded or
    /// truncated to `generation_size`, the payload to `packet_size`. Reaching
    /// full rank decodes immediately.
    pub fn process_coded_packet(&mut self, packet: &CodedPacket) -> Result<Reception, CodingError> {
        self.stats.packets_received += 1;
        let result = self.store(packet);
        if let Err(err) = &result {
            self.stats.packets_rejected += 1;
            debug!(
                generation = self.generation_id,
                packet_generation = packet.generation_id(),
                %err,
                "coded packet refused"
            );
        }
        result
    }

    fn store(&mut self, packet: &CodedPacket) -> Result<Reception, CodingError> {
        if self.decoded {
            return Err(CodingError::AlreadyDecoded {
                generation: self.generation_id,
            });
        }
        if packet.generation_id() != self.generation_id {
            return Err(CodingError::GenerationMismatch {
                expected: self.generation_id,
                got: packet.generation_id(),
            });
        }

        let n = self.config.generation_len();
        let coeffs = packet.coefficients();
        if coeffs.iter().take(n).all(|&c| c == 0) {
            return Err(CodingError::EmptyCoefficients);
        }

        let Some(row) = self.rows.iter().position(DecoderRow::is_empty) else {
            warn!(generation = self.generation_id, "no free row for coded packet");
            return Err(CodingError::NoFreeRow {
                generation: self.generation_id,
            });
        };

        let rank_before = self.rank();

        let target = &mut self.rows[row];
        target.coeffs.fill(0);
        let m = coeffs.len().min(n);
        target.coeffs[..m].copy_from_slice(&coeffs[..m]);
        target.data = normalize(&packet.payload, self.config.packet_size).to_vec();

        let rank_after = self.rank();
        self.stats.packets_stored += 1;
        if rank_after <= rank_before {
            self.stats.packets_redundant += 1;
        }
        trace!(
            generation = self.generation_id,
            row,
            rank = rank_after,
            "coded packet stored"
        );

        let mut decoded = false;
        if rank_after == n {
            info!(
                generation = self.generation_id,
                "full rank reached, decoding"
            );
            decoded = self.decode_generation().is_ok();
        }

        Ok(Reception {
            row,
            rank_before,
            rank_after,
            decoded,
        })
    }

    /// Whether the coefficient matrix has full rank.
    pub fn can_decode(&self) -> bool {
        self.rank() == self.config.generation_len()
    }

    /// Rank of the coefficient matrix, by forward elimination on a copy.
    pub fn rank(&self) -> usize {
        matrix_rank(self.rows.iter().map(|r| r.coeffs.clone()).collect())
    }

    /// Free one stored row whose removal keeps the rank, so a full but
    /// rank-deficient matrix can accept another packet. Returns the freed
    /// row, or `None` if every stored row is independent or the generation
    /// is decoded.
    pub fn drop_redundant_row(&mut self) -> Option<usize> {
        if self.decoded {
            return None;
        }
        let rank = self.rank();
        let row = (0..self.rows.len()).rev().find(|&i| {
            if self.rows[i].is_empty() {
                return false;
            }
            let without: Vec<Vec<u8>> = self
                .rows
                .iter()
                .enumerate()
                .filter(|&(j, _)| j != i)
                .map(|(_, r)| r.coeffs.clone())
                .collect();
            matrix_rank(without) == rank
        })?;
        self.rows[row].clear();
        debug!(generation = self.generation_id, row, rank, "redundant row dropped");
        Some(row)
    }

    /// Solve the generation with Gauss-Jordan elimination.
    ///
    /// Works on copies; the stored matrices are untouched. On a zero pivot
    /// the attempt is abandoned and the generation stays undecoded.
    fn decode_generation(&mut self) -> Result<(), CodingError> {
        if self.decoded {
            return Ok(());
        }

        let n = self.config.generation_len();
        let mut rows = self.rows.clone();

        for col in 0..n {
            let Some(pivot_row) = (col..n).find(|&r| rows[r].coeffs[col] != 0) else {
                error!(
                    generation = self.generation_id,
                    column = col,
                    "matrix singular during decode"
                );
                self.stats.decode_failures += 1;
                return Err(CodingError::SingularMatrix { column: col });
            };
            rows.swap(col, pivot_row);

            let pivot_inv = gf256::inv(rows[col].coeffs[col])?;
            gf256::mul_slice(&mut rows[col].coeffs, pivot_inv);
            gf256::mul_slice(&mut rows[col].data, pivot_inv);

            let pivot = rows[col].clone();
            for (r, row) in rows.iter_mut().enumerate() {
                if r == col {
                    continue;
                }
                let factor = row.coeffs[col];
                if factor == 0 {
                    continue;
                }
                gf256::mul_add_slice(&mut row.coeffs, &pivot.coeffs, factor);
                gf256::mul_add_slice(&mut row.data, &pivot.data, factor);
            }
        }

        self.decoded_packets = rows.into_iter().map(|r| Bytes::from(r.data)).collect();
        self.decoded = true;
        self.stats.generations_decoded += 1;
        info!(generation = self.generation_id, "generation decoded");
        Ok(())
    }

    /// Recovered originals in slot order.
    ///
    /// Decodes on demand if the matrix became decodable; empty while the
    /// generation cannot be solved. Repeated calls return the same bytes.
    pub fn decoded_packets(&mut self) -> &[Bytes] {
        if !self.decoded && self.can_decode() {
            // Failure is logged and counted by decode_generation.
            let _ = self.decode_generation();
        }
        &self.decoded_packets
    }

    /// Best-effort set of sequence numbers not yet recovered.
    ///
    /// Assumes the sender numbers packets `generation_id * generation_size +
    /// slot` and reports one sequence number per unused matrix row. No
    /// per-sequence receipt is tracked, so this is an estimate.
    pub fn missing_packets(&self) -> BTreeSet<u32> {
        if self.decoded {
            return BTreeSet::new();
        }
        let n = self.config.generation_size as u32;
        let base = self.generation_id.wrapping_mul(n);
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_empty())
            .map(|(i, _)| base.wrapping_add(i as u32))
            .collect()
    }

    /// Advance to the next generation, zeroing both matrices.
    pub fn next_generation(&mut self) {
        self.generation_id = self.generation_id.wrapping_add(1);
        self.reset();
        info!(generation = self.generation_id, "decoder advanced");
    }

    /// Move straight to `generation_id`, zeroing both matrices.
    pub fn jump_to(&mut self, generation_id: u32) {
        self.generation_id = generation_id;
        self.reset();
        info!(generation = generation_id, "decoder moved");
    }

    /// Change the generation geometry and reset the current generation.
    pub fn reconfigure(&mut self, config: CodingConfig) -> Result<(), CodingError> {
        config.validate()?;
        let n = config.generation_len();
        self.config = config;
        self.rows = (0..n)
            .map(|_| DecoderRow::zeroed(n, config.packet_size))
            .collect();
        self.decoded = false;
        self.decoded_packets.clear();
        Ok(())
    }

    /// Discard every stored row of the current generation, keeping its id.
    pub fn reset(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.decoded = false;
        self.decoded_packets.clear();
    }

    pub fn state(&self) -> DecoderState {
        if self.decoded {
            DecoderState::Decoded
        } else if self.can_decode() {
            DecoderState::Decodable
        } else {
            DecoderState::Collecting
        }
    }

    pub fn is_decoded(&self) -> bool {
        self.decoded
    }

    /// Rows currently holding a packet.
    pub fn stored_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.is_empty()).count()
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

    pub fn stats(&self) -> &DecoderStats {
        &self.stats
    }
}

/// Rank of `matrix` (rows of coefficients) by forward elimination.
fn matrix_rank(mut matrix: Vec<Vec<u8>>) -> usize {
    let rows = matrix.len();
    let cols = matrix.first().map_or(0, Vec::len);
    let mut rank = 0;

    for col in 0..cols {
        let Some(pivot_row) = (rank..rows).find(|&r| matrix[r][col] != 0) else {
            continue;
        };
        matrix.swap(rank, pivot_row);
        let pivot = matrix[rank][col];

        for r in rank + 1..rows {
            let entry = matrix[r][col];
            if entry == 0 {
                continue;
            }
            // pivot is nonzero
            let factor = gf256::div(entry, pivot).unwrap_or(0);
            let (upper, lower) = matrix.split_at_mut(r);
            gf256::mul_add_slice(&mut lower[0][col..], &upper[rank][col..], factor);
        }
        rank += 1;
        if rank == rows {
            break;
        }
    }
    rank
}
