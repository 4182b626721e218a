//! # Error Types
//!
//! Every rejection the coding core can produce. None of these panic or
//! escape as unwinds; callers decide whether to drop, retry or abandon.

use thiserror::Error;

// ── Field Arithmetic ────────────────────────────────────────────────

/// Division or inversion with a zero operand in GF(2^8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GfError {
    #[error("division by zero in GF(256)")]
    DivisionByZero,
    #[error("zero has no multiplicative inverse in GF(256)")]
    ZeroInverse,
}

// ── Wire Parsing ────────────────────────────────────────────────────

/// Malformed header bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    #[error("buffer too short: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },
    #[error("coefficient count {count} does not match generation size {generation_size}")]
    CoefficientCountMismatch { count: u16, generation_size: u16 },
    #[error("invalid generation size {0} (must be 1..=255)")]
    InvalidGenerationSize(u16),
    #[error("unknown control type {0:#04x}")]
    UnknownControlType(u8),
    #[error("unknown frame kind {0:#04x}")]
    UnknownFrameKind(u8),
}

// ── Coding ──────────────────────────────────────────────────────────

/// Encoder, decoder and configuration rejections.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodingError {
    #[error("empty packet")]
    EmptyPacket,
    #[error("generation {generation} is full ({size} packets)")]
    GenerationFull { generation: u32, size: u16 },
    #[error("sequence number {0} already buffered")]
    DuplicateSequence(u32),
    #[error("generation {generation} already decoded")]
    AlreadyDecoded { generation: u32 },
    #[error("packet for generation {got}, decoder is at {expected}")]
    GenerationMismatch { expected: u32, got: u32 },
    #[error("coded packet carries no coefficients")]
    EmptyCoefficients,
    #[error("no free matrix row in generation {generation}")]
    NoFreeRow { generation: u32 },
    #[error("matrix singular at column {column}")]
    SingularMatrix { column: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Arithmetic(#[from] GfError),
}
