//! # RLNC Wire Format
//!
//! All multi-byte integers are big-endian.
//!
//! ## Coded Packet Header (8 + n bytes)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                      Generation ID (32)                        |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |      Generation Size (16)     |    Coefficient Count (16)      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  c[0] |  c[1] |  ...                                 | c[n-1]  |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! ## Control Header (7 + 4m bytes)
//!
//! ```text
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |   Type (8)    |              Generation ID (32) ...            |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  ... gen id   |           Count (16)          | Seq[0] (32) ...
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! ## Frames
//!
//! A [`Frame`] prefixes either shape with a one-byte kind so both can share
//! a datagram socket.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use tracing::warn;

use crate::config::MAX_GENERATION_SIZE;
use crate::error::WireError;

// ─── Constants ───────────────────────────────────────────────────────────────

/// Fixed part of the coded packet header: 4 + 2 + 2.
pub const CODED_HEADER_FIXED_LEN: usize = 8;

/// Fixed part of the control header: 1 + 4 + 2.
pub const CONTROL_HEADER_FIXED_LEN: usize = 7;

/// Most sequence numbers a control header can list.
pub const MAX_CONTROL_SEQUENCES: usize = u16::MAX as usize;

fn ensure(remaining: usize, needed: usize) -> Result<(), WireError> {
    if remaining < needed {
        return Err(WireError::Truncated { needed, remaining });
    }
    Ok(())
}

// ─── Coded Packet Header ────────────────────────────────────────────────────

/// Header carried by every coded packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedPacketHeader {
    pub generation_id: u32,
    pub generation_size: u16,
    /// Coefficients; padded with zeros to `generation_size` on encode.
    pub coefficients: Vec<u8>,
}

impl CodedPacketHeader {
    pub fn new(generation_id: u32, generation_size: u16, coefficients: Vec<u8>) -> Self {
        CodedPacketHeader {
            generation_id,
            generation_size,
            coefficients,
        }
    }

    /// Encode the header. Exactly `generation_size` coefficient bytes are
    /// written; extras are dropped, missing ones are zero.
    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u32(self.generation_id);
        buf.put_u16(self.generation_size);
        buf.put_u16(self.generation_size);
        let n = self.generation_size as usize;
        let have = self.coefficients.len().min(n);
        buf.put_slice(&self.coefficients[..have]);
        buf.put_bytes(0, n - have);
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        ensure(buf.remaining(), CODED_HEADER_FIXED_LEN)?;
        let generation_id = buf.get_u32();
        let generation_size = buf.get_u16();
        let count = buf.get_u16();

        if count != generation_size {
            return Err(WireError::CoefficientCountMismatch {
                count,
                generation_size,
            });
        }
        if generation_size == 0 || generation_size > MAX_GENERATION_SIZE {
            return Err(WireError::InvalidGenerationSize(generation_size));
        }

        let n = generation_size as usize;
        ensure(buf.remaining(), n)?;
        let mut coefficients = vec![0u8; n];
        buf.copy_to_slice(&mut coefficients);

        Ok(CodedPacketHeader {
            generation_id,
            generation_size,
            coefficients,
        })
    }

    /// Total encoded size of this header.
    pub fn encoded_len(&self) -> usize {
        CODED_HEADER_FIXED_LEN + self.generation_size as usize
    }
}

impl fmt::Display for CodedPacketHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "generation {} size {} coefficients {:?}",
            self.generation_id, self.generation_size, self.coefficients
        )
    }
}

// ─── Coded Packet ───────────────────────────────────────────────────────────

/// One linear combination of a generation's packets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodedPacket {
    pub header: CodedPacketHeader,
    /// `Σ coefficients[i] · original[i]` over GF(256).
    pub payload: Bytes,
}

impl CodedPacket {
    pub fn generation_id(&self) -> u32 {
        self.header.generation_id
    }

    pub fn generation_size(&self) -> u16 {
        self.header.generation_size
    }

    pub fn coefficients(&self) -> &[u8] {
        &self.header.coefficients
    }

    /// True when the coefficient vector has exactly one nonzero entry equal
    /// to 1, i.e. the payload is an original packet.
    pub fn is_uncoded(&self) -> bool {
        let mut ones = 0;
        for &c in &self.header.coefficients {
            match c {
                0 => {}
                1 => ones += 1,
                _ => return false,
            }
        }
        ones == 1
    }

    /// Header followed by the payload.
    pub fn encode(&self, buf: &mut impl BufMut) {
        self.header.encode(buf);
        buf.put_slice(&self.payload);
    }

    /// Parse a header and take every remaining byte as the payload.
    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        let header = CodedPacketHeader::decode(buf)?;
        let payload = buf.copy_to_bytes(buf.remaining());
        Ok(CodedPacket { header, payload })
    }

    pub fn encoded_len(&self) -> usize {
        self.header.encoded_len() + self.payload.len()
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

// ─── Control Header ─────────────────────────────────────────────────────────

/// Control message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlType {
    /// Receiver asks for identity-coded copies of the listed packets.
    RequestUncoded = 1,
    /// Receiver decoded the generation.
    Acknowledge = 2,
    /// Receiver stored a packet that raised its rank.
    InnovativeAck = 3,
    /// Per-hop acknowledgment from a relay.
    HopAck = 4,
}

impl ControlType {
    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            1 => Some(ControlType::RequestUncoded),
            2 => Some(ControlType::Acknowledge),
            3 => Some(ControlType::InnovativeAck),
            4 => Some(ControlType::HopAck),
            _ => None,
        }
    }
}

impl fmt::Display for ControlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ControlType::RequestUncoded => "REQUEST_UNCODED",
            ControlType::Acknowledge => "ACKNOWLEDGE",
            ControlType::InnovativeAck => "INNOVATIVE_ACK",
            ControlType::HopAck => "HOP_ACK",
        };
        f.write_str(name)
    }
}

/// Acknowledgment / retransmission-request message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlHeader {
    pub control_type: ControlType,
    pub generation_id: u32,
    pub sequence_numbers: Vec<u32>,
}

impl ControlHeader {
    pub fn new(control_type: ControlType, generation_id: u32) -> Self {
        ControlHeader {
            control_type,
            generation_id,
            sequence_numbers: Vec::new(),
        }
    }

    pub fn with_sequences(mut self, seqs: impl IntoIterator<Item = u32>) -> Self {
        self.sequence_numbers.extend(seqs);
        self
    }

    /// Encode the header. Lists longer than [`MAX_CONTROL_SEQUENCES`] are
    /// truncated.
    pub fn encode(&self, buf: &mut impl BufMut) {
        let count = self.sequence_numbers.len().min(MAX_CONTROL_SEQUENCES);
        if count < self.sequence_numbers.len() {
            warn!(
                listed = self.sequence_numbers.len(),
                "control header sequence list truncated"
            );
        }
        buf.put_u8(self.control_type as u8);
        buf.put_u32(self.generation_id);
        buf.put_u16(count as u16);
        for &seq in &self.sequence_numbers[..count] {
            buf.put_u32(seq);
        }
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        ensure(buf.remaining(), CONTROL_HEADER_FIXED_LEN)?;
        let raw_type = buf.get_u8();
        let control_type =
            ControlType::from_byte(raw_type).ok_or(WireError::UnknownControlType(raw_type))?;
        let generation_id = buf.get_u32();
        let count = buf.get_u16() as usize;

        ensure(buf.remaining(), count * 4)?;
        let sequence_numbers = (0..count).map(|_| buf.get_u32()).collect();

        Ok(ControlHeader {
            control_type,
            generation_id,
            sequence_numbers,
        })
    }

    pub fn encoded_len(&self) -> usize {
        CONTROL_HEADER_FIXED_LEN + 4 * self.sequence_numbers.len().min(MAX_CONTROL_SEQUENCES)
    }
}

impl fmt::Display for ControlHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} generation {} sequences {:?}",
            self.control_type, self.generation_id, self.sequence_numbers
        )
    }
}

// ─── Frames ─────────────────────────────────────────────────────────────────

/// Leading byte of a [`Frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameKind {
    Coded = 0,
    Control = 1,
}

/// Either message shape, as exchanged between sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Coded(CodedPacket),
    Control(ControlHeader),
}

impl Frame {
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Coded(_) => FrameKind::Coded,
            Frame::Control(_) => FrameKind::Control,
        }
    }

    pub fn encode(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.kind() as u8);
        match self {
            Frame::Coded(p) => p.encode(buf),
            Frame::Control(c) => c.encode(buf),
        }
    }

    pub fn decode(buf: &mut impl Buf) -> Result<Self, WireError> {
        ensure(buf.remaining(), 1)?;
        match buf.get_u8() {
            0 => Ok(Frame::Coded(CodedPacket::decode(buf)?)),
            1 => Ok(Frame::Control(ControlHeader::decode(buf)?)),
            other => Err(WireError::UnknownFrameKind(other)),
        }
    }

    pub fn encoded_len(&self) -> usize {
        1 + match self {
            Frame::Coded(p) => p.encoded_len(),
            Frame::Control(c) => c.encoded_len(),
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}
