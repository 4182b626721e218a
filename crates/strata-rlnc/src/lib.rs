//! # strata-rlnc
//!
//! Random linear network coding over GF(2^8) for lossy multi-hop links.
//!
//! Original packets are grouped into fixed-size generations. The encoder
//! emits random linear combinations of a generation; any `generation_size`
//! linearly independent combinations let the decoder recover every original
//! packet by Gaussian elimination.
//!
//! ## Crate structure
//!
//! - [`gf256`]: Field arithmetic and slice kernels (polynomial 0x11D)
//! - [`wire`]: Coded packet and control headers, framing
//! - [`encoder`]: Generation buffer and coded packet generation
//! - [`decoder`]: Coefficient matrix, rank, Gauss-Jordan decode
//! - [`flow`]: Decoders keyed by flow and generation
//! - [`session`]: Sender/receiver generation protocol (ACK, retransmit)
//! - [`config`]: Coding and session parameters, TOML loading
//! - [`stats`]: Counters for encoder, decoder and sessions
//! - [`error`]: Error types

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod flow;
pub mod gf256;
pub mod session;
pub mod stats;
pub mod wire;

pub use config::{CodingConfig, SessionConfig};
pub use decoder::{Decoder, DecoderState, Reception};
pub use encoder::Encoder;
pub use error::{CodingError, GfError, WireError};
pub use flow::{FlowId, FlowTable};
pub use session::{DeliveredPacket, ReceiverSession, SenderSession};
pub use wire::{CodedPacket, CodedPacketHeader, ControlHeader, ControlType, Frame, FrameKind};
