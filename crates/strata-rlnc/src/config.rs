//! # Coding Configuration
//!
//! Generation geometry shared by encoder and decoder, plus the
//! generation-level ACK/retransmit knobs used by the sessions. Loadable from
//! TOML; missing keys fall back to defaults.

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::CodingError;

/// Largest generation a coefficient vector can describe.
pub const MAX_GENERATION_SIZE: u16 = 255;

/// Generation geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodingConfig {
    /// Original packets per generation (1..=255).
    pub generation_size: u16,
    /// Payload bytes per packet, uniform across a generation.
    pub packet_size: usize,
}

impl Default for CodingConfig {
    fn default() -> Self {
        CodingConfig {
            generation_size: 8,
            packet_size: 1024,
        }
    }
}

impl CodingConfig {
    pub fn new(generation_size: u16, packet_size: usize) -> Result<Self, CodingError> {
        let cfg = CodingConfig {
            generation_size,
            packet_size,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), CodingError> {
        if self.generation_size == 0 || self.generation_size > MAX_GENERATION_SIZE {
            return Err(CodingError::InvalidConfig(format!(
                "generation_size {} outside 1..={}",
                self.generation_size, MAX_GENERATION_SIZE
            )));
        }
        if self.packet_size == 0 {
            return Err(CodingError::InvalidConfig(
                "packet_size must be positive".into(),
            ));
        }
        Ok(())
    }

    pub(crate) fn generation_len(&self) -> usize {
        self.generation_size as usize
    }
}

/// Sender/receiver session parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub coding: CodingConfig,
    /// Coded packets emitted beyond `generation_size` per generation.
    pub redundancy: usize,
    /// Time to wait for ACKNOWLEDGE before re-sending a generation.
    pub generation_timeout: Duration,
    /// Re-sends before a generation is abandoned.
    pub max_retransmissions: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            coding: CodingConfig::default(),
            redundancy: 2,
            generation_timeout: Duration::from_secs(2),
            max_retransmissions: 5,
        }
    }
}

// ─── TOML Input ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SessionConfigInput {
    pub generation_size: Option<u16>,
    pub packet_size: Option<usize>,
    pub redundancy: Option<usize>,
    pub generation_timeout_ms: Option<u64>,
    pub max_retransmissions: Option<u32>,
}

impl SessionConfigInput {
    pub fn resolve(self) -> Result<SessionConfig, CodingError> {
        let defaults = SessionConfig::default();
        let coding = CodingConfig::new(
            self.generation_size
                .unwrap_or(defaults.coding.generation_size),
            self.packet_size.unwrap_or(defaults.coding.packet_size),
        )?;
        Ok(SessionConfig {
            coding,
            redundancy: self.redundancy.unwrap_or(defaults.redundancy),
            generation_timeout: self
                .generation_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.generation_timeout),
            max_retransmissions: self
                .max_retransmissions
                .unwrap_or(defaults.max_retransmissions),
        })
    }
}

impl SessionConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, CodingError> {
        if input.trim().is_empty() {
            return Ok(SessionConfig::default());
        }
        let parsed: SessionConfigInput = toml::from_str(input)
            .map_err(|e| CodingError::InvalidConfig(format!("invalid config TOML: {}", e)))?;
        parsed.resolve()
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("parsing {}", path.display()))
    }
}
