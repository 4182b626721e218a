//! # Multi-Flow Decoder Table
//!
//! One [`Decoder`] per `(flow, generation)` so several flows, and several
//! in-flight generations per flow, can be decoded side by side. Each flow
//! keeps at most `max_generations` decoders; the oldest is evicted first and
//! packets for evicted generations are refused.

use bytes::Bytes;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::config::CodingConfig;
use crate::decoder::{Decoder, Reception};
use crate::error::CodingError;
use crate::wire::CodedPacket;

/// Caller-chosen flow identifier.
pub type FlowId = u32;

#[derive(Debug, Default)]
struct FlowSlots {
    /// Generations below this id were evicted.
    floor: u32,
    decoders: BTreeMap<u32, Decoder>,
}

/// Decoders keyed by `(flow, generation)`.
#[derive(Debug)]
pub struct FlowTable {
    config: CodingConfig,
    max_generations: usize,
    flows: HashMap<FlowId, FlowSlots>,
}

impl FlowTable {
    pub fn new(config: CodingConfig, max_generations: usize) -> Result<Self, CodingError> {
        config.validate()?;
        if max_generations == 0 {
            return Err(CodingError::InvalidConfig(
                "max_generations must be positive".into(),
            ));
        }
        Ok(FlowTable {
            config,
            max_generations,
            flows: HashMap::new(),
        })
    }

    /// Route a coded packet to its generation's decoder, creating it on
    /// first sight.
    pub fn process(&mut self, flow: FlowId, packet: &CodedPacket) -> Result<Reception, CodingError> {
        let generation = packet.generation_id();
        let slots = self.flows.entry(flow).or_default();
        if generation < slots.floor {
            return Err(CodingError::GenerationMismatch {
                expected: slots.floor,
                got: generation,
            });
        }

        if !slots.decoders.contains_key(&generation) {
            let decoder = Decoder::starting_at(self.config, generation)?;
            slots.decoders.insert(generation, decoder);
            enforce_limit(flow, slots, self.max_generations);
        }

        match slots.decoders.get_mut(&generation) {
            Some(decoder) => decoder.process_coded_packet(packet),
            // Only possible when the new generation was the oldest and got evicted.
            None => Err(CodingError::GenerationMismatch {
                expected: slots.floor,
                got: generation,
            }),
        }
    }

    /// Decoded packets of a generation, decoding on demand. `None` if the
    /// generation is not tracked.
    pub fn decoded(&mut self, flow: FlowId, generation: u32) -> Option<&[Bytes]> {
        self.flows
            .get_mut(&flow)?
            .decoders
            .get_mut(&generation)
            .map(|d| d.decoded_packets())
    }

    pub fn decoder(&self, flow: FlowId, generation: u32) -> Option<&Decoder> {
        self.flows.get(&flow)?.decoders.get(&generation)
    }

    /// Drop every generation of `flow` older than `generation`. Returns the
    /// number of decoders removed.
    pub fn evict_before(&mut self, flow: FlowId, generation: u32) -> usize {
        let Some(slots) = self.flows.get_mut(&flow) else {
            return 0;
        };
        let keep = slots.decoders.split_off(&generation);
        let removed = slots.decoders.len();
        slots.decoders = keep;
        slots.floor = slots.floor.max(generation);
        removed
    }

    /// Forget a flow entirely.
    pub fn remove_flow(&mut self, flow: FlowId) -> bool {
        self.flows.remove(&flow).is_some()
    }

    /// Number of tracked generations for `flow`.
    pub fn generation_count(&self, flow: FlowId) -> usize {
        self.flows.get(&flow).map_or(0, |s| s.decoders.len())
    }

    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }
}

fn enforce_limit(flow: FlowId, slots: &mut FlowSlots, max_generations: usize) {
    while slots.decoders.len() > max_generations {
        if let Some((oldest, _)) = slots.decoders.pop_first() {
            slots.floor = slots.floor.max(oldest.wrapping_add(1));
            debug!(flow, generation = oldest, "evicted generation");
        }
    }
}
