//! UCI configuration and payload value types.
//!
//! Configuration structs are immutable inputs describing what the current
//! slot carries; the coder never mutates them and they may be shared freely
//! across threads.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::csi::{CsiReportConfig, CsiReportValue};
use crate::modulation::Modulation;

/// Number of OFDM symbols in an NR slot (normal cyclic prefix).
pub const NSYMB_PER_SLOT: usize = 14;

/// PUSCH-side parameters for UCI multiplexing (TS 38.212 §6.3.2.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PuschUciConfig {
    /// Modulation order of the PUSCH.
    pub modulation: Modulation,
    /// Number of transmission layers.
    pub nof_layers: u32,
    /// Target PUSCH code rate `R`.
    pub code_rate: f32,
    /// Scaling factor `alpha` limiting the UCI share of the resource.
    pub alpha: f32,
    /// Beta offset for HARQ-ACK.
    pub beta_harq_ack_offset: f32,
    /// Beta offset for CSI part 1.
    pub beta_csi1_offset: f32,
    /// UCI-eligible resource elements per OFDM symbol, `M_uci_sc(l)`.
    pub m_uci_sc: [u32; NSYMB_PER_SLOT],
    /// First OFDM symbol eligible for HARQ-ACK, `l0`.
    pub l0: usize,
    /// Sum of transport block segment sizes; 0 means CSI-only PUSCH.
    pub k_sum: u32,
    /// True when a CSI part 2 report is multiplexed on this PUSCH.
    pub csi_part2_present: bool,
}

impl Default for PuschUciConfig {
    fn default() -> Self {
        Self {
            modulation: Modulation::default(),
            nof_layers: 1,
            code_rate: 0.5,
            alpha: 1.0,
            beta_harq_ack_offset: 1.0,
            beta_csi1_offset: 1.0,
            m_uci_sc: [0; NSYMB_PER_SLOT],
            l0: 0,
            k_sum: 0,
            csi_part2_present: false,
        }
    }
}

/// PUCCH-side parameters consumed by the modulator downstream.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PucchUciConfig {
    /// RNTI scrambling identity.
    pub rnti: u16,
}

/// What the current slot carries: field widths and report descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UciConfig {
    /// Number of HARQ-ACK bits, `o_ack`.
    pub o_ack: usize,
    /// Number of scheduling-request bits, `o_sr`.
    pub o_sr: usize,
    /// CSI part 1 report descriptors.
    pub csi: Vec<CsiReportConfig>,
    /// PUSCH multiplexing parameters.
    pub pusch: PuschUciConfig,
    /// PUCCH parameters.
    pub pucch: PucchUciConfig,
}

/// PUCCH formats able to carry coded UCI (formats 0/1 carry none).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PucchFormat {
    Format2,
    Format3,
    Format4,
}

impl Default for PucchFormat {
    fn default() -> Self {
        PucchFormat::Format2
    }
}

/// PUCCH resource description, the subset relevant to rate matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PucchResource {
    /// PUCCH format of the resource.
    pub format: PucchFormat,
    /// Number of OFDM symbols.
    pub nof_symbols: u32,
    /// Number of physical resource blocks (formats 2 and 3).
    pub nof_prb: u32,
    /// OCC spreading length for format 4, 1 or 2.
    pub occ_length: u32,
    /// pi/2-BPSK instead of QPSK on formats 3 and 4.
    pub enable_pi_bpsk: bool,
}

impl Default for PucchResource {
    fn default() -> Self {
        Self {
            format: PucchFormat::default(),
            nof_symbols: 1,
            nof_prb: 1,
            occ_length: 1,
            enable_pi_bpsk: false,
        }
    }
}

/// UCI payload values for one slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UciValue {
    /// HARQ-ACK bits, one per element, values 0/1.
    pub ack: Vec<u8>,
    /// Scheduling request, `o_sr` bits wide.
    pub sr: u32,
    /// CSI part 1 report values.
    pub csi: Vec<CsiReportValue>,
    /// Decoder verdict. Written by the decode paths only.
    pub valid: bool,
}

/// Configuration and value pair, used for log-friendly summaries.
#[derive(Debug, Clone, Default)]
pub struct UciData {
    pub cfg: UciConfig,
    pub value: UciValue,
}

impl fmt::Display for UciData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rnti=0x{:x}", self.cfg.pucch.rnti)?;

        if self.cfg.o_ack > 0 {
            write!(f, ", ack=")?;
            for &bit in self.value.ack.iter().take(self.cfg.o_ack) {
                write!(f, "{}", bit & 1)?;
            }
        }

        for report in &self.value.csi {
            write!(f, ", {report}")?;
        }

        if self.cfg.o_sr > 0 {
            write!(f, ", sr={}", self.value.sr)?;
        }

        Ok(())
    }
}
