//! Modulation orders carrying the coded UCI bits.

use serde::{Deserialize, Serialize};

/// Modulation scheme of the transport carrying the coded bits.
///
/// The small-block encoders spread their output across QAM symbol positions,
/// so the modulation order changes the coded-bit layout (TS 38.212 §5.3.3.1
/// and §5.3.3.2), not just the downstream mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modulation {
    /// BPSK or pi/2-BPSK, 1 bit per symbol.
    Bpsk,
    /// QPSK, 2 bits per symbol.
    Qpsk,
    /// 16-QAM, 4 bits per symbol.
    Qam16,
    /// 64-QAM, 6 bits per symbol.
    Qam64,
    /// 256-QAM, 8 bits per symbol.
    Qam256,
}

impl Modulation {
    /// Modulation order Qm in bits per symbol.
    pub fn bits_per_symbol(self) -> usize {
        match self {
            Modulation::Bpsk => 1,
            Modulation::Qpsk => 2,
            Modulation::Qam16 => 4,
            Modulation::Qam64 => 6,
            Modulation::Qam256 => 8,
        }
    }
}

impl Default for Modulation {
    fn default() -> Self {
        Modulation::Qpsk
    }
}
