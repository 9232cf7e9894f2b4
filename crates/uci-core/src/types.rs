//! Shared types and capacity constants for the UCI coding core.

/// Maximum UCI payload size `A` in bits (TS 38.212 §6.3.1.2.1).
pub const MAX_UCI_BITS: usize = 1706;

/// Maximum CRC length `L` attached to a polar segment.
pub const MAX_CRC_LEN: usize = 11;

/// Capacity of the polar intermediate scratch buffers.
pub const MAX_POLAR_N: usize = 2048;

/// Largest polar mother-code exponent used for UCI (`N <= 2^10`).
pub const POLAR_N_MAX_LOG: u32 = 10;

/// Logical values of the coded output stream shared with the modulator.
///
/// The numeric values are part of the ABI with the modulator and must not
/// change: the modulator maps `Repetition` to a copy of the previous bit and
/// `Placeholder` to a fixed `1` when building QAM symbols (TS 38.212
/// §5.3.3.1, the `x`/`y` bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum UciBit {
    /// Coded bit `0`.
    Bit0 = 0,
    /// Coded bit `1`.
    Bit1 = 1,
    /// Repetition of the previous coded bit.
    Repetition = 2,
    /// Placeholder bit, fixed by the modulator.
    Placeholder = 3,
}

impl From<UciBit> for u8 {
    fn from(bit: UciBit) -> u8 {
        bit as u8
    }
}

impl UciBit {
    /// Map a payload bit (0/1) to its coded representation.
    pub fn from_bit(bit: u8) -> Self {
        if bit == 0 {
            UciBit::Bit0
        } else {
            UciBit::Bit1
        }
    }
}
