//! Small-block UCI coding: 1-bit repetition, 2-bit simplex and the
//! 3..=11-bit Reed-Muller path (TS 38.212 §5.3.3.1 to §5.3.3.3).
//!
//! The 1- and 2-bit encoders emit the 4-value coded alphabet directly: the
//! payload bits land on the first positions of each modulation symbol and
//! the rest of the symbol is filled with repetition and placeholder markers
//! for the modulator. Decoders read back only the payload positions.

use tracing::trace;

use crate::error::{UciError, UciResult};
use crate::fec::block;
use crate::modulation::Modulation;
use crate::types::UciBit;

/// Encode a single HARQ-ACK bit across `out.len()` coded positions.
pub fn encode_1bit(bit: u8, modulation: Modulation, out: &mut [u8]) {
    let c0 = UciBit::from_bit(bit) as u8;
    let rep = UciBit::Repetition as u8;
    let ph = UciBit::Placeholder as u8;
    let qm = modulation.bits_per_symbol();

    for (i, o) in out.iter_mut().enumerate() {
        *o = match i % qm {
            0 => c0,
            1 => rep,
            _ => ph,
        };
    }
}

/// Decode a single repeated bit from `llr`. Negative LLR favors bit 1.
///
/// Returns the bit and the detection verdict: the correlation across the
/// repeated positions, normalized so a clean channel scores 1.0, must
/// exceed `threshold`. All-zero input produces a non-normal metric and is
/// never valid.
pub fn decode_1bit(llr: &[i8], modulation: Modulation, threshold: f32) -> (u8, bool) {
    let qm = modulation.bits_per_symbol();
    let e = llr.len();

    let mut corr = 0.0f32;
    let mut pwr = 0.0f32;
    let mut nof_samples = 0usize;
    for i in (0..e).step_by(qm) {
        let t = f32::from(llr[i]);
        corr += t;
        pwr += t * t;
        nof_samples += 1;
    }

    let norm = corr.abs() / (pwr.sqrt() * (nof_samples as f32).sqrt());
    let valid = norm > threshold;
    let bit = u8::from(corr < 0.0);

    trace!(e, corr, pwr, norm, threshold, valid, "one-bit UCI decode");
    (bit, valid)
}

/// Encode two bits as the simplex codeword `[c0, c1, c0 ^ c1]` spread over
/// the modulation symbol positions.
pub fn encode_2bit(b: [u8; 2], modulation: Modulation, out: &mut [u8]) {
    let c = [
        UciBit::from_bit(b[0]) as u8,
        UciBit::from_bit(b[1]) as u8,
        UciBit::from_bit(b[0] ^ b[1]) as u8,
    ];
    let ph = UciBit::Placeholder as u8;
    let qm = modulation.bits_per_symbol();

    match qm {
        1 | 2 => {
            for (i, o) in out.iter_mut().enumerate() {
                *o = c[i % 3];
            }
        }
        _ => {
            // Two coded bits per symbol, cycling through the codeword.
            let mut j = 0usize;
            for (i, o) in out.iter_mut().enumerate() {
                if i % qm < 2 {
                    *o = c[j % 3];
                    j += 1;
                } else {
                    *o = ph;
                }
            }
        }
    }
}

/// Decode two bits from `llr`. Negative LLR favors bit 1.
///
/// Validity is the simplex parity check `c2 == c0 ^ c1`, rejected outright
/// when no accumulator saw any energy.
pub fn decode_2bit(llr: &[i8], modulation: Modulation) -> ([u8; 2], bool) {
    let qm = modulation.bits_per_symbol();
    let e = llr.len();

    // TODO: accumulate instead of overwrite, once interop against the
    // last-triple-only behavior of deployed decoders has been checked. As
    // written, the decision rests on the final wrapped triple of LLRs.
    let mut corr = [0.0f32; 3];
    if qm == 1 {
        for (i, &l) in llr.iter().enumerate() {
            corr[i % 3] = f32::from(l);
        }
    } else {
        let mut j = 0usize;
        let mut i = 0usize;
        while i + 1 < e {
            corr[j % 3] = f32::from(llr[i]);
            j += 1;
            corr[j % 3] = f32::from(llr[i + 1]);
            j += 1;
            i += qm;
        }
    }

    let c0 = corr[0] < 0.0;
    let c1 = corr[1] < 0.0;
    let c2 = corr[2] < 0.0;

    let has_energy = corr.iter().any(|&v| v != 0.0);
    let valid = has_energy && c2 == (c0 ^ c1);
    let bits = [u8::from(c0), u8::from(c1)];

    trace!(e, ?corr, valid, "two-bit UCI decode");
    (bits, valid)
}

/// Decode the 3..=11-bit Reed-Muller path with its guard conditions.
pub fn decode_block(llr: &[i8], payload: &mut [u8], threshold: f32) -> UciResult<bool> {
    let a = payload.len();
    let e = llr.len();
    if e < 1 {
        return Err(UciError::InvalidInput("empty LLR buffer"));
    }
    if a == 11 && e <= 16 {
        return Err(UciError::UnderRateMatched { a, e });
    }

    let pwr = llr.iter().map(|&l| f32::from(l) * f32::from(l)).sum::<f32>() / e as f32;
    if !pwr.is_normal() {
        return Err(UciError::AllZeros);
    }

    let corr = block::decode(llr, payload);
    let valid = corr > threshold;

    trace!(a, e, pwr, corr, threshold, valid, "block UCI decode");
    Ok(valid)
}
