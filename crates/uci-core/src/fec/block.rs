//! Reed-Muller block code for 3..=11-bit UCI payloads (TS 38.212 §5.3.3.3).
//!
//! The code is linear over GF(2): coded bit `i` is the inner product of the
//! payload with row `i mod 32` of the basis-sequence table, so any output
//! length `E` is reached by cyclic repetition of the 32-bit mother codeword.
//! Decoding is maximum-likelihood: fold the `E` LLRs back into the 32 native
//! positions and correlate against every candidate payload.

/// Maximum payload size the block code accepts.
pub const BLOCK_MAX_K: usize = 11;

/// Native codeword length before rate matching.
pub const BLOCK_N: usize = 32;

/// Basis sequences `M_{i,0..10}` (TS 38.212 Table 5.3.3.3-1).
const BASIS: [[u8; BLOCK_MAX_K]; BLOCK_N] = [
    [1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 1],
    [1, 1, 1, 0, 0, 0, 0, 0, 0, 1, 1],
    [1, 0, 0, 1, 0, 0, 1, 0, 1, 1, 1],
    [1, 0, 1, 1, 0, 0, 0, 0, 1, 0, 1],
    [1, 1, 1, 1, 0, 0, 0, 1, 0, 0, 1],
    [1, 1, 0, 0, 1, 0, 1, 1, 1, 0, 1],
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 1, 1],
    [1, 0, 0, 1, 1, 0, 0, 1, 1, 0, 1],
    [1, 1, 0, 1, 1, 0, 0, 1, 0, 1, 1],
    [1, 0, 1, 1, 1, 0, 1, 0, 0, 1, 1],
    [1, 0, 1, 0, 0, 1, 1, 1, 0, 1, 1],
    [1, 1, 1, 0, 0, 1, 1, 0, 1, 0, 1],
    [1, 0, 0, 1, 0, 1, 0, 1, 1, 1, 1],
    [1, 1, 0, 1, 0, 1, 0, 1, 0, 1, 1],
    [1, 0, 0, 0, 1, 1, 0, 1, 0, 0, 1],
    [1, 1, 0, 0, 1, 1, 1, 1, 0, 1, 1],
    [1, 1, 1, 0, 1, 1, 1, 0, 0, 1, 0],
    [1, 0, 0, 1, 1, 1, 0, 0, 1, 0, 0],
    [1, 1, 0, 1, 1, 1, 1, 1, 0, 0, 0],
    [1, 0, 0, 0, 0, 1, 1, 0, 0, 0, 0],
    [1, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1],
    [1, 1, 0, 1, 0, 0, 0, 0, 0, 1, 1],
    [1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 1],
    [1, 1, 1, 0, 1, 0, 0, 0, 1, 1, 1],
    [1, 1, 1, 1, 1, 0, 1, 1, 1, 1, 0],
    [1, 1, 0, 0, 0, 1, 1, 1, 0, 0, 1],
    [1, 0, 1, 1, 0, 1, 0, 0, 1, 1, 0],
    [1, 1, 1, 1, 0, 1, 0, 1, 1, 1, 0],
    [1, 0, 1, 0, 1, 1, 1, 0, 1, 0, 0],
    [1, 0, 1, 1, 1, 1, 1, 1, 1, 0, 0],
    [1, 1, 1, 1, 1, 1, 1, 1, 1, 1, 1],
    [1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
];

/// Mother codeword bit `i` for the candidate payload `word` of `a` bits.
fn codeword_bit(word: usize, a: usize, i: usize) -> u8 {
    let mut bit = 0u8;
    for (j, &m) in BASIS[i].iter().take(a).enumerate() {
        bit ^= ((word >> j) as u8 & 1) & m;
    }
    bit
}

/// Encode `payload` (one bit per byte, `payload.len() <= 11`) into `out`,
/// repeating the 32-bit mother codeword cyclically to fill `out.len()` bits.
pub fn encode(payload: &[u8], out: &mut [u8]) {
    debug_assert!(payload.len() <= BLOCK_MAX_K);

    for (i, o) in out.iter_mut().enumerate() {
        let row = &BASIS[i % BLOCK_N];
        let mut bit = 0u8;
        for (j, &p) in payload.iter().enumerate() {
            bit ^= (p & 1) & row[j];
        }
        *o = bit;
    }
}

/// Maximum-likelihood decode of `llr` into `payload` (`payload.len()` = A).
///
/// Negative LLR favors bit 1. Returns the correlation of the winning
/// codeword normalized to [-1, 1]; a clean channel scores 1.0 and pure noise
/// stays near zero.
pub fn decode(llr: &[i8], payload: &mut [u8]) -> f32 {
    let a = payload.len();
    debug_assert!(a >= 1 && a <= BLOCK_MAX_K);

    // Fold repeated transmissions back onto the native codeword positions.
    let mut bins = [0.0f32; BLOCK_N];
    for (i, &l) in llr.iter().enumerate() {
        bins[i % BLOCK_N] += f32::from(l);
    }
    let denom: f32 = bins.iter().map(|b| b.abs()).sum();

    let mut best_word = 0usize;
    let mut best_corr = f32::NEG_INFINITY;
    for word in 0..(1usize << a) {
        let mut corr = 0.0f32;
        for (i, &bin) in bins.iter().enumerate() {
            if codeword_bit(word, a, i) == 0 {
                corr += bin;
            } else {
                corr -= bin;
            }
        }
        if corr > best_corr {
            best_corr = corr;
            best_word = word;
        }
    }

    for (j, p) in payload.iter_mut().enumerate() {
        *p = ((best_word >> j) & 1) as u8;
    }

    if denom > 0.0 {
        best_corr / denom
    } else {
        0.0
    }
}
