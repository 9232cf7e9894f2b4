//! Polar rate matching (TS 38.212 §5.4.1): sub-block interleaving, bit
//! selection and the triangular channel interleaver (`IBIL = 1`).

use crate::fec::polar::{PolarCode, RateMatchMode};

/// Sub-block interleaver pattern P (TS 38.212 Table 5.4.1.1-1).
const SUBBLOCK_PATTERN: [usize; 32] = [
    0, 1, 2, 4, 3, 5, 6, 7, 8, 16, 9, 17, 10, 18, 11, 19, 12, 20, 13, 21, 14, 22, 15, 23, 24, 25,
    26, 28, 27, 29, 30, 31,
];

/// Mother-codeword index feeding interleaved position `k` (requires N >= 32).
pub fn subblock_index(k: usize, n: usize) -> usize {
    let stride = n / 32;
    SUBBLOCK_PATTERN[k / stride] * stride + (k % stride)
}

/// LLR injected for shortened positions: never transmitted and known to
/// carry bit 0, which is negative in the positive-means-one convention.
const SHORTENED_LLR: f32 = -1024.0;

/// Rate-match the mother codeword `d` (N bits) into `out` (E bits).
pub fn rate_match_tx(d: &[u8], out: &mut [u8], code: &PolarCode) {
    let n = code.block_len;
    let e = out.len();
    debug_assert_eq!(e, code.e);

    let mut y = vec![0u8; n];
    for (k, bit) in y.iter_mut().enumerate() {
        *bit = d[subblock_index(k, n)];
    }

    let perm = triangle_perm(e);
    match code.rm_mode {
        RateMatchMode::Repetition => {
            for (o, &src) in out.iter_mut().zip(perm.iter()) {
                *o = y[src % n];
            }
        }
        RateMatchMode::Puncturing => {
            for (o, &src) in out.iter_mut().zip(perm.iter()) {
                *o = y[src + (n - e)];
            }
        }
        RateMatchMode::Shortening => {
            for (o, &src) in out.iter_mut().zip(perm.iter()) {
                *o = y[src];
            }
        }
    }
}

/// Invert rate matching: fold `llr` (E soft bits) back to mother-code
/// length. Repeated positions accumulate, punctured positions erase to zero
/// and shortened positions saturate toward bit 0.
pub fn rate_match_rx(llr: &[i8], code: &PolarCode) -> Vec<f32> {
    let n = code.block_len;
    let e = llr.len();
    debug_assert_eq!(e, code.e);

    let perm = triangle_perm(e);
    let mut y = match code.rm_mode {
        RateMatchMode::Repetition => {
            let mut y = vec![0.0f32; n];
            for (&l, &src) in llr.iter().zip(perm.iter()) {
                y[src % n] += f32::from(l);
            }
            y
        }
        RateMatchMode::Puncturing => {
            let mut y = vec![0.0f32; n];
            for (&l, &src) in llr.iter().zip(perm.iter()) {
                y[src + (n - e)] = f32::from(l);
            }
            y
        }
        RateMatchMode::Shortening => {
            let mut y = vec![SHORTENED_LLR; n];
            for (&l, &src) in llr.iter().zip(perm.iter()) {
                y[src] = f32::from(l);
            }
            y
        }
    };

    // Undo the sub-block interleaving.
    let mut out = vec![0.0f32; n];
    for (k, v) in y.drain(..).enumerate() {
        out[subblock_index(k, n)] = v;
    }
    out
}

/// Channel interleaver permutation: writing E bits row-wise into an
/// isosceles triangle and reading column-wise gives `out[m] = in[perm[m]]`.
fn triangle_perm(e: usize) -> Vec<usize> {
    let mut t = 0usize;
    while t * (t + 1) / 2 < e {
        t += 1;
    }

    let mut rows: Vec<Vec<usize>> = Vec::with_capacity(t);
    let mut k = 0usize;
    for i in 0..t {
        let width = t - i;
        let mut row = Vec::with_capacity(width);
        for _ in 0..width {
            if k < e {
                row.push(k);
                k += 1;
            }
        }
        rows.push(row);
    }

    let mut perm = Vec::with_capacity(e);
    for j in 0..t {
        for row in &rows {
            if j < row.len() {
                perm.push(row[j]);
            }
        }
    }
    perm
}
