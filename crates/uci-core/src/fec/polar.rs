//! Polar code construction, channel allocation, encoding and SC decoding.
//!
//! Construction follows TS 38.212 §5.3.1: mother-code sizing with the 9/8
//! relaxation, rate-matching-aware pre-frozen sets and a polarization-weight
//! (beta-expansion) reliability order. The generator is the plain Kronecker
//! power of the Arikan kernel without bit reversal, so the sub-block
//! interleaver's shortening pattern is superset-closed and shortened coded
//! bits are guaranteed zero.

use crate::error::{UciError, UciResult};
use crate::fec::polar_rm;

/// Smallest supported mother-code exponent.
const N_MIN_LOG: u32 = 5;

/// Bit selection strategy implied by (K, E, N) (TS 38.212 §5.4.1.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateMatchMode {
    /// `E >= N`: transmit the mother codeword cyclically.
    Repetition,
    /// `E < N` at low rate: drop the first `N - E` interleaved bits.
    Puncturing,
    /// `E < N` at high rate: drop the last `N - E` interleaved bits.
    Shortening,
}

/// Rate-matched polar code parameters for one (K, E) operating point.
#[derive(Debug, Clone)]
pub struct PolarCode {
    /// Mother code length `N = 2^n`.
    pub block_len: usize,
    /// Mother code exponent `n`.
    pub log_len: u32,
    /// Number of allocated bits (information plus parity-check).
    pub k: usize,
    /// Information-bit positions, ascending.
    pub k_set: Vec<usize>,
    /// Parity-check bit positions. Always empty with this construction;
    /// kept so the allocation contract matches list decoders that use them.
    pub pc_set: Vec<usize>,
    /// Frozen positions, ascending.
    pub f_set: Vec<usize>,
    /// Frozen mask indexed by u-domain position.
    pub frozen_mask: Vec<bool>,
    /// Bit selection mode of the rate matcher.
    pub rm_mode: RateMatchMode,
    /// Rate-matched output length `E`.
    pub e: usize,
}

fn ceil_log2(x: usize) -> u32 {
    debug_assert!(x > 0);
    usize::BITS - (x - 1).leading_zeros()
}

/// Polarization weight of u-domain index `i` (beta-expansion with
/// beta = 2^(1/4)). Higher weight means a more reliable bit channel.
fn polarization_weight(i: usize) -> f64 {
    let mut weight = 0.0;
    let mut v = i;
    let mut j = 0u32;
    while v != 0 {
        if v & 1 == 1 {
            weight += 2f64.powf(0.25 * f64::from(j));
        }
        v >>= 1;
        j += 1;
    }
    weight
}

impl PolarCode {
    /// Select the polar code carrying `k` allocated bits rate-matched to `e`
    /// coded bits, with the mother code capped at `2^n_max_log`.
    pub fn select(k: usize, e: usize, n_max_log: u32) -> UciResult<Self> {
        if k == 0 || e == 0 || k > e {
            return Err(UciError::PolarCodeSelectFailed { k, e });
        }

        // Mother code sizing (§5.3.1).
        let e_log = ceil_log2(e).max(1);
        let n1 = if (e as f64) <= 9.0 / 8.0 * f64::from(1u32 << (e_log - 1))
            && (k as f64) / (e as f64) < 9.0 / 16.0
        {
            e_log - 1
        } else {
            e_log
        };
        let n2 = ceil_log2(8 * k); // R_min = 1/8
        let log_len = n1.min(n2).min(n_max_log).max(N_MIN_LOG);
        if log_len > n_max_log {
            return Err(UciError::PolarCodeSelectFailed { k, e });
        }
        let n = 1usize << log_len;

        let rm_mode = if e >= n {
            RateMatchMode::Repetition
        } else if (k as f64) / (e as f64) <= 7.0 / 16.0 {
            RateMatchMode::Puncturing
        } else {
            RateMatchMode::Shortening
        };

        // Positions that the rate matcher never transmits are pre-frozen.
        let mut prefrozen = vec![false; n];
        match rm_mode {
            RateMatchMode::Repetition => {}
            RateMatchMode::Puncturing => {
                for t in 0..(n - e) {
                    prefrozen[polar_rm::subblock_index(t, n)] = true;
                }
                // Incapable low-index block (§5.4.1.1).
                let incapable = if 4 * e >= 3 * n {
                    (3 * n).saturating_sub(2 * e).div_ceil(4)
                } else {
                    (9 * n).saturating_sub(4 * e).div_ceil(16)
                };
                for p in prefrozen.iter_mut().take(incapable.min(n)) {
                    *p = true;
                }
            }
            RateMatchMode::Shortening => {
                for t in e..n {
                    prefrozen[polar_rm::subblock_index(t, n)] = true;
                }
            }
        }

        // Rank the remaining bit channels by polarization weight.
        let weights: Vec<f64> = (0..n).map(polarization_weight).collect();
        let mut candidates: Vec<usize> = (0..n).filter(|&i| !prefrozen[i]).collect();
        if candidates.len() < k {
            return Err(UciError::PolarCodeSelectFailed { k, e });
        }
        candidates.sort_by(|&a, &b| {
            weights[b]
                .partial_cmp(&weights[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.cmp(&b))
        });

        let mut k_set: Vec<usize> = candidates[..k].to_vec();
        k_set.sort_unstable();

        let mut frozen_mask = vec![true; n];
        for &pos in &k_set {
            frozen_mask[pos] = false;
        }
        let f_set: Vec<usize> = (0..n).filter(|&i| frozen_mask[i]).collect();

        Ok(Self {
            block_len: n,
            log_len,
            k,
            k_set,
            pc_set: Vec::new(),
            f_set,
            frozen_mask,
            rm_mode,
            e,
        })
    }
}

/// Scatter the K codeword bits into the N-element u-domain container.
/// Frozen positions carry zero.
pub fn chanalloc_tx(c: &[u8], allocated: &mut [u8], code: &PolarCode) {
    debug_assert_eq!(allocated.len(), code.block_len);
    allocated.fill(0);
    for (bit, &pos) in c.iter().zip(code.k_set.iter()) {
        allocated[pos] = *bit;
    }
}

/// Gather the K codeword bits back out of the decoded u-domain container.
pub fn chanalloc_rx(allocated: &[u8], c: &mut [u8], code: &PolarCode) {
    for (bit, &pos) in c.iter_mut().zip(code.k_set.iter()) {
        *bit = allocated[pos];
    }
}

/// Encode the allocated u-domain bits: `d = u * F^(kron n)`.
pub fn encode(allocated: &[u8], d: &mut [u8]) {
    d.copy_from_slice(allocated);
    polar_transform(d);
}

/// Apply the polar transform in place (Arikan butterfly).
pub(crate) fn polar_transform(bits: &mut [u8]) {
    let n = bits.len();
    let mut step = 1;
    while step < n {
        for i in (0..n).step_by(2 * step) {
            for j in 0..step {
                bits[i + j] ^= bits[i + j + step];
            }
        }
        step *= 2;
    }
}

/// Successive-cancellation decode.
///
/// `llr` follows the positive-means-one convention: the UCI pipeline negates
/// its receive LLRs once before entering the polar path. Returns the full
/// u-domain bit vector; information bits sit at the `k_set` positions.
pub fn decode_sc(llr: &[f32], frozen_mask: &[bool]) -> UciResult<Vec<u8>> {
    if llr.is_empty() || !llr.len().is_power_of_two() || llr.len() != frozen_mask.len() {
        return Err(UciError::PolarDecodeFailed);
    }
    Ok(sc_recurse(llr, frozen_mask))
}

/// Min-sum f function: LLR of the XOR of two bits.
fn f_func(a: f32, b: f32) -> f32 {
    let sign = if (a < 0.0) != (b < 0.0) { 1.0 } else { -1.0 };
    sign * a.abs().min(b.abs())
}

/// g function with known left bit: `g(a, b, u) = b + (1 - 2u) * a`.
fn g_func(a: f32, b: f32, u: u8) -> f32 {
    if u == 1 {
        b - a
    } else {
        b + a
    }
}

fn sc_recurse(llr: &[f32], frozen: &[bool]) -> Vec<u8> {
    let n = llr.len();
    if n == 1 {
        return if frozen[0] {
            vec![0]
        } else {
            vec![u8::from(llr[0] > 0.0)]
        };
    }

    let half = n / 2;
    let f_llrs: Vec<f32> = (0..half)
        .map(|i| f_func(llr[i], llr[i + half]))
        .collect();
    let mut u_left = sc_recurse(&f_llrs, &frozen[..half]);

    // Partial sums of the left half feed the g function.
    let mut v_left = u_left.clone();
    polar_transform(&mut v_left);

    let g_llrs: Vec<f32> = (0..half)
        .map(|i| g_func(llr[i], llr[i + half], v_left[i]))
        .collect();
    let u_right = sc_recurse(&g_llrs, &frozen[half..]);

    u_left.extend_from_slice(&u_right);
    u_left
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fec::polar_rm::{rate_match_rx, rate_match_tx};

    fn roundtrip(k: usize, e: usize) {
        let code = PolarCode::select(k, e, 10).unwrap();
        let payload: Vec<u8> = (0..k).map(|i| ((i ^ (i >> 2)) & 1) as u8).collect();

        let mut allocated = vec![0u8; code.block_len];
        chanalloc_tx(&payload, &mut allocated, &code);
        let mut d = vec![0u8; code.block_len];
        encode(&allocated, &mut d);
        let mut coded = vec![0u8; e];
        rate_match_tx(&d, &mut coded, &code);

        // Clean channel in the decoder's positive-means-one convention.
        let llr: Vec<i8> = coded.iter().map(|&b| if b == 1 { 64 } else { -64 }).collect();
        let soft = rate_match_rx(&llr, &code);
        let u = decode_sc(&soft, &code.frozen_mask).unwrap();
        let mut back = vec![0u8; k];
        chanalloc_rx(&u, &mut back, &code);
        assert_eq!(back, payload, "K={k} E={e}");
    }

    #[test]
    fn test_select_mother_code_sizing() {
        let code = PolarCode::select(18, 64, 10).unwrap();
        assert_eq!(code.block_len, 64);
        assert_eq!(code.rm_mode, RateMatchMode::Repetition);

        // The 9/8 relaxation steps down one exponent.
        let code = PolarCode::select(12, 36, 10).unwrap();
        assert_eq!(code.block_len, 32);

        let code = PolarCode::select(518, 1024, 10).unwrap();
        assert_eq!(code.block_len, 1024);
        assert_eq!(code.k_set.len(), 518);
    }

    #[test]
    fn test_select_modes() {
        assert_eq!(
            PolarCode::select(12, 48, 10).unwrap().rm_mode,
            RateMatchMode::Puncturing
        );
        assert_eq!(
            PolarCode::select(30, 40, 10).unwrap().rm_mode,
            RateMatchMode::Shortening
        );
        assert_eq!(
            PolarCode::select(18, 128, 10).unwrap().rm_mode,
            RateMatchMode::Repetition
        );
    }

    #[test]
    fn test_select_rejects_degenerate_points() {
        assert!(PolarCode::select(0, 64, 10).is_err());
        assert!(PolarCode::select(18, 0, 10).is_err());
        assert!(PolarCode::select(65, 64, 10).is_err());
    }

    #[test]
    fn test_info_and_frozen_partition() {
        let code = PolarCode::select(18, 64, 10).unwrap();
        assert_eq!(code.k_set.len() + code.f_set.len(), code.block_len);
        for &pos in &code.k_set {
            assert!(!code.frozen_mask[pos]);
        }
        for &pos in &code.f_set {
            assert!(code.frozen_mask[pos]);
        }
    }

    #[test]
    fn test_polar_transform_self_inverse() {
        let mut bits: Vec<u8> = (0..32).map(|i| (i % 3 == 0) as u8).collect();
        let original = bits.clone();
        polar_transform(&mut bits);
        assert_ne!(bits, original);
        polar_transform(&mut bits);
        assert_eq!(bits, original);
    }

    #[test]
    fn test_shortened_positions_encode_to_zero() {
        // Frozen shortened inputs must force the matching coded bits to zero.
        let code = PolarCode::select(30, 40, 10).unwrap();
        assert_eq!(code.rm_mode, RateMatchMode::Shortening);

        let payload: Vec<u8> = (0..30).map(|i| (i % 2) as u8).collect();
        let mut allocated = vec![0u8; code.block_len];
        chanalloc_tx(&payload, &mut allocated, &code);
        let mut d = vec![0u8; code.block_len];
        encode(&allocated, &mut d);

        for t in code.e..code.block_len {
            let pos = crate::fec::polar_rm::subblock_index(t, code.block_len);
            assert_eq!(d[pos], 0, "shortened coded bit {pos} not zero");
        }
    }

    #[test]
    fn test_roundtrip_repetition() {
        roundtrip(18, 64);
        roundtrip(18, 100);
        roundtrip(25, 32);
    }

    #[test]
    fn test_roundtrip_puncturing() {
        roundtrip(12, 48);
        roundtrip(20, 96);
    }

    #[test]
    fn test_roundtrip_shortening() {
        roundtrip(30, 40);
        roundtrip(60, 90);
    }

    #[test]
    fn test_roundtrip_large() {
        roundtrip(518, 1024);
        roundtrip(864, 1024);
    }

    #[test]
    fn test_decode_rejects_bad_lengths() {
        assert!(decode_sc(&[0.0; 12], &[false; 12]).is_err());
        assert!(decode_sc(&[0.0; 16], &[false; 8]).is_err());
        assert!(decode_sc(&[], &[]).is_err());
    }
}
