//! UCI coder: size-dispatched channel coding and the transport facades.
//!
//! One [`UciCoder`] owns the scratch buffers and codec state for a session
//! and is reused across slots. It is not meant for concurrent sharing;
//! construct one coder per worker thread. Dispatch over the payload size
//! selects the code family: 1-bit repetition, 2-bit simplex, Reed-Muller
//! for 3..=11 bits and segmented CRC-attached polar above that.

use tracing::{debug, trace};

use crate::bits;
use crate::cfg::{PucchResource, UciConfig, UciValue};
use crate::crc::UciCrc;
use crate::csi::{CsiCodec, WidebandCsiCodec};
use crate::error::{UciError, UciResult};
use crate::fec::polar::PolarCode;
use crate::fec::{block, polar, polar_rm};
use crate::payload::{self, crc_len};
use crate::sizing;
use crate::small_block;
use crate::types::{UciBit, MAX_CRC_LEN, MAX_POLAR_N, MAX_UCI_BITS, POLAR_N_MAX_LOG};

/// Default detection threshold shared by the 1-bit and block decoders.
const DEFAULT_CORR_THRESHOLD: f32 = 0.5;

/// Construction arguments for [`UciCoder`].
#[derive(Debug, Clone)]
pub struct UciCoderArgs {
    /// Keep scalar kernels even when vectorized implementations are
    /// compiled in. Purely a performance knob with no semantic effect;
    /// this build ships scalar kernels only.
    pub disable_simd: bool,
    /// Detection threshold for the Reed-Muller block decoder. Values that
    /// are not finite and positive fall back to 0.5.
    pub block_code_threshold: f32,
    /// Detection threshold for the 1-bit repetition decoder. Same fallback
    /// rule as `block_code_threshold`.
    pub one_bit_threshold: f32,
}

impl Default for UciCoderArgs {
    fn default() -> Self {
        Self {
            disable_simd: false,
            block_code_threshold: DEFAULT_CORR_THRESHOLD,
            one_bit_threshold: DEFAULT_CORR_THRESHOLD,
        }
    }
}

fn threshold_or_default(value: f32) -> f32 {
    if value.is_normal() && value > 0.0 {
        value
    } else {
        DEFAULT_CORR_THRESHOLD
    }
}

/// UCI encoder/decoder with preallocated scratch state.
pub struct UciCoder {
    csi: Box<dyn CsiCodec + Send>,
    crc6: UciCrc,
    crc11: UciCrc,
    block_code_threshold: f32,
    one_bit_threshold: f32,
    /// Payload bit sequence, `A` bits.
    bit_sequence: Vec<u8>,
    /// Per-segment payload plus CRC.
    c: Vec<u8>,
    /// Polar u-domain container.
    allocated: Vec<u8>,
    /// Polar mother codeword.
    d: Vec<u8>,
}

impl UciCoder {
    /// Create a coder with the default wideband CSI codec.
    pub fn new(args: UciCoderArgs) -> Self {
        Self::with_csi_codec(args, Box::new(WidebandCsiCodec))
    }

    /// Create a coder around an externally provided CSI codec.
    pub fn with_csi_codec(args: UciCoderArgs, csi: Box<dyn CsiCodec + Send>) -> Self {
        Self {
            csi,
            crc6: UciCrc::crc6(),
            crc11: UciCrc::crc11(),
            block_code_threshold: threshold_or_default(args.block_code_threshold),
            one_bit_threshold: threshold_or_default(args.one_bit_threshold),
            bit_sequence: vec![0; MAX_UCI_BITS],
            c: vec![0; MAX_UCI_BITS + MAX_CRC_LEN],
            allocated: vec![0; MAX_POLAR_N],
            d: vec![0; MAX_POLAR_N],
        }
    }

    /// Total payload width `o_ack + o_sr + O_csi1` for a configuration.
    pub fn total_bits(&self, cfg: &UciConfig) -> usize {
        cfg.o_ack + cfg.o_sr + self.csi.nof_bits(&cfg.csi)
    }

    /// Coded bits reserved for CSI part 1 on PUSCH for this configuration.
    pub fn pusch_csi1_nof_bits(&self, cfg: &UciConfig) -> UciResult<usize> {
        let o_csi1 = self.csi.nof_bits(&cfg.csi);
        sizing::pusch_csi1_nof_bits(&cfg.pusch, o_csi1, cfg.o_ack)
    }

    /// Encode UCI onto a PUCCH format 2/3/4 resource. Returns the number of
    /// coded bits written.
    pub fn encode_pucch(
        &mut self,
        resource: &PucchResource,
        cfg: &UciConfig,
        value: &UciValue,
        out: &mut [u8],
    ) -> UciResult<usize> {
        let e_tot = sizing::pucch_format_2_3_4_e(resource)?;
        // CSI part 1 / part 2 split unimplemented: all of E_tot is one payload.
        let e_uci = e_tot;

        let a = {
            let Self {
                ref csi,
                ref mut bit_sequence,
                ..
            } = *self;
            payload::pack_pucch(cfg, value, csi.as_ref(), bit_sequence)?
        };

        self.encode(cfg, a, out, e_uci)
    }

    /// Decode UCI from PUCCH soft bits. `value.valid` carries the verdict.
    pub fn decode_pucch(
        &mut self,
        resource: &PucchResource,
        cfg: &UciConfig,
        llr: &[i8],
        value: &mut UciValue,
    ) -> UciResult<()> {
        let e_tot = sizing::pucch_format_2_3_4_e(resource)?;
        let e_uci = e_tot;

        // Sized from the configuration, never from the received bits.
        let a = payload::uci_a(cfg, self.csi.as_ref())?;

        value.valid = self.decode(cfg, llr, a, e_uci)?;

        let Self {
            ref csi,
            ref bit_sequence,
            ..
        } = *self;
        payload::unpack_pucch(cfg, &bit_sequence[..a], csi.as_ref(), value)?;
        Ok(())
    }

    /// Encode HARQ-ACK for multiplexing on PUSCH. Returns the number of
    /// coded bits written; zero when there is nothing to multiplex.
    pub fn encode_pusch_ack(
        &mut self,
        cfg: &UciConfig,
        value: &UciValue,
        out: &mut [u8],
    ) -> UciResult<usize> {
        let mut a = cfg.o_ack;

        // 6.3.2.1.1: on a CSI-only PUSCH with several reports and no part 2,
        // HARQ-ACK always occupies its two reserved bit positions.
        let has_csi_part2 = self.csi.has_part2(&cfg.csi);
        if cfg.pusch.k_sum == 0 && cfg.csi.len() > 1 && !has_csi_part2 && a < 2 {
            self.bit_sequence[0] = if a == 0 {
                0
            } else {
                *value
                    .ack
                    .first()
                    .ok_or(UciError::InvalidInput("HARQ-ACK payload shorter than o_ack"))?
            };
            self.bit_sequence[1] = 0;
            a = 2;
        } else if a == 0 {
            debug!("no HARQ-ACK to multiplex");
            return Ok(0);
        } else {
            if value.ack.len() < a {
                return Err(UciError::InvalidInput("HARQ-ACK payload shorter than o_ack"));
            }
            self.bit_sequence[..a].copy_from_slice(&value.ack[..a]);
        }

        let e_uci = sizing::pusch_ack_nof_bits(&cfg.pusch, a)?;
        self.encode(cfg, a, out, e_uci)
    }

    /// Decode HARQ-ACK multiplexed on PUSCH.
    pub fn decode_pusch_ack(
        &mut self,
        cfg: &UciConfig,
        llr: &[i8],
        value: &mut UciValue,
    ) -> UciResult<()> {
        let mut a = cfg.o_ack;

        // Mirror the encoder's two-bit coercion, from configuration alone.
        let has_csi_part2 = self.csi.has_part2(&cfg.csi);
        if cfg.pusch.k_sum == 0 && cfg.csi.len() > 1 && !has_csi_part2 && cfg.o_ack < 2 {
            a = 2;
        }
        if a == 0 {
            debug!("no HARQ-ACK to demultiplex");
            value.ack.clear();
            return Ok(());
        }

        let e_uci = sizing::pusch_ack_nof_bits(&cfg.pusch, a)?;
        value.valid = self.decode(cfg, llr, a, e_uci)?;

        value.ack.clear();
        value.ack.extend_from_slice(&self.bit_sequence[..a]);
        Ok(())
    }

    /// Encode CSI part 1 for multiplexing on PUSCH. Returns the number of
    /// coded bits written; zero when there is nothing to multiplex.
    pub fn encode_pusch_csi1(
        &mut self,
        cfg: &UciConfig,
        value: &UciValue,
        out: &mut [u8],
    ) -> UciResult<usize> {
        let a = {
            let Self {
                ref csi,
                ref mut bit_sequence,
                ..
            } = *self;
            csi.pack(&cfg.csi, &value.csi, bit_sequence)?
        };
        if a == 0 {
            debug!("no CSI part 1 to multiplex");
            return Ok(0);
        }

        let e_uci = self.pusch_csi1_nof_bits(cfg)?;
        self.encode(cfg, a, out, e_uci)
    }

    /// Decode CSI part 1 multiplexed on PUSCH.
    pub fn decode_pusch_csi1(
        &mut self,
        cfg: &UciConfig,
        llr: &[i8],
        value: &mut UciValue,
    ) -> UciResult<()> {
        let e_uci = self.pusch_csi1_nof_bits(cfg)?;
        let a = self.csi.nof_bits(&cfg.csi);

        value.valid = self.decode(cfg, llr, a, e_uci)?;

        let Self {
            ref csi,
            ref bit_sequence,
            ..
        } = *self;
        csi.unpack(&cfg.csi, &bit_sequence[..a], &mut value.csi)?;
        Ok(())
    }

    /// Dispatch the packed payload of `a` bits to its code family.
    fn encode(
        &mut self,
        cfg: &UciConfig,
        a: usize,
        out: &mut [u8],
        e_uci: usize,
    ) -> UciResult<usize> {
        if e_uci == 0 {
            return Err(UciError::InvalidInput("E must be positive"));
        }
        if out.len() < e_uci {
            return Err(UciError::InvalidInput("output buffer shorter than E"));
        }
        let out = &mut out[..e_uci];

        match a {
            1 => small_block::encode_1bit(self.bit_sequence[0], cfg.pusch.modulation, out),
            2 => small_block::encode_2bit(
                [self.bit_sequence[0], self.bit_sequence[1]],
                cfg.pusch.modulation,
                out,
            ),
            3..=11 => block::encode(&self.bit_sequence[..a], out),
            12..=1705 => self.encode_polar(a, out)?,
            _ => return Err(UciError::InvalidInput("payload size A out of range")),
        }

        trace!(a, e = e_uci, "encoded UCI payload");
        Ok(e_uci)
    }

    /// Dispatch `e_uci` soft bits to the decoder of the `a`-bit payload.
    /// Returns the detection verdict; the payload lands in `bit_sequence`.
    fn decode(&mut self, cfg: &UciConfig, llr: &[i8], a: usize, e_uci: usize) -> UciResult<bool> {
        if e_uci == 0 {
            return Err(UciError::InvalidInput("E must be positive"));
        }
        if llr.len() < e_uci {
            return Err(UciError::InvalidInput("LLR buffer shorter than E"));
        }
        let llr = &llr[..e_uci];

        match a {
            1 => {
                let (bit, valid) =
                    small_block::decode_1bit(llr, cfg.pusch.modulation, self.one_bit_threshold);
                self.bit_sequence[0] = bit;
                Ok(valid)
            }
            2 => {
                let (two_bits, valid) = small_block::decode_2bit(llr, cfg.pusch.modulation);
                self.bit_sequence[..2].copy_from_slice(&two_bits);
                Ok(valid)
            }
            3..=11 => {
                let Self {
                    ref mut bit_sequence,
                    block_code_threshold,
                    ..
                } = *self;
                small_block::decode_block(llr, &mut bit_sequence[..a], block_code_threshold)
            }
            12..=1705 => self.decode_polar(a, llr),
            _ => Err(UciError::InvalidInput("payload size A out of range")),
        }
    }

    /// Segmented CRC-attached polar encoding for 12..=1705-bit payloads
    /// (TS 38.212 §6.3.1.2 to §6.3.1.4).
    fn encode_polar(&mut self, a: usize, out: &mut [u8]) -> UciResult<()> {
        let e_uci = out.len();
        let (nof_segments, a_prime, k_r, e_r) = polar_params(a, e_uci);
        let l = crc_len(a);
        let crc = if l == 6 { self.crc6 } else { self.crc11 };
        let code = PolarCode::select(k_r, e_r, POLAR_N_MAX_LOG)?;
        let n = code.block_len;
        let seg_len = a_prime / nof_segments;

        let mut s = 0usize;
        for r in 0..nof_segments {
            let mut k = 0usize;
            // Zero-pad the first segment when A does not split evenly.
            if r == 0 {
                while k < a_prime - a {
                    self.c[k] = 0;
                    k += 1;
                }
            }
            while k < seg_len {
                self.c[k] = self.bit_sequence[s];
                k += 1;
                s += 1;
            }

            let checksum = crc.attach(&mut self.c, seg_len);
            trace!(
                segment = r,
                nof_segments,
                crc_bits = l,
                checksum,
                "attached segment CRC"
            );

            polar::chanalloc_tx(&self.c[..k_r], &mut self.allocated[..n], &code);
            polar::encode(&self.allocated[..n], &mut self.d[..n]);
            polar_rm::rate_match_tx(&self.d[..n], &mut out[e_r * r..e_r * (r + 1)], &code);
        }

        // A segmented E_uci that does not split evenly leaves a tail unused.
        for o in out.iter_mut().skip(e_r * nof_segments) {
            *o = UciBit::Bit0 as u8;
        }
        Ok(())
    }

    /// Inverse of [`encode_polar`]: per-segment rate recovery, SC decoding
    /// and CRC check. The verdict accumulates with AND across segments.
    fn decode_polar(&mut self, a: usize, llr: &[i8]) -> UciResult<bool> {
        let e_uci = llr.len();
        let (nof_segments, a_prime, k_r, e_r) = polar_params(a, e_uci);
        let l = crc_len(a);
        let crc = if l == 6 { self.crc6 } else { self.crc11 };
        let code = PolarCode::select(k_r, e_r, POLAR_N_MAX_LOG)?;
        let seg_len = a_prime / nof_segments;

        // Flip once into the polar decoder's positive-means-one convention.
        let negated: Vec<i8> = llr.iter().map(|&v| v.saturating_neg()).collect();

        let mut valid = true;
        let mut s = 0usize;
        for r in 0..nof_segments {
            let soft = polar_rm::rate_match_rx(&negated[e_r * r..e_r * (r + 1)], &code);
            let u = polar::decode_sc(&soft, &code.frozen_mask)?;
            polar::chanalloc_rx(&u, &mut self.c[..k_r], &code);

            let checksum = crc.checksum(&self.c[..seg_len]);
            let checksum_rx = bits::pack_msb(&self.c[seg_len..k_r]);
            valid = valid && checksum == checksum_rx;
            trace!(
                segment = r,
                nof_segments,
                checksum,
                checksum_rx,
                "checked segment CRC"
            );

            // The first segment's leading zero padding is dropped.
            let start = if r == 0 { a_prime - a } else { 0 };
            for k in start..seg_len {
                self.bit_sequence[s] = self.c[k];
                s += 1;
            }
        }
        Ok(valid)
    }
}

/// Segmentation and per-segment code parameters for the polar path:
/// `(C, A', K_r, E_r)` (TS 38.212 §6.3.1.3.1).
fn polar_params(a: usize, e_uci: usize) -> (usize, usize, usize, usize) {
    let i_seg = (a >= 360 && e_uci >= 1088) || a >= 1013;
    let nof_segments = if i_seg { 2 } else { 1 };
    let a_prime = a.div_ceil(nof_segments) * nof_segments;
    let k_r = a_prime / nof_segments + crc_len(a);
    let e_r = e_uci / nof_segments;
    (nof_segments, a_prime, k_r, e_r)
}
