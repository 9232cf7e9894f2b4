//! Rate-matched output sizing (TS 38.212 §6.3.1.4 and §6.3.2.4).
//!
//! The PUCCH side is a straight table lookup over the resource geometry.
//! The PUSCH side computes the number of reserved resource elements
//! `Q'_ack` / `Q'_csi1` and scales them by layers and modulation order.

use crate::cfg::{PucchFormat, PucchResource, PuschUciConfig};
use crate::error::{UciError, UciResult};
use crate::payload::crc_len;

/// Total coded bits `E_tot` carried by a PUCCH format 2/3/4 resource.
pub fn pucch_format_2_3_4_e(resource: &PucchResource) -> UciResult<usize> {
    if resource.nof_symbols == 0 {
        return Err(UciError::InvalidInput("PUCCH resource without symbols"));
    }
    let nof_symbols = resource.nof_symbols as usize;
    let nof_prb = resource.nof_prb as usize;

    match resource.format {
        PucchFormat::Format2 => {
            if nof_prb == 0 {
                return Err(UciError::InvalidInput("PUCCH resource without PRBs"));
            }
            Ok(16 * nof_symbols * nof_prb)
        }
        PucchFormat::Format3 => {
            if nof_prb == 0 {
                return Err(UciError::InvalidInput("PUCCH resource without PRBs"));
            }
            if resource.enable_pi_bpsk {
                Ok(12 * nof_symbols * nof_prb)
            } else {
                Ok(24 * nof_symbols * nof_prb)
            }
        }
        PucchFormat::Format4 => {
            let occ = resource.occ_length as usize;
            if occ != 1 && occ != 2 {
                return Err(UciError::InvalidOccLength {
                    occ_length: resource.occ_length,
                });
            }
            if resource.enable_pi_bpsk {
                Ok(12 / occ * nof_symbols)
            } else {
                Ok(24 / occ * nof_symbols)
            }
        }
    }
}

fn validate_rate(cfg: &PuschUciConfig) -> UciResult<f32> {
    let rate = cfg.code_rate;
    if !rate.is_normal() || rate <= 0.0 {
        return Err(UciError::InvalidRate { rate });
    }
    Ok(rate)
}

/// Resource elements `Q'_ack` reserved for HARQ-ACK (§6.3.2.4.1.1).
fn q_prime_ack(cfg: &PuschUciConfig, o_ack: usize) -> UciResult<usize> {
    let l_ack = crc_len(o_ack);
    let qm = cfg.modulation.bits_per_symbol();
    let rate = validate_rate(cfg)?;

    let m_uci_sum: u32 = cfg.m_uci_sc.iter().sum();
    let m_uci_l0_sum: u32 = cfg.m_uci_sc.iter().skip(cfg.l0).sum();

    let payload = (o_ack + l_ack) as f32 * cfg.beta_harq_ack_offset;
    let q = if cfg.k_sum == 0 {
        // CSI-only PUSCH: no transport block to scale against.
        (payload / (qm as f32 * rate))
            .ceil()
            .min(cfg.alpha * m_uci_l0_sum as f32)
    } else {
        (payload * m_uci_sum as f32 / cfg.k_sum as f32)
            .ceil()
            .min(cfg.alpha * m_uci_l0_sum as f32)
    };
    Ok(q as usize)
}

/// Coded bits `E` reserved for HARQ-ACK on PUSCH.
pub fn pusch_ack_nof_bits(cfg: &PuschUciConfig, o_ack: usize) -> UciResult<usize> {
    if cfg.nof_layers == 0 {
        return Err(UciError::InvalidInput("PUSCH without layers"));
    }
    let q = q_prime_ack(cfg, o_ack)?;
    Ok(q * cfg.nof_layers as usize * cfg.modulation.bits_per_symbol())
}

/// Resource elements `Q'_csi1` reserved for CSI part 1 (§6.3.2.4.1.2).
///
/// Two HARQ-ACK resource slots are always reserved in the computation,
/// whatever the actual `o_ack`.
fn q_prime_csi1(cfg: &PuschUciConfig, o_csi1: usize, o_ack: usize) -> UciResult<usize> {
    let l_csi1 = crc_len(o_csi1);
    let qm = cfg.modulation.bits_per_symbol();
    let rate = validate_rate(cfg)?;
    let q_ack = q_prime_ack(cfg, o_ack.max(2))?;

    let m_uci_sum: u32 = cfg.m_uci_sc.iter().sum();
    let m_uci_sum_f = m_uci_sum as f32;

    let payload = (o_csi1 + l_csi1) as f32 * cfg.beta_csi1_offset;
    let q = if cfg.k_sum == 0 {
        if cfg.csi_part2_present {
            (payload / (qm as f32 * rate))
                .ceil()
                .min(cfg.alpha * m_uci_sum_f - q_ack as f32)
        } else {
            // No part 2 follows: CSI part 1 fills whatever HARQ-ACK left.
            return Ok((m_uci_sum as usize).saturating_sub(q_ack));
        }
    } else {
        (payload * m_uci_sum_f / cfg.k_sum as f32)
            .ceil()
            .min((cfg.alpha * m_uci_sum_f).ceil() - q_ack as f32)
    };
    Ok(q.max(0.0) as usize)
}

/// Coded bits `E` reserved for CSI part 1 on PUSCH.
pub fn pusch_csi1_nof_bits(cfg: &PuschUciConfig, o_csi1: usize, o_ack: usize) -> UciResult<usize> {
    if cfg.nof_layers == 0 {
        return Err(UciError::InvalidInput("PUSCH without layers"));
    }
    let q = q_prime_csi1(cfg, o_csi1, o_ack)?;
    Ok(q * cfg.nof_layers as usize * cfg.modulation.bits_per_symbol())
}
