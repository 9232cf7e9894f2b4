//! UCI payload bit-sequence assembly (TS 38.212 §6.3.1.1).
//!
//! The payload is the concatenation of HARQ-ACK bits, the scheduling
//! request unpacked MSB first, and the packed CSI part 1 reports. Which
//! fields appear depends on the slot configuration.

use tracing::trace;

use crate::bits;
use crate::cfg::{UciConfig, UciValue};
use crate::csi::CsiCodec;
use crate::error::{UciError, UciResult};

/// CRC length `L` attached to a payload of `A` bits (TS 38.212 §6.3.1.2.1).
pub fn crc_len(a: usize) -> usize {
    if a <= 11 {
        0
    } else if a < 20 {
        6
    } else {
        11
    }
}

/// Append HARQ-ACK then SR bits to `seq`. Returns `A`.
fn pack_ack_sr(cfg: &UciConfig, value: &UciValue, seq: &mut [u8]) -> UciResult<usize> {
    if value.ack.len() < cfg.o_ack {
        return Err(UciError::InvalidInput("HARQ-ACK payload shorter than o_ack"));
    }
    seq[..cfg.o_ack].copy_from_slice(&value.ack[..cfg.o_ack]);
    let mut a = cfg.o_ack;

    bits::unpack_msb(value.sr, &mut seq[a..a + cfg.o_sr]);
    a += cfg.o_sr;
    Ok(a)
}

/// Split `seq` back into HARQ-ACK and SR values. Returns `A`.
fn unpack_ack_sr(cfg: &UciConfig, seq: &[u8], value: &mut UciValue) -> usize {
    value.ack.clear();
    value.ack.extend_from_slice(&seq[..cfg.o_ack]);
    value.sr = bits::pack_msb(&seq[cfg.o_ack..cfg.o_ack + cfg.o_sr]);
    cfg.o_ack + cfg.o_sr
}

/// Build the PUCCH payload bit sequence. Returns `A`.
pub(crate) fn pack_pucch(
    cfg: &UciConfig,
    value: &UciValue,
    csi: &dyn CsiCodec,
    seq: &mut [u8],
) -> UciResult<usize> {
    let o_csi = csi.nof_bits(&cfg.csi);

    // HARQ-ACK/SR only (§6.3.1.1.1).
    if o_csi == 0 {
        let a = pack_ack_sr(cfg, value, seq)?;
        trace!(a, "packed HARQ-ACK/SR payload");
        return Ok(a);
    }

    // CSI only (§6.3.1.1.2).
    if cfg.o_ack == 0 && cfg.o_sr == 0 {
        let a = csi.pack(&cfg.csi, &value.csi, seq)?;
        trace!(a, "packed CSI-only payload");
        return Ok(a);
    }

    // HARQ-ACK/SR and CSI (§6.3.1.1.3).
    let mut a = pack_ack_sr(cfg, value, seq)?;
    a += csi.pack(&cfg.csi, &value.csi, &mut seq[a..])?;
    trace!(a, "packed HARQ-ACK/SR and CSI payload");
    Ok(a)
}

/// Split a decoded PUCCH bit sequence back into field values. Returns `A`.
pub(crate) fn unpack_pucch(
    cfg: &UciConfig,
    seq: &[u8],
    csi: &dyn CsiCodec,
    value: &mut UciValue,
) -> UciResult<usize> {
    let o_csi = csi.nof_bits(&cfg.csi);

    if o_csi == 0 {
        return Ok(unpack_ack_sr(cfg, seq, value));
    }

    if cfg.o_ack == 0 && cfg.o_sr == 0 {
        return Err(UciError::Unsupported("CSI-only PUCCH decoding"));
    }

    let a = unpack_ack_sr(cfg, seq, value);
    let n = csi.unpack(&cfg.csi, &seq[a..], &mut value.csi)?;
    Ok(a + n)
}

/// Payload width `A` derivable from the configuration alone. The decoder
/// must size the pipeline before any payload bit is known.
pub(crate) fn uci_a(cfg: &UciConfig, csi: &dyn CsiCodec) -> UciResult<usize> {
    let o_csi = csi.nof_bits(&cfg.csi);

    if o_csi == 0 {
        return Ok(cfg.o_ack + cfg.o_sr);
    }

    if cfg.o_ack == 0 && cfg.o_sr == 0 {
        return Ok(o_csi);
    }

    Err(UciError::Unsupported(
        "combined HARQ-ACK/SR and CSI payload sizing",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csi::{CsiReportConfig, CsiReportValue, WidebandCsiCodec};

    fn csi_report() -> CsiReportConfig {
        CsiReportConfig {
            cqi_nof_bits: 4,
            ri_nof_bits: 0,
            has_part2: false,
        }
    }

    #[test]
    fn test_crc_len_rule() {
        assert_eq!(crc_len(1), 0);
        assert_eq!(crc_len(11), 0);
        assert_eq!(crc_len(12), 6);
        assert_eq!(crc_len(19), 6);
        assert_eq!(crc_len(20), 11);
        assert_eq!(crc_len(1706), 11);
    }

    #[test]
    fn test_ack_sr_roundtrip() {
        let cfg = UciConfig {
            o_ack: 3,
            o_sr: 2,
            ..Default::default()
        };
        let value = UciValue {
            ack: vec![1, 0, 1],
            sr: 2,
            ..Default::default()
        };

        let mut seq = [0u8; 8];
        let a = pack_pucch(&cfg, &value, &WidebandCsiCodec, &mut seq).unwrap();
        assert_eq!(a, 5);
        assert_eq!(&seq[..5], &[1, 0, 1, 1, 0]);

        let mut decoded = UciValue::default();
        let a = unpack_pucch(&cfg, &seq, &WidebandCsiCodec, &mut decoded).unwrap();
        assert_eq!(a, 5);
        assert_eq!(decoded.ack, value.ack);
        assert_eq!(decoded.sr, value.sr);
    }

    #[test]
    fn test_csi_only_pack() {
        let cfg = UciConfig {
            csi: vec![csi_report()],
            ..Default::default()
        };
        let value = UciValue {
            csi: vec![CsiReportValue {
                wideband_cqi: 9,
                ri: 0,
            }],
            ..Default::default()
        };

        let mut seq = [0u8; 8];
        let a = pack_pucch(&cfg, &value, &WidebandCsiCodec, &mut seq).unwrap();
        assert_eq!(a, 4);
        assert_eq!(&seq[..4], &[1, 0, 0, 1]);
    }

    #[test]
    fn test_csi_only_unpack_is_unsupported() {
        let cfg = UciConfig {
            csi: vec![csi_report()],
            ..Default::default()
        };
        let mut value = UciValue::default();
        assert_eq!(
            unpack_pucch(&cfg, &[0; 8], &WidebandCsiCodec, &mut value),
            Err(UciError::Unsupported("CSI-only PUCCH decoding"))
        );
    }

    #[test]
    fn test_combined_pack_and_unpack() {
        let cfg = UciConfig {
            o_ack: 2,
            o_sr: 1,
            csi: vec![csi_report()],
            ..Default::default()
        };
        let value = UciValue {
            ack: vec![1, 1],
            sr: 1,
            csi: vec![CsiReportValue {
                wideband_cqi: 5,
                ri: 0,
            }],
            ..Default::default()
        };

        let mut seq = [0u8; 8];
        let a = pack_pucch(&cfg, &value, &WidebandCsiCodec, &mut seq).unwrap();
        assert_eq!(a, 7);
        assert_eq!(&seq[..7], &[1, 1, 1, 0, 1, 0, 1]);

        let mut decoded = UciValue::default();
        unpack_pucch(&cfg, &seq, &WidebandCsiCodec, &mut decoded).unwrap();
        assert_eq!(decoded.ack, value.ack);
        assert_eq!(decoded.sr, 1);
        assert_eq!(decoded.csi, value.csi);
    }

    #[test]
    fn test_uci_a() {
        let codec = WidebandCsiCodec;

        let cfg = UciConfig {
            o_ack: 2,
            o_sr: 1,
            ..Default::default()
        };
        assert_eq!(uci_a(&cfg, &codec), Ok(3));

        let cfg = UciConfig {
            csi: vec![csi_report()],
            ..Default::default()
        };
        assert_eq!(uci_a(&cfg, &codec), Ok(4));

        let cfg = UciConfig {
            o_ack: 1,
            csi: vec![csi_report()],
            ..Default::default()
        };
        assert!(matches!(uci_a(&cfg, &codec), Err(UciError::Unsupported(_))));
    }

    #[test]
    fn test_pack_rejects_short_ack() {
        let cfg = UciConfig {
            o_ack: 4,
            ..Default::default()
        };
        let value = UciValue {
            ack: vec![1, 0],
            ..Default::default()
        };
        let mut seq = [0u8; 8];
        assert!(pack_pucch(&cfg, &value, &WidebandCsiCodec, &mut seq).is_err());
    }
}
