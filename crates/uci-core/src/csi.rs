//! CSI part 1 report codec seam.
//!
//! CSI report contents are defined by the RRC configuration and owned by an
//! external codec; the coder only needs the packed width and the bit mapping.
//! [`WidebandCsiCodec`] is the default implementation, packing a wideband CQI
//! and an optional rank indicator per report.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bits;
use crate::error::{UciError, UciResult};

/// Description of one configured CSI report.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CsiReportConfig {
    /// Width of the wideband CQI field in bits.
    pub cqi_nof_bits: u32,
    /// Width of the rank indicator field in bits (0 when not reported).
    pub ri_nof_bits: u32,
    /// True when the report also produces a CSI part 2.
    pub has_part2: bool,
}

impl CsiReportConfig {
    /// Total packed width of this report in bits.
    pub fn nof_bits(&self) -> usize {
        (self.cqi_nof_bits + self.ri_nof_bits) as usize
    }
}

/// Decoded content of one CSI report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CsiReportValue {
    /// Wideband channel quality indicator.
    pub wideband_cqi: u32,
    /// Rank indicator.
    pub ri: u32,
}

impl fmt::Display for CsiReportValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cqi={}", self.wideband_cqi)
    }
}

/// Codec translating CSI report values to and from the UCI bit sequence.
pub trait CsiCodec {
    /// Packed CSI part 1 width in bits for the given report set.
    fn nof_bits(&self, reports: &[CsiReportConfig]) -> usize;

    /// Pack `values` into `out` (one bit per byte). Returns bits written.
    fn pack(
        &self,
        reports: &[CsiReportConfig],
        values: &[CsiReportValue],
        out: &mut [u8],
    ) -> UciResult<usize>;

    /// Unpack `bits` into `values`. Returns bits consumed.
    fn unpack(
        &self,
        reports: &[CsiReportConfig],
        bits: &[u8],
        values: &mut Vec<CsiReportValue>,
    ) -> UciResult<usize>;

    /// True when any report carries a CSI part 2.
    fn has_part2(&self, reports: &[CsiReportConfig]) -> bool;
}

/// Default codec: wideband CQI then RI, each MSB first, report by report.
#[derive(Debug, Clone, Copy, Default)]
pub struct WidebandCsiCodec;

impl CsiCodec for WidebandCsiCodec {
    fn nof_bits(&self, reports: &[CsiReportConfig]) -> usize {
        reports.iter().map(CsiReportConfig::nof_bits).sum()
    }

    fn pack(
        &self,
        reports: &[CsiReportConfig],
        values: &[CsiReportValue],
        out: &mut [u8],
    ) -> UciResult<usize> {
        if values.len() < reports.len() {
            return Err(UciError::CsiPackFailed);
        }
        if self.nof_bits(reports) > out.len() {
            return Err(UciError::CsiPackFailed);
        }

        let mut offset = 0;
        for (report, value) in reports.iter().zip(values) {
            let cqi = report.cqi_nof_bits as usize;
            let ri = report.ri_nof_bits as usize;
            if cqi < 32 && value.wideband_cqi >> report.cqi_nof_bits != 0 {
                return Err(UciError::CsiPackFailed);
            }
            bits::unpack_msb(value.wideband_cqi, &mut out[offset..offset + cqi]);
            offset += cqi;
            bits::unpack_msb(value.ri, &mut out[offset..offset + ri]);
            offset += ri;
        }
        Ok(offset)
    }

    fn unpack(
        &self,
        reports: &[CsiReportConfig],
        bits_in: &[u8],
        values: &mut Vec<CsiReportValue>,
    ) -> UciResult<usize> {
        if self.nof_bits(reports) > bits_in.len() {
            return Err(UciError::CsiUnpackFailed);
        }

        values.clear();
        let mut offset = 0;
        for report in reports {
            let cqi = report.cqi_nof_bits as usize;
            let ri = report.ri_nof_bits as usize;
            let wideband_cqi = bits::pack_msb(&bits_in[offset..offset + cqi]);
            offset += cqi;
            let ri_value = bits::pack_msb(&bits_in[offset..offset + ri]);
            offset += ri;
            values.push(CsiReportValue {
                wideband_cqi,
                ri: ri_value,
            });
        }
        Ok(offset)
    }

    fn has_part2(&self, reports: &[CsiReportConfig]) -> bool {
        reports.iter().any(|r| r.has_part2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_reports() -> Vec<CsiReportConfig> {
        vec![
            CsiReportConfig {
                cqi_nof_bits: 4,
                ri_nof_bits: 1,
                has_part2: false,
            },
            CsiReportConfig {
                cqi_nof_bits: 4,
                ri_nof_bits: 0,
                has_part2: false,
            },
        ]
    }

    #[test]
    fn test_nof_bits() {
        let codec = WidebandCsiCodec;
        assert_eq!(codec.nof_bits(&two_reports()), 9);
        assert_eq!(codec.nof_bits(&[]), 0);
    }

    #[test]
    fn test_pack_unpack_roundtrip() {
        let codec = WidebandCsiCodec;
        let reports = two_reports();
        let values = vec![
            CsiReportValue {
                wideband_cqi: 11,
                ri: 1,
            },
            CsiReportValue {
                wideband_cqi: 5,
                ri: 0,
            },
        ];

        let mut bits = [0u8; 9];
        let packed = codec.pack(&reports, &values, &mut bits).unwrap();
        assert_eq!(packed, 9);
        assert_eq!(&bits[..4], &[1, 0, 1, 1]);

        let mut decoded = Vec::new();
        let consumed = codec.unpack(&reports, &bits, &mut decoded).unwrap();
        assert_eq!(consumed, 9);
        assert_eq!(decoded, values);
    }

    #[test]
    fn test_pack_rejects_short_buffer() {
        let codec = WidebandCsiCodec;
        let reports = two_reports();
        let values = vec![CsiReportValue::default(); 2];
        let mut bits = [0u8; 4];
        assert_eq!(
            codec.pack(&reports, &values, &mut bits),
            Err(UciError::CsiPackFailed)
        );
    }

    #[test]
    fn test_pack_rejects_out_of_range_cqi() {
        let codec = WidebandCsiCodec;
        let reports = vec![CsiReportConfig {
            cqi_nof_bits: 4,
            ri_nof_bits: 0,
            has_part2: false,
        }];
        let values = vec![CsiReportValue {
            wideband_cqi: 16,
            ri: 0,
        }];
        let mut bits = [0u8; 4];
        assert_eq!(
            codec.pack(&reports, &values, &mut bits),
            Err(UciError::CsiPackFailed)
        );
    }

    #[test]
    fn test_has_part2() {
        let codec = WidebandCsiCodec;
        let mut reports = two_reports();
        assert!(!codec.has_part2(&reports));
        reports[1].has_part2 = true;
        assert!(codec.has_part2(&reports));
    }
}
