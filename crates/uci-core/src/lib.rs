//! # 5G NR UCI Coding Core
//!
//! Channel coding for Uplink Control Information (HARQ-ACK, scheduling
//! request and CSI reports) as defined by 3GPP TS 38.212 §5.3.3 and
//! §6.3.1/§6.3.2: payload assembly, size-dispatched encoding onto PUCCH
//! formats 2/3/4 and PUSCH, and soft-bit decoding with a validity verdict.
//!
//! ## Pipeline
//!
//! ```text
//! Tx: UciValue -> pack -> size (E) -> {repetition | simplex | Reed-Muller | polar} -> coded bits
//! Rx: LLRs -> inverse code -> unpack -> UciValue (+ valid flag)
//! ```
//!
//! Four code families are selected by the payload width `A`: 1-bit
//! repetition, 2-bit simplex, a Reed-Muller block code for 3..=11 bits and
//! segmented CRC-attached polar coding for 12..=1705 bits. The coded output
//! uses a 4-value alphabet (`0`, `1`, repetition, placeholder) consumed by
//! the modulator; receive LLRs are signed 8-bit with negative meaning bit 1.
//!
//! ## Example
//!
//! ```rust
//! use uci_core::{PucchFormat, PucchResource, UciCoder, UciCoderArgs, UciConfig, UciValue};
//!
//! let mut coder = UciCoder::new(UciCoderArgs::default());
//! let resource = PucchResource {
//!     format: PucchFormat::Format2,
//!     nof_symbols: 2,
//!     nof_prb: 4,
//!     ..Default::default()
//! };
//! let cfg = UciConfig { o_ack: 4, ..Default::default() };
//! let value = UciValue { ack: vec![1, 0, 1, 1], ..Default::default() };
//!
//! let mut coded = vec![0u8; 128];
//! let e = coder.encode_pucch(&resource, &cfg, &value, &mut coded).unwrap();
//! assert_eq!(e, 128);
//! ```

pub mod bits;
pub mod cfg;
pub mod coder;
pub mod crc;
pub mod csi;
pub mod error;
pub mod fec;
pub mod modulation;
pub mod payload;
pub mod sizing;
pub mod small_block;
pub mod types;

pub use cfg::{
    PucchFormat, PucchResource, PucchUciConfig, PuschUciConfig, UciConfig, UciData, UciValue,
    NSYMB_PER_SLOT,
};
pub use coder::{UciCoder, UciCoderArgs};
pub use csi::{CsiCodec, CsiReportConfig, CsiReportValue, WidebandCsiCodec};
pub use error::{UciError, UciResult};
pub use modulation::Modulation;
pub use sizing::{pucch_format_2_3_4_e, pusch_ack_nof_bits, pusch_csi1_nof_bits};
pub use types::UciBit;
