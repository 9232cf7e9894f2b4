//! Throughput benchmarks for the UCI code families.
//!
//! Run with: cargo bench -p uci-core --bench uci_coding

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use uci_core::{
    Modulation, PucchFormat, PucchResource, PuschUciConfig, UciCoder, UciCoderArgs, UciConfig,
    UciValue,
};

fn format2(nof_symbols: u32, nof_prb: u32) -> PucchResource {
    PucchResource {
        format: PucchFormat::Format2,
        nof_symbols,
        nof_prb,
        ..Default::default()
    }
}

fn to_llr(coded: &[u8]) -> Vec<i8> {
    coded
        .iter()
        .map(|&b| match b {
            1 | 2 => -64i8,
            _ => 64,
        })
        .collect()
}

fn ack_value(n: usize) -> UciValue {
    UciValue {
        ack: (0..n).map(|i| (i % 2) as u8).collect(),
        ..Default::default()
    }
}

fn bench_block_code(c: &mut Criterion) {
    let mut group = c.benchmark_group("pucch_block");
    let mut q = UciCoder::new(UciCoderArgs::default());
    let resource = format2(2, 2); // E = 64
    let cfg = UciConfig {
        o_ack: 8,
        ..Default::default()
    };
    let value = ack_value(8);
    let mut coded = vec![0u8; 64];
    q.encode_pucch(&resource, &cfg, &value, &mut coded).unwrap();
    let llr = to_llr(&coded);

    group.throughput(Throughput::Elements(64));
    group.bench_function("encode_a8_e64", |b| {
        b.iter(|| {
            q.encode_pucch(black_box(&resource), &cfg, &value, &mut coded)
                .unwrap()
        })
    });
    group.bench_function("decode_a8_e64", |b| {
        let mut decoded = UciValue::default();
        b.iter(|| {
            q.decode_pucch(black_box(&resource), &cfg, &llr, &mut decoded)
                .unwrap()
        })
    });
    group.finish();
}

fn bench_polar(c: &mut Criterion) {
    let mut group = c.benchmark_group("polar");

    // Single segment on a full-slot PUCCH format 3 resource.
    let mut q = UciCoder::new(UciCoderArgs::default());
    let resource = PucchResource {
        format: PucchFormat::Format3,
        nof_symbols: 14,
        nof_prb: 1,
        ..Default::default()
    };
    let cfg = UciConfig {
        o_ack: 100,
        ..Default::default()
    };
    let value = ack_value(100);
    let mut coded = vec![0u8; 672];
    q.encode_pucch(&resource, &cfg, &value, &mut coded).unwrap();
    let llr = to_llr(&coded);

    group.throughput(Throughput::Elements(672));
    group.bench_function("encode_a100_e672", |b| {
        b.iter(|| {
            q.encode_pucch(black_box(&resource), &cfg, &value, &mut coded)
                .unwrap()
        })
    });
    group.bench_function("decode_a100_e672", |b| {
        let mut decoded = UciValue::default();
        b.iter(|| {
            q.decode_pucch(black_box(&resource), &cfg, &llr, &mut decoded)
                .unwrap()
        })
    });

    // Two-segment worst case on PUSCH.
    let cfg = UciConfig {
        o_ack: 1013,
        pusch: PuschUciConfig {
            modulation: Modulation::Qpsk,
            code_rate: 1.0,
            beta_harq_ack_offset: 2.0,
            m_uci_sc: [100; 14],
            ..Default::default()
        },
        ..Default::default()
    };
    let value = ack_value(1013);
    let mut coded = vec![0u8; 2048];
    q.encode_pusch_ack(&cfg, &value, &mut coded).unwrap();
    let llr = to_llr(&coded);

    group.throughput(Throughput::Elements(2048));
    group.bench_function("encode_a1013_e2048", |b| {
        b.iter(|| q.encode_pusch_ack(&cfg, &value, &mut coded).unwrap())
    });
    group.bench_function("decode_a1013_e2048", |b| {
        let mut decoded = UciValue::default();
        b.iter(|| q.decode_pusch_ack(&cfg, &llr, &mut decoded).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_block_code, bench_polar);
criterion_main!(benches);
