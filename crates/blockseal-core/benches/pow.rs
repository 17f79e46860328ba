use blockseal_core::mine::{mine, mine_parallel};
use blockseal_core::{merkle_root, Block, ProofOfWork, Transaction, TxOutput};
use criterion::{criterion_group, criterion_main, Criterion};
use num_bigint::BigUint;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::sync::atomic::AtomicBool;

fn sample_txs(count: usize) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(42);
    (0..count)
        .map(|i| {
            Transaction::new(
                vec![format!("{}:{}", "ab".repeat(32), i)],
                vec![TxOutput::new(format!("alice-{i}"), "bob", rng.gen_range(1..10))],
            )
        })
        .collect()
}

fn bench_pow(c: &mut Criterion) {
    let pow = ProofOfWork::default();
    let block = Block::new_at(
        1,
        sample_txs(10),
        "cd".repeat(32),
        false,
        pow.genesis_target().clone(),
        1_600_000_000,
    );
    let stop = AtomicBool::new(false);

    c.bench_function("mine_genesis_target", |b| {
        b.iter(|| {
            let mut candidate = block.clone();
            mine(&mut candidate, &stop)
        });
    });

    let harder = Block::new_at(
        1,
        sample_txs(10),
        "cd".repeat(32),
        false,
        BigUint::from(1u8) << 240,
        1_600_000_000,
    );
    c.bench_function("mine_parallel_target_2_240", |b| {
        b.iter(|| {
            let mut candidate = harder.clone();
            mine_parallel(&mut candidate, &stop)
        });
    });
}

fn bench_merkle(c: &mut Criterion) {
    let txs = sample_txs(900);
    c.bench_function("merkle_root_900_txs", |b| b.iter(|| merkle_root(&txs)));
}

criterion_group!(benches, bench_pow, bench_merkle);
criterion_main!(benches);
