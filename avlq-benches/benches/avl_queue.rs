//! AVL-queue benchmarks: insertion, draining, and mixed churn.

use avlq::{AvlQueue, SortOrder};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const N: usize = 1_000;

fn random_keys(seed: u64) -> Vec<u64> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..N).map(|_| rng.gen_range(0..4_096)).collect()
}

fn filled_queue(keys: &[u64]) -> AvlQueue<u64> {
    let mut queue = AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap();
    for &key in keys {
        queue.insert(key, key).unwrap();
    }
    queue
}

fn bench_insert(c: &mut Criterion) {
    let keys = random_keys(7);
    c.bench_function("insert_1000_random_keys", |b| {
        b.iter_batched(
            || AvlQueue::new(SortOrder::Ascending, 0, 0).unwrap(),
            |mut queue| {
                for &key in &keys {
                    queue.insert(key, black_box(key)).unwrap();
                }
                queue
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_pop_head(c: &mut Criterion) {
    let keys = random_keys(11);
    c.bench_function("pop_head_1000", |b| {
        b.iter_batched(
            || filled_queue(&keys),
            |mut queue| {
                while !queue.is_empty() {
                    black_box(queue.pop_head());
                }
                queue
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_churn(c: &mut Criterion) {
    let keys = random_keys(13);
    c.bench_function("insert_remove_churn_1000", |b| {
        b.iter_batched(
            || filled_queue(&keys),
            |mut queue| {
                for &key in keys.iter().take(N / 2) {
                    let access_key = queue.insert(key, key).unwrap();
                    black_box(queue.remove(access_key));
                }
                queue
            },
            BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, bench_insert, bench_pop_head, bench_churn);
criterion_main!(benches);
