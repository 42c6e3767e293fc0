use core::hash::Hasher;
use core::hint::black_box;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use hashbrown::HashTable as HashbrownTable;
use rand::SeedableRng;
use rand::TryRngCore;
use rand::rngs::OsRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use siphasher::sip::SipHasher;
use stitch_hash::Bucket;
use stitch_hash::HashTable;
use stitch_hash::Link;
use stitch_hash::Linked;

struct Node {
    key: u64,
    link: Link,
}

impl Linked for Node {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

#[derive(Clone, Copy)]
struct HashState {
    k0: u64,
    k1: u64,
}

impl HashState {
    fn random() -> Self {
        let mut rng = OsRng;
        Self {
            k0: rng.try_next_u64().unwrap(),
            k1: rng.try_next_u64().unwrap(),
        }
    }

    fn hash(&self, key: u64) -> u64 {
        let mut h = SipHasher::new_with_keys(self.k0, self.k1);
        h.write_u64(key);
        h.finish()
    }
}

fn slab(n: usize) -> Vec<Node> {
    (0..n as u64)
        .map(|key| Node {
            key,
            link: Link::new(),
        })
        .collect()
}

fn filled_table(state: HashState, slots: &mut [Node], capacity: usize) -> HashTable<Vec<Bucket>> {
    let mut table = HashTable::with_shift(vec![Bucket::EMPTY; capacity], capacity.trailing_zeros());
    for handle in 0..slots.len() {
        let hash = state.hash(slots[handle].key);
        table.insert(slots, handle, hash);
    }
    table
}

const SIZES: &[usize] = &[1024, 65536];

fn bench_insert(c: &mut Criterion) {
    let state = HashState::random();
    let mut group = c.benchmark_group("insert");

    for &n in SIZES {
        group.throughput(Throughput::Elements(n as u64));

        group.bench_function(format!("stitch/{n}"), |b| {
            b.iter_batched(
                || {
                    let table = HashTable::with_shift(
                        vec![Bucket::EMPTY; n],
                        n.trailing_zeros(),
                    );
                    (table, slab(n))
                },
                |(mut table, mut slots)| {
                    for handle in 0..slots.len() {
                        let hash = state.hash(slots[handle].key);
                        table.insert(&mut slots, handle, hash);
                    }
                    black_box((table, slots))
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{n}"), |b| {
            b.iter_batched(
                || HashbrownTable::with_capacity(n),
                |mut table| {
                    for key in 0..n as u64 {
                        let hash = state.hash(key);
                        table.insert_unique(hash, key, |&k| state.hash(k));
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_search_hit(c: &mut Criterion) {
    let state = HashState::random();
    let mut group = c.benchmark_group("search_hit");

    for &n in SIZES {
        group.throughput(Throughput::Elements(n as u64));

        let mut order: Vec<u64> = (0..n as u64).collect();
        order.shuffle(&mut SmallRng::seed_from_u64(0x5711c4));

        let mut slots = slab(n);
        let table = filled_table(state, &mut slots, n);
        group.bench_function(format!("stitch/{n}"), |b| {
            b.iter(|| {
                let mut found = 0usize;
                for &key in &order {
                    let hash = state.hash(key);
                    if table.search(&slots, hash).any(|(_, node)| node.key == key) {
                        found += 1;
                    }
                }
                black_box(found)
            })
        });

        let mut baseline = HashbrownTable::with_capacity(n);
        for key in 0..n as u64 {
            baseline.insert_unique(state.hash(key), key, |&k| state.hash(k));
        }
        group.bench_function(format!("hashbrown/{n}"), |b| {
            b.iter(|| {
                let mut found = 0usize;
                for &key in &order {
                    let hash = state.hash(key);
                    if baseline.find(hash, |&k| k == key).is_some() {
                        found += 1;
                    }
                }
                black_box(found)
            })
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let state = HashState::random();
    let mut group = c.benchmark_group("remove");

    for &n in SIZES {
        group.throughput(Throughput::Elements(n as u64));

        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut SmallRng::seed_from_u64(0x5711c4));

        group.bench_function(format!("stitch/{n}"), |b| {
            b.iter_batched(
                || {
                    let mut slots = slab(n);
                    let table = filled_table(state, &mut slots, n);
                    (table, slots)
                },
                |(mut table, mut slots)| {
                    for &handle in &order {
                        table.remove(&mut slots, handle);
                    }
                    black_box((table, slots))
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("hashbrown/{n}"), |b| {
            b.iter_batched(
                || {
                    let mut table = HashbrownTable::with_capacity(n);
                    for key in 0..n as u64 {
                        table.insert_unique(state.hash(key), key, |&k| state.hash(k));
                    }
                    table
                },
                |mut table| {
                    for &handle in &order {
                        let key = handle as u64;
                        let hash = state.hash(key);
                        if let Ok(entry) = table.find_entry(hash, |&k| k == key) {
                            entry.remove();
                        }
                    }
                    black_box(table)
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

fn bench_rehash(c: &mut Criterion) {
    let state = HashState::random();
    let mut group = c.benchmark_group("rehash");

    for &n in SIZES {
        group.throughput(Throughput::Elements(n as u64));

        // Grow a crowded modulo table into power-of-two storage 4x the size.
        group.bench_function(format!("stitch/{n}"), |b| {
            b.iter_batched(
                || {
                    let mut slots = slab(n);
                    let mut table = HashTable::new(vec![Bucket::EMPTY; n / 4 + 1]);
                    for handle in 0..slots.len() {
                        let hash = state.hash(slots[handle].key);
                        table.insert(&mut slots, handle, hash);
                    }
                    let grown = HashTable::with_shift(
                        vec![Bucket::EMPTY; n],
                        n.trailing_zeros(),
                    );
                    (table, grown, slots)
                },
                |(mut table, mut grown, mut slots)| {
                    table.rehash_into(&mut grown, &mut slots);
                    black_box((table, grown, slots))
                },
                BatchSize::SmallInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_search_hit,
    bench_remove,
    bench_rehash
);
criterion_main!(benches);
