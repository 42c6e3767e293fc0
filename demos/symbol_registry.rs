//! A tiny interned-symbol registry: the slab owns the symbols, the table is
//! only an index over them.

use std::collections::hash_map::DefaultHasher;
use std::hash::Hash;
use std::hash::Hasher;

use stitch_hash::Bucket;
use stitch_hash::HashTable;
use stitch_hash::Link;
use stitch_hash::Linked;
use stitch_hash::bucket_count_for_bytes;

struct Symbol {
    name: &'static str,
    uses: u32,
    link: Link,
}

impl Linked for Symbol {
    fn link(&self) -> &Link {
        &self.link
    }

    fn link_mut(&mut self) -> &mut Link {
        &mut self.link
    }
}

fn hash_name(name: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    hasher.finish()
}

fn intern(
    table: &mut HashTable<Vec<Bucket>>,
    slots: &mut Vec<Symbol>,
    name: &'static str,
) -> usize {
    let hash = hash_name(name);
    if let Some((handle, _)) = table.search(slots, hash).find(|(_, sym)| sym.name == name) {
        return handle;
    }

    let handle = slots.len();
    slots.push(Symbol {
        name,
        uses: 0,
        link: Link::new(),
    });
    table.insert(slots, handle, hash);
    handle
}

fn main() {
    // Size the bucket array from a byte budget, rounded up to a power of
    // two so the shift indexing policy applies.
    let budget = 128;
    let count = bucket_count_for_bytes(budget).next_power_of_two();
    let shift = count.trailing_zeros();
    println!("{budget} bytes of buckets -> {count} buckets (shift {shift})");

    let mut table = HashTable::with_shift(vec![Bucket::EMPTY; count], shift);
    let mut slots: Vec<Symbol> = Vec::new();

    let program = [
        "let", "x", "be", "x", "plus", "one", "let", "y", "be", "x", "times", "x",
    ];
    for word in program {
        let handle = intern(&mut table, &mut slots, word);
        slots[handle].uses += 1;
    }

    println!(
        "{} words interned to {} symbols: {table:?}",
        program.len(),
        slots.len()
    );

    for (handle, sym) in table.iter(&slots) {
        println!("  [{handle}] {:<5} used {}x", sym.name, sym.uses);
    }

    // The table got crowded; rebuild it over four times the storage. The
    // slab does not move and no hash is recomputed.
    let mut grown = HashTable::with_shift(vec![Bucket::EMPTY; count * 4], shift + 2);
    table.rehash_into(&mut grown, &mut slots);
    println!("after rehash: {grown:?} (old table empty: {})", table.is_empty());

    let handle = intern(&mut grown, &mut slots, "x");
    println!("\"x\" still resolves to handle {handle} after the move");
}
