use std::hash::BuildHasher;
use std::hash::RandomState;

use arena_hash::GrowthPolicy;
use arena_hash::Insertion;
use arena_hash::TableBuilder;
use clap::Parser;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short = 'c', long = "target_capacity", default_value_t = 1000)]
    target_capacity: usize,

    /// Fraction of the capacity to fill, between 0 and 1.
    #[arg(short = 'l', long = "load", default_value_t = 1.0)]
    load: f64,

    /// Remove every n-th key after filling, to exercise the recycling list.
    #[arg(short = 'r', long = "remove_every")]
    remove_every: Option<u64>,
}

fn hash_key(key: &[u8]) -> u64 {
    // Seeded once per process so the callback stays a plain `fn` pointer.
    static STATE: std::sync::OnceLock<RandomState> = std::sync::OnceLock::new();
    STATE.get_or_init(RandomState::new).hash_one(key)
}

fn same_bytes(a: &[u8], b: &[u8]) -> bool {
    a == b
}

fn main() -> Result<(), arena_hash::Error> {
    let args = Args::parse();

    println!(
        "Creating table with target capacity: {}",
        args.target_capacity
    );

    let mut table = TableBuilder::new(8)
        .datum_size(8)
        .capacity(args.target_capacity)
        .growth(GrowthPolicy::Fixed)
        .hash_fn(hash_key)
        .equals_fn(same_bytes)
        .build()?;

    println!("Actual capacity: {}", table.capacity());
    println!("Buckets: {}", table.bucket_count());
    println!("Filling table with u64 keys...");

    let target = ((table.capacity() as f64) * args.load.clamp(0.0, 1.0)) as u64;
    for i in 0..target {
        match table.insert(&i.to_le_bytes(), &(i * i).to_le_bytes())? {
            Insertion::Inserted => {}
            other => panic!("key {i} was already present: {other:?}"),
        }
    }

    if let Some(step) = args.remove_every.filter(|step| *step > 0) {
        let mut removed = 0usize;
        for i in (0..target).step_by(step as usize) {
            if table.remove(&i.to_le_bytes())? {
                removed += 1;
            }
        }
        println!(
            "Removed {} keys, {} slots waiting for reuse",
            removed,
            table.recycling()
        );
    }

    println!("Inserted {} keys into table", table.len());
    println!(
        "Final load factor: {:.2}%",
        (table.len() as f64 / table.capacity() as f64) * 100.0
    );

    table.debug_stats().print();
    table.print_chain_histogram();

    Ok(())
}
