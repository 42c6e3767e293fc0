#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![no_std]

pub mod hash_table;
pub mod scramble;

pub use hash_table::Bucket;
pub use hash_table::HashTable;
pub use hash_table::Link;
pub use hash_table::Linked;
pub use hash_table::bucket_count_for_bytes;
