mod memory_store;
mod versioned_store;

pub use memory_store::*;
pub use versioned_store::*;

#[cfg(test)]
mod memory_store_test;
