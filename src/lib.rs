mod config;
mod errors;
mod model;
mod storage;
mod watch;

pub use config::*;
pub use errors::*;
pub use model::*;
pub use storage::*;
pub use watch::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;
