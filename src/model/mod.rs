mod entry;
mod query;
mod revision;

pub use entry::*;
pub use query::*;
pub use revision::*;
