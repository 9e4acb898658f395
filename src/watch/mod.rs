mod watcher;

pub use watcher::*;
