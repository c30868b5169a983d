pub mod pacer;

pub use pacer::{Pacer, SystemPacer, VirtualPacer};
