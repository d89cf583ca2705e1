//! Foundation crate: small, well-tested primitives only.

pub mod bounds;
pub mod coords;
pub mod handles;
pub mod time;

pub use bounds::*;
pub use coords::*;
pub use handles::*;
pub use time::*;
