pub mod config;
pub mod engine;
pub mod filter;
pub mod markers;
pub mod renderer;
pub mod selection;
pub mod viewport;
pub mod visibility;

pub use engine::*;
