//! Container backends.

pub mod local;
pub mod memory;

pub use local::LocalContainer;
pub use memory::MemoryContainer;
