pub mod allocator;
pub mod netting;

pub use allocator::{CostAllocator, allocate};
pub use netting::{NettingEngine, compute_balances};
