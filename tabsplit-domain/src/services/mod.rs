pub mod apportion;
pub mod bill_summary;
pub mod charge_distributor;
pub mod split_allocator;

pub use bill_summary::summarize;
pub use charge_distributor::distribute;
pub use split_allocator::allocate;
