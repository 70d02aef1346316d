//! Relationships module - relationship kinds, registry, and shared traits

pub mod many_to_many;
pub mod one_to_many;
pub mod one_to_one;
pub mod options;
pub mod registry;
pub mod traits;

pub(crate) mod cache;

// Re-export main types
pub use many_to_many::*;
pub use one_to_many::*;
pub use one_to_one::*;
pub use options::*;
pub use registry::*;
pub use traits::*;
