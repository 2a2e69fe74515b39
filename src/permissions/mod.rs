//! Permission model: capability sets and the per-principal cache.

mod cache;
mod set;

pub use cache::PermissionCache;
pub use set::{Capability, PermissionSet};
