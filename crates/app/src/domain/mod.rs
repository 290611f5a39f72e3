//! Orderly Domain Concerns

pub mod orders;
pub mod pagination;
