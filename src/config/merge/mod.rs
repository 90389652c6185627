//! Config composition: source ordering and defaults.

pub mod policy;
pub mod service;

pub(crate) use policy as merge_policy;
