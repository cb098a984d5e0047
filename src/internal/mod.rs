//! Internal infrastructure not exposed in the public API.

mod tracker;

pub(crate) use tracker::ChainGuard;
