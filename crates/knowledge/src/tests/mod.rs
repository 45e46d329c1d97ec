//! Crate-level tests that span the index, retrieval and answer modules.

pub(crate) mod fixtures;
