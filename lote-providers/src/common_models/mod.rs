//! Models shared across providers.

pub(crate) mod macros;

pub mod non_empty;
