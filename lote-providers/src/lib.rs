//! Traits and implementations for provisioning trust anchors from Lists of Trusted Entities.

pub mod anchor_source;
pub mod attestation;
pub mod caching;
pub mod chain_trust;
pub mod common_models;
pub mod trusted_list;
pub mod verification;
