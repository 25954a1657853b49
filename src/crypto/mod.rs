//! Hashing used by the validator itself.
//!
//! Signature verification is delegated to a [`crate::engine::KeyEngine`], but DS digests and NSEC3
//! owner hashes are part of the chain-of-trust logic and are always computed here. rust-bitcoin's
//! `bitcoin_hashes` crate does what we need without any unnecessary dependencies and with a very
//! conservative MSRV policy, so we use it for our hashing needs.

pub mod hash;
