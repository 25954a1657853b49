//! DNSSEC lets a resolver prove that the records it hands out are the ones the zone owner
//! published, by chaining signatures from a small set of configured trust anchors (in practice
//! the root zone's keys) down through each delegation.
//!
//! This crate implements the core of that proof: given a zone name and an oracle able to fetch
//! DNSKEY and DS records, [`chain::get_keys_for`] walks from the root to the zone and establishes
//! whether the zone is provably [`Secure`](validation::ValidationState::Secure) (returning its
//! validated DNSKEYs), provably [`Insecure`](validation::ValidationState::Insecure) (an NSEC3
//! proof shows some delegation on the way is unsigned) or
//! [`Bogus`](validation::ValidationState::Bogus).
//!
//! The building blocks are exposed as well:
//!  * [`rrset::harvest`] groups fetched records into RRsets alongside their signatures,
//!  * [`validation::validate_rrsets`] keeps only the RRsets signed by a set of trusted keys,
//!  * [`denial::prove_denial`] evaluates NSEC3 records for a name and type.
//!
//! It is no-std (but requires `alloc`). Signature verification goes through the
//! [`engine::KeyEngine`] trait, and the included features are:
//!  * `validation` (default) provides [`engine::RingKeyEngine`], verifying signatures with
//!    `ring`.
//!  * `std` (default) provides the system clock and a process-wide, atomically-replaceable
//!    [`anchors::TrustAnchorStore`], along with [`chain::validate`] which uses both.
//!
//! Decisions made during the walk are logged through `tracing`; no subscriber is installed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]

#![cfg_attr(not(feature = "std"), no_std)]
extern crate alloc;

pub mod rr;
mod ser;
mod base32;
mod crypto;

pub mod engine;
pub mod oracle;
pub mod rrset;
pub mod validation;
pub mod denial;
pub mod anchors;
pub mod chain;

#[cfg(all(test, feature = "validation"))]
mod test;

pub use anchors::TrustAnchors;
pub use chain::get_keys_for;
#[cfg(all(feature = "std", feature = "validation"))]
pub use chain::validate;
pub use denial::{prove_denial, DenialState};
pub use oracle::{FetchError, RecordOracle};
pub use validation::{validate_rrsets, KeySet, ValidationState};
