//! NSEC3 (RFC 5155) denial-of-existence proofs.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use tracing::trace;

use crate::base32;
use crate::crypto::hash::nsec3_hash;
use crate::rr::*;
use crate::rrset::RRsetMap;
use crate::ser::write_name;

/// The outcome of a denial-of-existence proof.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenialState {
	/// Nothing more specific could be shown. This is the default result.
	NoData,
	/// The name does not exist. Not currently produced by [`prove_denial`].
	NxDomain,
	/// The name is an empty non-terminal. Not currently produced by [`prove_denial`].
	EmptyNonTerminal,
	/// A DS query was shown to have no answer at an unsigned delegation, so everything below it
	/// is insecure.
	Insecure,
}
impl fmt::Display for DenialState {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			DenialState::NoData => "nodata",
			DenialState::NxDomain => "nxdomain",
			DenialState::EmptyNonTerminal => "empty non-terminal",
			DenialState::Insecure => "insecure (no-DS proof)",
		})
	}
}

/// NSEC3 records with more hash iterations than this are ignored (RFC 9276 section 3.2).
pub const MAX_NSEC3_ITERATIONS: u16 = 500;

/// Gets the lowercase base32hex NSEC3 hash of `name` using the hash parameters of `nsec3`.
pub fn nsec3_owner_hash(name: &Name, nsec3: &NSec3) -> String {
	let mut wire_name = Vec::with_capacity(name.len() + 1);
	write_name(&mut wire_name, name);
	base32::encode(&nsec3_hash(&wire_name, &nsec3.salt, nsec3.hash_iterations))
}

/// Returns true if `hashed` lies strictly between `base` and `next` on the hash ring.
fn hash_covered(base: &str, next: &str, hashed: &str) -> bool {
	(hashed > base && hashed < next) ||
		// The last NSEC3 in a chain wraps around to the first
		(next < base && (hashed < next || hashed > base))
}

/// Tries to prove that `name`/`ty` has no data using the NSEC3 records in `rrsets`.
///
/// The records should already have been validated. Returns [`DenialState::Insecure`] for a DS
/// query if either an NSEC3 matching `name` does not list DS in its type bitmap, or an opt-out
/// NSEC3 covers `name`'s hash. Every other case is [`DenialState::NoData`].
///
/// `name` is hashed once per distinct (salt, iterations) pair. NSEC3s using a hash algorithm other
/// than SHA-1 or more than [`MAX_NSEC3_ITERATIONS`] iterations are skipped.
pub fn prove_denial(rrsets: &RRsetMap, name: &Name, ty: u16) -> DenialState {
	let mut hashes: BTreeMap<(&[u8], u16), String> = BTreeMap::new();

	// RRsetMap iterates in owner name order, so this walks the chain in (textual) hash order.
	let nsec3s = rrsets.iter()
		.filter(|((_, rrset_ty), _)| *rrset_ty == NSec3::TYPE)
		.flat_map(|((owner, _), rrset)| rrset.records.iter().map(move |rr| (owner, rr)))
		.filter_map(|(owner, rr)| if let RR::NSec3(nsec3) = rr { Some((owner, nsec3)) } else { None });

	for (owner, nsec3) in nsec3s {
		if nsec3.hash_algo != 1 {
			trace!(owner = %owner, hash_algo = nsec3.hash_algo, "skipping NSEC3 with unknown hash");
			continue;
		}
		if nsec3.hash_iterations > MAX_NSEC3_ITERATIONS {
			trace!(owner = %owner, iterations = nsec3.hash_iterations, "skipping NSEC3 with too many iterations");
			continue;
		}
		let base = owner.first_label().to_ascii_lowercase();
		let next = base32::encode(&nsec3.next_name_hash);
		let hashed = hashes.entry((&nsec3.salt[..], nsec3.hash_iterations))
			.or_insert_with(|| nsec3_owner_hash(name, nsec3));
		let hashed = hashed.as_str();
		trace!(%base, %next, %hashed, %name, "checking NSEC3");

		if hashed == base {
			if !nsec3.has_type(ty) {
				trace!(%name, ty, "NSEC3 proves the type is absent");
				if ty == DS::TYPE { return DenialState::Insecure; }
				return DenialState::NoData;
			}
		} else if hash_covered(&base, &next, hashed) {
			trace!(%name, opt_out = nsec3.opt_out(), "NSEC3 covers the name");
			if ty == DS::TYPE && nsec3.opt_out() { return DenialState::Insecure; }
		}
	}
	DenialState::NoData
}
