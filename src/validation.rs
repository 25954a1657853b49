//! Signature checking and RRset validation against a set of trusted keys.

use alloc::collections::BTreeSet;
use core::fmt;

use tracing::trace;

use crate::engine::KeyEngine;
use crate::rr::*;
use crate::rrset::RRsetMap;
use crate::ser::signed_data;

/// The DNSSEC validation state of some data (RFC 4033 section 5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValidationState {
	/// Nothing conclusive could be established.
	///
	/// Callers should treat this the same as [`Self::Insecure`].
	Indeterminate,
	/// The data failed to validate even though a chain of trust says it must. It must not be
	/// served.
	Bogus,
	/// The data is provably not covered by DNSSEC.
	Insecure,
	/// The data is authenticated by a chain of trust from a trust anchor.
	Secure,
}
impl fmt::Display for ValidationState {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(match self {
			ValidationState::Indeterminate => "Indeterminate",
			ValidationState::Bogus => "Bogus",
			ValidationState::Insecure => "Insecure",
			ValidationState::Secure => "Secure",
		})
	}
}

/// A set of [`DnsKey`]s, ordered and de-duplicated by their full contents.
pub type KeySet = BTreeSet<DnsKey>;

fn resolve_time(time: u32) -> u64 {
	// RFC 2065 was published in January 1997, so we arbitrarily use that as a cutoff and assume
	// any timestamps before then are actually past 2106 instead.
	// We ignore leap years for simplicity.
	if time < 60*60*24*365*27 {
		(time as u64) + (u32::MAX as u64)
	} else {
		time.into()
	}
}

/// Gets the current UNIX time from the system clock.
#[cfg(feature = "std")]
pub fn unix_now() -> u64 {
	std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs()).unwrap_or(0)
}

/// Checks whether `sig` is a valid signature by `key` over `message` at UNIX time `now`.
///
/// The signature must be strictly inside its validity window. Any failure from the `engine`
/// (unsupported algorithm, malformed key, mismatched signature) results in `false`.
pub fn verify_signature<E: KeyEngine + ?Sized>(
	engine: &E, sig: &RRSig, key: &DnsKey, message: &[u8], now: u64,
) -> bool {
	if resolve_time(sig.inception) >= now || resolve_time(sig.expiration) <= now {
		trace!(owner = %sig.name, ty = sig.ty, key_tag = sig.key_tag,
			inception = sig.inception, expiration = sig.expiration, now,
			"signature is expired or not yet valid");
		return false;
	}
	match engine.verify(key.alg, &key.pubkey, message, &sig.signature) {
		Ok(()) => true,
		Err(e) => {
			trace!(owner = %sig.name, ty = sig.ty, key_tag = sig.key_tag, error = %e,
				"signature did not verify");
			false
		},
	}
}

/// Gets the keys in `keys` whose tag is `tag`.
///
/// Only the tag is compared, so keys of any algorithm may be returned.
pub(crate) fn keys_by_tag<'a, I>(keys: I, tag: u16) -> impl Iterator<Item = &'a DnsKey>
where I: IntoIterator<Item = &'a DnsKey> {
	keys.into_iter().filter(move |key| key.key_tag() == tag)
}

/// Returns the RRsets in `rrsets` which carry at least one signature validating under one of
/// `keys` at UNIX time `now`.
///
/// Candidate keys for a signature are picked by key tag alone; the key's algorithm is not
/// compared to the signature's. The first signature/key pair which validates admits the whole
/// RRset unchanged. RRsets which do not validate are simply left out.
pub fn validate_rrsets<E: KeyEngine + ?Sized>(
	rrsets: &RRsetMap, keys: &KeySet, engine: &E, now: u64,
) -> RRsetMap {
	let mut validated = RRsetMap::new();
	for ((name, ty), rrset) in rrsets.iter() {
		'sigs: for sig in rrset.signatures.iter() {
			let mut candidates = keys_by_tag(keys, sig.key_tag).peekable();
			if candidates.peek().is_none() {
				trace!(owner = %name, ty, key_tag = sig.key_tag, "no key provided for tag");
				continue;
			}
			let message = match signed_data(sig, &rrset.records) {
				Ok(message) => message,
				Err(()) => {
					trace!(owner = %name, ty, "could not build signed data for RRset");
					continue;
				},
			};
			for key in candidates {
				if verify_signature(engine, sig, key, &message, now) {
					trace!(owner = %name, ty, key_tag = sig.key_tag, "validated RRset");
					validated.insert((name.clone(), *ty), rrset.clone());
					break 'sigs;
				}
			}
		}
	}
	validated
}
