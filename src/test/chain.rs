//! End-to-end walks over small signed hierarchies.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use super::*;

use crate::anchors::TrustAnchors;
use crate::base32;
use crate::chain::get_keys_for;
use crate::crypto::hash::nsec3_hash;
use crate::engine::RingKeyEngine;
use crate::oracle::FetchError;
use crate::rr::*;
use crate::ser::write_name;
use crate::validation::{KeySet, ValidationState};

fn q(name: &str, ty: u16) -> (Name, u16) {
	(name.try_into().unwrap(), ty)
}

fn keyset(keys: &[&SigningKey]) -> KeySet {
	keys.iter().map(|k| k.dnskey.clone()).collect()
}

/// `.` -> `com.` -> `example.com.`, each delegation carrying a DS for the child's KSK.
struct Hierarchy {
	root: Zone,
	com: Zone,
	example: Zone,
	anchors: TrustAnchors,
	oracle: TestOracle,
}

impl Hierarchy {
	fn new() -> Self {
		let root = Zone::new(".", 1);
		let com = Zone::new("com.", 2);
		let example = Zone::new("example.com.", 3);
		let mut oracle = TestOracle::default();
		oracle.answer(".", types::DNSKEY, root.signed_dnskeys());
		oracle.answer("com.", types::DS, root.signed(vec![com.ksk.ds().into()]));
		oracle.answer("com.", types::DNSKEY, com.signed_dnskeys());
		oracle.answer("example.com.", types::DS, com.signed(vec![example.ksk.ds().into()]));
		oracle.answer("example.com.", types::DNSKEY, example.signed_dnskeys());
		let anchors = TrustAnchors::empty().with_anchor(root.ksk.ds());
		Hierarchy { root, com, example, anchors, oracle }
	}

	fn walk(&mut self, zone: &str) -> Result<(ValidationState, KeySet), FetchError> {
		get_keys_for(&mut self.oracle, &zone.try_into().unwrap(), &self.anchors, &RingKeyEngine, NOW)
	}
}

/// Builds an NSEC3 in `zone` whose owner hash is `delta_base` away from the hash of `name` and
/// whose next hash is `delta_next` away from it.
fn nsec3_around(name: &str, zone: &str, delta_base: i8, delta_next: i8, flags: u8, types: Vec<u16>) -> NSec3 {
	let salt = vec![0xab, 0xcd];
	let mut wire_name = Vec::new();
	write_name(&mut wire_name, name);
	let hash = nsec3_hash(&wire_name, &salt, 5);
	// Adds `delta` to the big-endian hash, carrying as needed
	let shift = |delta: i8| {
		let mut res = hash.clone();
		let mut carry = i32::from(delta);
		for byte in res.iter_mut().rev() {
			let v = i32::from(*byte) + carry;
			*byte = v.rem_euclid(256) as u8;
			carry = v.div_euclid(256);
			if carry == 0 { break; }
		}
		res
	};
	NSec3 {
		name: format!("{}.{}", base32::encode(&shift(delta_base)), zone).try_into().unwrap(),
		hash_algo: 1, flags, hash_iterations: 5, salt,
		next_name_hash: shift(delta_next), types,
	}
}

#[test]
fn empty_root_is_bogus() {
	let mut oracle = TestOracle::default();
	let anchors = TrustAnchors::default();
	let res = get_keys_for(&mut oracle, &Name::root(), &anchors, &RingKeyEngine, NOW).unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
	assert_eq!(oracle.queries, vec![q(".", types::DNSKEY)]);
}

#[test]
fn root_zone_itself() {
	let mut h = Hierarchy::new();
	let res = h.walk(".").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.root.ksk, &h.root.zsk])));
	assert_eq!(h.oracle.queries, vec![q(".", types::DNSKEY)]);
}

#[test]
fn secure_chain() {
	let mut h = Hierarchy::new();
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.ksk, &h.example.zsk])));
	assert_eq!(h.oracle.queries, vec![
		q(".", types::DNSKEY),
		q("com.", types::DS), q("com.", types::DNSKEY),
		q("example.com.", types::DS), q("example.com.", types::DNSKEY),
	]);
}

#[test]
fn zone_name_case_is_ignored() {
	let mut h = Hierarchy::new();
	let (state, keys) = h.walk("Example.COM.").unwrap();
	assert_eq!(state, ValidationState::Secure);
	assert_eq!(keys, keyset(&[&h.example.ksk, &h.example.zsk]));
}

#[test]
fn mixed_case_signature_owner() {
	let mut h = Hierarchy::new();
	let mut ds = h.com.signed(vec![h.example.ksk.ds().into()]);
	if let Some(RR::RRSig(sig)) = ds.last_mut() {
		sig.name = "EXAMPLE.com.".try_into().unwrap();
	}
	h.oracle.answer("example.com.", types::DS, ds);
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.ksk, &h.example.zsk])));
}

#[test]
fn dnskeys_under_several_owner_casings() {
	let mut h = Hierarchy::new();
	let mut answer = h.example.signed_dnskeys();
	let mut upper_ksk = h.example.ksk.dnskey.clone();
	upper_ksk.name = "EXAMPLE.COM.".try_into().unwrap();
	answer.push(upper_ksk.into());
	h.oracle.answer("example.com.", types::DNSKEY, answer);
	let (state, keys) = h.walk("example.com.").unwrap();
	assert_eq!(state, ValidationState::Secure);
	assert_eq!(keys.len(), 2);
	assert_eq!(keys, keyset(&[&h.example.ksk, &h.example.zsk]));
}

#[test]
fn unsigned_dnskeys_with_ds_for_ksk() {
	let mut h = Hierarchy::new();
	h.oracle.answer("example.com.", types::DNSKEY, h.example.dnskeys());
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.ksk])));
}

#[test]
fn unsigned_dnskeys_with_ds_for_zsk() {
	let mut h = Hierarchy::new();
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![h.example.zsk.ds().into()]));
	h.oracle.answer("example.com.", types::DNSKEY, h.example.dnskeys());
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.zsk])));
}

#[test]
fn unsigned_dnskeys_cannot_vouch_for_zsk_signed_delegation() {
	// With only the KSK admitted at example.com., a DS for a child zone signed by the (unadmitted)
	// ZSK does not validate.
	let mut h = Hierarchy::new();
	let sub = Zone::new("sub.example.com.", 4);
	h.oracle.answer("example.com.", types::DNSKEY, h.example.dnskeys());
	h.oracle.answer("sub.example.com.", types::DS, h.example.signed(vec![sub.ksk.ds().into()]));
	h.oracle.answer("sub.example.com.", types::DNSKEY, sub.signed_dnskeys());
	let res = h.walk("sub.example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));

	// Once the DNSKEY RRset is self-signed, the ZSK is admitted and the delegation validates.
	h.oracle.answer("example.com.", types::DNSKEY, h.example.signed_dnskeys());
	let res = h.walk("sub.example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&sub.ksk, &sub.zsk])));
}

#[test]
fn opt_out_denial_is_insecure() {
	let mut h = Hierarchy::new();
	let nsec3 = nsec3_around("example.com.", "com.", -1, 1, 1, vec![types::NS]);
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![nsec3.into()]));
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Insecure, KeySet::new()));
	assert_eq!(h.oracle.queries.last(), Some(&q("example.com.", types::DS)));
}

#[test]
fn exact_match_denial_is_insecure() {
	let mut h = Hierarchy::new();
	let nsec3 = nsec3_around("example.com.", "com.", 0, 3, 0, vec![types::NS]);
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![nsec3.into()]));
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Insecure, KeySet::new()));
}

#[test]
fn covering_denial_without_opt_out_is_bogus() {
	let mut h = Hierarchy::new();
	let nsec3 = nsec3_around("example.com.", "com.", -1, 1, 0, vec![types::NS]);
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![nsec3.into()]));
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
}

#[test]
fn unvalidated_denial_is_ignored() {
	let mut h = Hierarchy::new();
	let nsec3 = nsec3_around("example.com.", "com.", -1, 1, 1, vec![types::NS]);
	// Signed by a key com. never published
	let rogue = SigningKey::zsk("com.", 77);
	let sig = rogue.sign(&[nsec3.clone().into()]);
	h.oracle.answer("example.com.", types::DS, vec![nsec3.into(), sig.into()]);
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
}

#[test]
fn bogus_stops_the_walk() {
	let mut h = Hierarchy::new();
	let other = SigningKey::ksk("com.", 99);
	h.oracle.answer("com.", types::DS, h.root.signed(vec![other.ds().into()]));
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
	assert_eq!(h.oracle.queries, vec![
		q(".", types::DNSKEY), q("com.", types::DS), q("com.", types::DNSKEY),
	]);
}

#[test]
fn expired_ds_signature_is_bogus() {
	let mut h = Hierarchy::new();
	let records: Vec<RR> = vec![h.example.ksk.ds().into()];
	let sig = h.com.zsk.sign_with_window(&records, INCEPTION, NOW as u32 - 1);
	h.oracle.answer("example.com.", types::DS, vec![records[0].clone(), sig.into()]);
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
}

#[test]
fn answer_order_does_not_matter() {
	use rand::seq::SliceRandom;
	for _ in 0..8 {
		let mut h = Hierarchy::new();
		let mut ds = h.com.signed(vec![
			h.example.ksk.ds().into(), h.example.ksk.dnskey.to_ds(4).unwrap().into(),
		]);
		ds.shuffle(&mut rand::rngs::OsRng);
		h.oracle.answer("example.com.", types::DS, ds);
		let mut dnskeys = h.example.signed_dnskeys();
		dnskeys.shuffle(&mut rand::rngs::OsRng);
		h.oracle.answer("example.com.", types::DNSKEY, dnskeys);
		let res = h.walk("example.com.").unwrap();
		assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.ksk, &h.example.zsk])));
	}
}

#[test]
fn fetch_errors_propagate() {
	let mut h = Hierarchy::new();
	let err = FetchError::Timeout { name: "com.".try_into().unwrap(), ty: types::DS };
	h.oracle.fail("com.", types::DS, err.clone());
	assert_eq!(h.walk("example.com."), Err(err));

	let mut h = Hierarchy::new();
	let err = FetchError::Other("connection refused".into());
	h.oracle.fail("example.com.", types::DNSKEY, err.clone());
	assert_eq!(h.walk("example.com."), Err(err));
}

#[test]
fn closure_oracle() {
	let h = Hierarchy::new();
	let mut calls = 0;
	let mut oracle = |name: &Name, ty: u16| -> Result<Vec<RR>, FetchError> {
		calls += 1;
		if name.is_root() && ty == types::DNSKEY { Ok(h.root.signed_dnskeys()) } else { Ok(Vec::new()) }
	};
	let res = get_keys_for(&mut oracle, &Name::root(), &h.anchors, &RingKeyEngine, NOW).unwrap();
	assert_eq!(res.0, ValidationState::Secure);
	assert_eq!(calls, 1);
}

#[test]
fn off_owner_dnskeys_are_ignored() {
	let mut h = Hierarchy::new();
	// A key the parent does vouch for, but returned at the wrong owner name
	let rogue = SigningKey::ksk("example.com.", 66);
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![rogue.ds().into()]));
	let mut injected = rogue.dnskey.clone();
	injected.name = "www.example.com.".try_into().unwrap();
	let mut answer = h.example.signed_dnskeys();
	answer.push(injected.into());
	h.oracle.answer("example.com.", types::DNSKEY, answer);
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));

	// The legitimate set is unaffected by extra off-owner records
	let mut h = Hierarchy::new();
	let mut answer = h.example.signed_dnskeys();
	let mut injected = rogue.dnskey.clone();
	injected.name = "evil.example.com.".try_into().unwrap();
	answer.push(injected.into());
	h.oracle.answer("example.com.", types::DNSKEY, answer);
	let (state, keys) = h.walk("example.com.").unwrap();
	assert_eq!(state, ValidationState::Secure);
	assert_eq!(keys, keyset(&[&h.example.ksk, &h.example.zsk]));
}

#[test]
fn non_zone_cut_labels_are_skipped() {
	let root = Zone::new(".", 1);
	let uk = Zone::new("uk.", 5);
	let example = Zone::new("example.co.uk.", 6);
	let mut oracle = TestOracle::default();
	oracle.answer(".", types::DNSKEY, root.signed_dnskeys());
	oracle.answer("uk.", types::DS, root.signed(vec![uk.ksk.ds().into()]));
	oracle.answer("uk.", types::DNSKEY, uk.signed_dnskeys());
	// co.uk. is not a zone cut, so it has no DS (and no denial we could use)
	oracle.answer("example.co.uk.", types::DS, uk.signed(vec![example.ksk.ds().into()]));
	oracle.answer("example.co.uk.", types::DNSKEY, example.signed_dnskeys());

	let anchors = TrustAnchors::empty().with_anchor(root.ksk.ds());
	let res = get_keys_for(&mut oracle, &"example.co.uk.".try_into().unwrap(), &anchors,
		&RingKeyEngine, NOW).unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&example.ksk, &example.zsk])));
	assert_eq!(oracle.queries, vec![
		q(".", types::DNSKEY),
		q("uk.", types::DS), q("uk.", types::DNSKEY),
		q("co.uk.", types::DS),
		q("example.co.uk.", types::DS), q("example.co.uk.", types::DNSKEY),
	]);
}

#[test]
fn running_out_of_labels_is_bogus() {
	let mut h = Hierarchy::new();
	h.oracle.answer("example.com.", types::DS, Vec::new());
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
	// The target's keys are still fetched, but nothing vouches for them
	assert_eq!(h.oracle.queries.last(), Some(&q("example.com.", types::DNSKEY)));
}

#[test]
fn anchors_below_the_root_are_merged() {
	// A configured DS for com. can vouch for a com. key the root does not
	let mut h = Hierarchy::new();
	let other = Zone::new("com.", 42);
	h.oracle.answer("com.", types::DNSKEY, other.signed_dnskeys());
	h.oracle.answer("example.com.", types::DS, other.signed(vec![h.example.ksk.ds().into()]));
	assert_eq!(h.walk("example.com.").unwrap().0, ValidationState::Bogus);

	h.anchors = h.anchors.clone().with_anchor(other.ksk.ds());
	let res = h.walk("example.com.").unwrap();
	assert_eq!(res, (ValidationState::Secure, keyset(&[&h.example.ksk, &h.example.zsk])));
}

#[test]
fn sha1_and_sha384_digests() {
	for digest_type in [1, 4] {
		let mut h = Hierarchy::new();
		let ds = h.example.ksk.dnskey.to_ds(digest_type).unwrap();
		h.oracle.answer("example.com.", types::DS, h.com.signed(vec![ds.into()]));
		assert_eq!(h.walk("example.com.").unwrap().0, ValidationState::Secure);
	}
}

#[test]
fn tampered_ds_digest_is_bogus() {
	let mut h = Hierarchy::new();
	let mut ds = h.example.ksk.ds();
	ds.digest[0] ^= 1;
	h.oracle.answer("example.com.", types::DS, h.com.signed(vec![ds.into()]));
	assert_eq!(h.walk("example.com.").unwrap(), (ValidationState::Bogus, KeySet::new()));
}

#[cfg(feature = "std")]
#[test]
fn validate_uses_process_anchors() {
	// The process-wide anchors are the real root KSKs, which our test root does not match.
	let mut h = Hierarchy::new();
	let res = crate::chain::validate(&"example.com.".try_into().unwrap(), &mut h.oracle).unwrap();
	assert_eq!(res, (ValidationState::Bogus, KeySet::new()));
	assert_eq!(h.oracle.queries, vec![q(".", types::DNSKEY)]);
}
