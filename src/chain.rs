//! The top-down walk from the trust anchors to a zone's DNSKEY set.
//!
//! Starting at the root, each level fetches the DNSKEY RRset, keeps the keys vouched for by a DS
//! (configured or validated from the parent), and then descends one label at a time fetching DS
//! records until either a DS set is found, a denial proof shows the delegation is unsigned, or the
//! target zone is reached.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;

use tracing::{debug, trace};

use crate::anchors::TrustAnchors;
use crate::denial::{prove_denial, DenialState};
use crate::engine::KeyEngine;
use crate::oracle::{FetchError, RecordOracle};
use crate::rr::*;
use crate::rrset::harvest;
use crate::ser::signed_data;
use crate::validation::{keys_by_tag, validate_rrsets, verify_signature, KeySet, ValidationState};

/// The DNSKEY RRset at a walk position, split up for validation.
struct DnsKeyAnswer {
	/// Every DNSKEY at the position, before any DS matching.
	tentative: KeySet,
	/// Signatures over the DNSKEY RRset.
	sigs: Vec<RRSig>,
	/// The DNSKEY records, with lowercased owners, for building signed data.
	to_sign: Vec<RR>,
}

fn fetch_dnskeys<O: RecordOracle + ?Sized>(oracle: &mut O, qname: &Name)
-> Result<DnsKeyAnswer, FetchError> {
	let mut answer = DnsKeyAnswer { tentative: KeySet::new(), sigs: Vec::new(), to_sign: Vec::new() };
	for record in oracle.get(qname, DnsKey::TYPE)? {
		if !record.name().eq_ignore_case(qname) {
			trace!(%qname, owner = %record.name(), "ignoring DNSKEY answer record at another name");
			continue;
		}
		match record {
			RR::RRSig(sig) if sig.ty == DnsKey::TYPE => answer.sigs.push(sig),
			RR::DnsKey(mut key) => {
				// The same key may come back under several owner casings
				key.name = key.name.to_ascii_lowercase();
				answer.tentative.insert(key.clone());
				answer.to_sign.push(RR::DnsKey(key));
			},
			_ => {},
		}
	}
	Ok(answer)
}

/// The mutable state of one [`get_keys_for`] call.
struct WalkState {
	state: ValidationState,
	/// The current walk position.
	qname: Name,
	/// Labels of the target zone not yet walked, most-specific first.
	pending_labels: Vec<String>,
	/// DS records for `qname`, keyed by key tag.
	ds_map: BTreeMap<u16, Vec<DS>>,
	valid_keys: KeySet,
}

impl WalkState {
	fn new(zone: &Name) -> Self {
		WalkState {
			state: ValidationState::Secure,
			qname: Name::root(),
			pending_labels: zone.labels().into_iter().map(String::from).collect(),
			ds_map: BTreeMap::new(),
			valid_keys: KeySet::new(),
		}
	}

	fn add_ds(&mut self, ds: DS) {
		let tag_entries = self.ds_map.entry(ds.key_tag).or_default();
		if !tag_entries.contains(&ds) {
			tag_entries.push(ds);
		}
	}

	/// Gets the keys in `tentative` which match a DS in the DS map.
	fn ds_valid_keys(&self, tentative: &KeySet) -> KeySet {
		let mut valid = KeySet::new();
		for key in tentative.iter() {
			let tag = key.key_tag();
			for ds in self.ds_map.get(&tag).map(|v| &v[..]).unwrap_or(&[]) {
				let matches = key.to_ds(ds.digest_type).is_some_and(|computed|
					computed.key_tag == ds.key_tag && computed.alg == ds.alg &&
					computed.digest == ds.digest);
				trace!(qname = %self.qname, key_tag = tag, digest_type = ds.digest_type, matches,
					"checked DNSKEY against DS");
				if matches {
					valid.insert(key.clone());
					break;
				}
			}
		}
		valid
	}
}

/// Returns true if one of the DNSKEY RRset's signatures validates under one of `valid_keys`.
fn dnskeys_self_signed<E: KeyEngine + ?Sized>(
	answer: &DnsKeyAnswer, valid_keys: &KeySet, engine: &E, now: u64,
) -> bool {
	for sig in answer.sigs.iter() {
		let message = match signed_data(sig, &answer.to_sign) {
			Ok(message) => message,
			Err(()) => continue,
		};
		for key in keys_by_tag(valid_keys, sig.key_tag) {
			if verify_signature(engine, sig, key, &message, now) {
				trace!(owner = %sig.name, key_tag = sig.key_tag, "DNSKEY RRset signed by a DS-matched key");
				return true;
			}
		}
	}
	false
}

/// Walks from the root down to `zone`, returning its validation state and, if it is
/// [`ValidationState::Secure`], the validated DNSKEYs of `zone`.
///
/// Trust starts from the DS records in `anchors`. At every zone cut between the root and `zone`
/// the DNSKEY RRset is fetched and admitted only if one of its keys matches a DS record, with
/// the rest of the set admitted too if a matching key signed it. DS records for the next zone
/// cut must then be signed by those keys.
///
/// The result is:
///  * [`ValidationState::Secure`] with the key set of `zone` if the chain reaches it,
///  * [`ValidationState::Insecure`] with no keys if a validated NSEC3 proves some delegation on
///    the way has no DS records,
///  * [`ValidationState::Bogus`] with no keys if some level ends up with no valid keys.
///
/// Failures of the `oracle` are passed through rather than turned into a validation state.
pub fn get_keys_for<O: RecordOracle + ?Sized, E: KeyEngine + ?Sized>(
	oracle: &mut O, zone: &Name, anchors: &TrustAnchors, engine: &E, now: u64,
) -> Result<(ValidationState, KeySet), FetchError> {
	let mut walk = WalkState::new(zone);

	while zone.is_part_of(&walk.qname) {
		for ds in anchors.get(&walk.qname) {
			walk.add_ds(ds.clone());
		}

		let answer = fetch_dnskeys(oracle, &walk.qname)?;
		walk.valid_keys = walk.ds_valid_keys(&answer.tentative);
		debug!(qname = %walk.qname, tentative = answer.tentative.len(),
			ds_valid = walk.valid_keys.len(), signatures = answer.sigs.len(), "fetched DNSKEYs");

		if walk.valid_keys.len() < answer.tentative.len() &&
			dnskeys_self_signed(&answer, &walk.valid_keys, engine, now)
		{
			walk.valid_keys = answer.tentative.clone();
			debug!(qname = %walk.qname, keys = walk.valid_keys.len(), "admitted full DNSKEY set");
		}

		if walk.valid_keys.is_empty() {
			debug!(qname = %walk.qname, "no valid DNSKEYs");
			walk.state = ValidationState::Bogus;
			break;
		}

		if walk.qname.eq_ignore_case(zone) {
			debug!(%zone, keys = walk.valid_keys.len(), "reached zone");
			return Ok((ValidationState::Secure, walk.valid_keys));
		}

		// Descend until we find the next zone cut (or run out of labels)
		loop {
			let next = walk.pending_labels.pop()
				.and_then(|label| walk.qname.prepend_label(&label).ok());
			debug_assert!(next.is_some(), "{} is not below {}", zone, walk.qname);
			walk.qname = match next {
				Some(next) => next,
				None => return Ok((ValidationState::Indeterminate, KeySet::new())),
			};
			walk.ds_map.clear();

			let rrsets = harvest(&oracle.get(&walk.qname, DS::TYPE)?);
			let validated = validate_rrsets(&rrsets, &walk.valid_keys, engine, now);
			let ds_records = validated.iter()
				.filter(|((owner, ty), _)| *ty == DS::TYPE && owner.eq_ignore_case(&walk.qname))
				.flat_map(|(_, rrset)| rrset.records.iter())
				.filter_map(|rr| if let RR::DS(ds) = rr { Some(ds.clone()) } else { None })
				.collect::<Vec<_>>();
			for ds in ds_records {
				walk.add_ds(ds);
			}
			trace!(qname = %walk.qname, fetched = rrsets.len(), validated = validated.len(),
				ds = walk.ds_map.values().map(|v| v.len()).sum::<usize>(), "fetched DS");

			if walk.ds_map.is_empty() &&
				prove_denial(&validated, &walk.qname, DS::TYPE) == DenialState::Insecure
			{
				debug!(qname = %walk.qname, "DS denial proves the delegation is unsigned");
				return Ok((ValidationState::Insecure, KeySet::new()));
			}

			if !walk.ds_map.is_empty() || walk.pending_labels.is_empty() { break; }
		}
	}

	debug!(%zone, state = %walk.state, "walk ended");
	Ok((walk.state, KeySet::new()))
}

/// Walks to `zone` as [`get_keys_for`] does, using the current process-wide trust anchor
/// snapshot, [`crate::engine::RingKeyEngine`] and the system clock.
///
/// The snapshot is acquired once, so a concurrent
/// [`install_snapshot`](crate::anchors::install_snapshot) does not affect this call.
#[cfg(all(feature = "std", feature = "validation"))]
pub fn validate<O: RecordOracle + ?Sized>(zone: &Name, oracle: &mut O)
-> Result<(ValidationState, KeySet), FetchError> {
	let snapshot = crate::anchors::acquire_snapshot();
	trace!(%zone, anchors_version = snapshot.version, "validating");
	get_keys_for(oracle, zone, &snapshot.anchors, &crate::engine::RingKeyEngine,
		crate::validation::unix_now())
}
