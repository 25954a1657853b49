//! Shared fixtures for building signed zones in tests.
//!
//! Keys are deterministic Ed25519 keys derived from a one-byte seed, so every run signs the same
//! data the same way.

mod chain;

use alloc::collections::BTreeMap;
use alloc::vec;
use alloc::vec::Vec;
use alloc::string::String;

use ring::signature::{Ed25519KeyPair, KeyPair};

use crate::oracle::{FetchError, RecordOracle};
use crate::rr::*;
use crate::ser::signed_data;

pub(crate) const INCEPTION: u32 = 1_700_000_000;
pub(crate) const EXPIRATION: u32 = 1_800_000_000;
pub(crate) const NOW: u64 = 1_750_000_000;

pub(crate) struct SigningKey {
	keypair: Ed25519KeyPair,
	pub(crate) dnskey: DnsKey,
}

impl SigningKey {
	pub(crate) fn new(zone: &str, flags: u16, seed: u8) -> Self {
		let keypair = Ed25519KeyPair::from_seed_unchecked(&[seed; 32]).unwrap();
		let dnskey = DnsKey {
			name: zone.try_into().unwrap(), flags, protocol: 3, alg: 15,
			pubkey: keypair.public_key().as_ref().to_vec(),
		};
		SigningKey { keypair, dnskey }
	}
	pub(crate) fn ksk(zone: &str, seed: u8) -> Self { Self::new(zone, 257, seed) }
	pub(crate) fn zsk(zone: &str, seed: u8) -> Self { Self::new(zone, 256, seed) }

	pub(crate) fn ds(&self) -> DS { self.dnskey.to_ds(2).unwrap() }

	pub(crate) fn sign_raw(&self, data: &[u8]) -> Vec<u8> {
		self.keypair.sign(data).as_ref().to_vec()
	}

	pub(crate) fn sign(&self, records: &[RR]) -> RRSig {
		self.sign_with_window(records, INCEPTION, EXPIRATION)
	}

	pub(crate) fn sign_with_window(&self, records: &[RR], inception: u32, expiration: u32) -> RRSig {
		let name = records[0].name().clone();
		let mut sig = RRSig {
			labels: name.labels().len() as u8, name, ty: records[0].ty(), alg: self.dnskey.alg,
			orig_ttl: 3600, expiration, inception, key_tag: self.dnskey.key_tag(),
			key_name: self.dnskey.name.clone(), signature: Vec::new(),
		};
		let data = signed_data(&sig, records).unwrap();
		sig.signature = self.sign_raw(&data);
		sig
	}
}

/// Builds a copy of `key` claiming the lower algorithm `alg` while keeping the same key tag.
pub(crate) fn key_with_alg(key: &DnsKey, alg: u8) -> DnsKey {
	assert!(alg < key.alg);
	assert_eq!(key.pubkey.len() % 2, 0);
	let mut res = key.clone();
	res.alg = alg;
	// Appending the 16-bit word (old alg - new alg) restores the key tag sum
	res.pubkey.extend_from_slice(&[0, key.alg - alg]);
	res
}

/// A signed zone: its keys and the DNSKEY RRset plus signatures an oracle would return.
pub(crate) struct Zone {
	pub(crate) ksk: SigningKey,
	pub(crate) zsk: SigningKey,
}

impl Zone {
	pub(crate) fn new(name: &str, seed: u8) -> Self {
		Zone { ksk: SigningKey::ksk(name, seed), zsk: SigningKey::zsk(name, seed.wrapping_add(100)) }
	}

	pub(crate) fn dnskeys(&self) -> Vec<RR> {
		vec![self.ksk.dnskey.clone().into(), self.zsk.dnskey.clone().into()]
	}

	/// The DNSKEY RRset, self-signed by the KSK.
	pub(crate) fn signed_dnskeys(&self) -> Vec<RR> {
		let mut res = self.dnskeys();
		res.push(self.ksk.sign(&self.dnskeys()).into());
		res
	}

	/// The given records plus a signature over them by this zone's ZSK.
	pub(crate) fn signed(&self, records: Vec<RR>) -> Vec<RR> {
		let sig = self.zsk.sign(&records);
		let mut res = records;
		res.push(sig.into());
		res
	}
}

/// An oracle answering from a fixed table, recording every query it is asked.
#[derive(Default)]
pub(crate) struct TestOracle {
	answers: BTreeMap<(String, u16), Vec<RR>>,
	failures: BTreeMap<(String, u16), FetchError>,
	pub(crate) queries: Vec<(Name, u16)>,
}

impl TestOracle {
	pub(crate) fn answer(&mut self, name: &str, ty: u16, records: Vec<RR>) {
		self.answers.insert((name.to_ascii_lowercase(), ty), records);
	}
	pub(crate) fn fail(&mut self, name: &str, ty: u16, err: FetchError) {
		self.failures.insert((name.to_ascii_lowercase(), ty), err);
	}
}

impl RecordOracle for TestOracle {
	fn get(&mut self, name: &Name, ty: u16) -> Result<Vec<RR>, FetchError> {
		self.queries.push((name.clone(), ty));
		let key = (name.as_str().to_ascii_lowercase(), ty);
		if let Some(err) = self.failures.get(&key) { return Err(err.clone()); }
		Ok(self.answers.get(&key).cloned().unwrap_or_default())
	}
}
