//! Simple wrapper around various hash options to provide a single enum which can calculate
//! different hashes.

use alloc::vec::Vec;

use bitcoin_hashes::Hash;
use bitcoin_hashes::HashEngine as _;
use bitcoin_hashes::sha1::Hash as Sha1;
use bitcoin_hashes::sha256::Hash as Sha256;
use bitcoin_hashes::sha384::Hash as Sha384;

pub(crate) enum Hasher {
	Sha1(<Sha1 as Hash>::Engine),
	Sha256(<Sha256 as Hash>::Engine),
	Sha384(<Sha384 as Hash>::Engine),
}

pub(crate) enum HashResult {
	Sha1(Sha1),
	Sha256(Sha256),
	Sha384(Sha384),
}

impl AsRef<[u8]> for HashResult {
	fn as_ref(&self) -> &[u8] {
		match self {
			HashResult::Sha1(hash) => hash.as_ref(),
			HashResult::Sha256(hash) => hash.as_ref(),
			HashResult::Sha384(hash) => hash.as_ref(),
		}
	}
}

impl Hasher {
	pub(crate) fn sha1() -> Hasher { Hasher::Sha1(Sha1::engine()) }
	pub(crate) fn sha256() -> Hasher { Hasher::Sha256(Sha256::engine()) }
	pub(crate) fn sha384() -> Hasher { Hasher::Sha384(Sha384::engine()) }

	pub(crate) fn update(&mut self, buf: &[u8]) {
		match self {
			Hasher::Sha1(hasher) => hasher.input(buf),
			Hasher::Sha256(hasher) => hasher.input(buf),
			Hasher::Sha384(hasher) => hasher.input(buf),
		}
	}

	pub(crate) fn finish(self) -> HashResult {
		match self {
			Hasher::Sha1(hasher) => HashResult::Sha1(Sha1::from_engine(hasher)),
			Hasher::Sha256(hasher) => HashResult::Sha256(Sha256::from_engine(hasher)),
			Hasher::Sha384(hasher) => HashResult::Sha384(Sha384::from_engine(hasher)),
		}
	}
}

/// Computes the RFC 5155 section 5 NSEC3 hash of an already-canonicalized wire-format name.
///
/// The first round hashes `name | salt`, each of the `iterations` further rounds hashes the
/// previous digest followed by the salt.
pub(crate) fn nsec3_hash(wire_name: &[u8], salt: &[u8], iterations: u16) -> Vec<u8> {
	let mut hasher = Hasher::sha1();
	hasher.update(wire_name);
	hasher.update(salt);
	let mut res = hasher.finish();
	for _ in 0..iterations {
		let mut hasher = Hasher::sha1();
		hasher.update(res.as_ref());
		hasher.update(salt);
		res = hasher.finish();
	}
	res.as_ref().to_vec()
}
