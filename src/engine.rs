//! The cryptographic verification seam.
//!
//! The chain walker never verifies signatures itself, it asks a [`KeyEngine`] and only interprets
//! whether that succeeded. Any failure (an unknown algorithm, a malformed key or a signature which
//! simply does not match) is treated identically by the validator: as a signature which does not
//! validate.

#[cfg(feature = "validation")]
use alloc::vec::Vec;

/// An error from a [`KeyEngine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CryptoError {
	/// The DNSSEC algorithm number is not one this engine supports.
	#[error("unsupported DNSSEC algorithm {0}")]
	UnsupportedAlgorithm(u8),
	/// The public key could not be decoded for the given algorithm.
	#[error("malformed public key")]
	MalformedKey,
	/// The signature did not verify against the key and message.
	#[error("signature did not verify")]
	InvalidSignature,
}

/// Something which can check a signature made by a DNSSEC public key.
pub trait KeyEngine {
	/// Verifies `signature` over `message` using the DNSKEY-encoded `public_key` for the DNSSEC
	/// algorithm number `alg`.
	fn verify(&self, alg: u8, public_key: &[u8], message: &[u8], signature: &[u8])
	-> Result<(), CryptoError>;
}

impl<E: KeyEngine + ?Sized> KeyEngine for &E {
	fn verify(&self, alg: u8, public_key: &[u8], message: &[u8], signature: &[u8])
	-> Result<(), CryptoError> {
		(**self).verify(alg, public_key, message, signature)
	}
}

/// A [`KeyEngine`] backed by `ring`.
///
/// Supports RSA/SHA-256 (8), RSA/SHA-512 (10), ECDSA P-256/SHA-256 (13), ECDSA P-384/SHA-384
/// (14) and Ed25519 (15).
#[cfg(feature = "validation")]
#[derive(Debug, Clone, Copy, Default)]
pub struct RingKeyEngine;

#[cfg(feature = "validation")]
pub(crate) fn bytes_to_rsa_pk<'a>(pubkey: &'a [u8])
-> Result<ring::signature::RsaPublicKeyComponents<&'a [u8]>, ()> {
	if pubkey.len() <= 3 { return Err(()); }

	let mut pos = 0;
	let exponent_length;
	if pubkey[0] == 0 {
		exponent_length = ((pubkey[1] as usize) << 8) | (pubkey[2] as usize);
		pos += 3;
	} else {
		exponent_length = pubkey[0] as usize;
		pos += 1;
	}

	if pubkey.len() <= pos + exponent_length { return Err(()); }
	Ok(ring::signature::RsaPublicKeyComponents {
		n: &pubkey[pos + exponent_length..],
		e: &pubkey[pos..pos + exponent_length]
	})
}

#[cfg(feature = "validation")]
impl KeyEngine for RingKeyEngine {
	fn verify(&self, alg: u8, public_key: &[u8], message: &[u8], signature: &[u8])
	-> Result<(), CryptoError> {
		use ring::signature;

		match alg {
			8|10 => {
				let alg = if alg == 8 {
					&signature::RSA_PKCS1_1024_8192_SHA256_FOR_LEGACY_USE_ONLY
				} else {
					&signature::RSA_PKCS1_1024_8192_SHA512_FOR_LEGACY_USE_ONLY
				};
				bytes_to_rsa_pk(public_key).map_err(|_| CryptoError::MalformedKey)?
					.verify(alg, message, signature)
					.map_err(|_| CryptoError::InvalidSignature)
			},
			13|14 => {
				let (alg, key_len) = if alg == 13 {
					(&signature::ECDSA_P256_SHA256_FIXED, 64)
				} else {
					(&signature::ECDSA_P384_SHA384_FIXED, 96)
				};
				if public_key.len() != key_len { return Err(CryptoError::MalformedKey); }

				// Add 0x4 identifier to the ECDSA pubkey as expected by ring.
				let mut key = Vec::with_capacity(public_key.len() + 1);
				key.push(0x4);
				key.extend_from_slice(public_key);

				signature::UnparsedPublicKey::new(alg, &key)
					.verify(message, signature)
					.map_err(|_| CryptoError::InvalidSignature)
			},
			15 => {
				if public_key.len() != 32 { return Err(CryptoError::MalformedKey); }
				signature::UnparsedPublicKey::new(&signature::ED25519, public_key)
					.verify(message, signature)
					.map_err(|_| CryptoError::InvalidSignature)
			},
			_ => Err(CryptoError::UnsupportedAlgorithm(alg)),
		}
	}
}
