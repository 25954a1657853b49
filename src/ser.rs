//! Canonical serialization logic lives here
//!
//! Record parsing off the wire is left to the caller; we only ever need to re-build the canonical
//! forms which signatures and digests are computed over.

use alloc::vec::Vec;

use crate::crypto::hash::Hasher;
use crate::rr::*;

pub(crate) trait Writer { fn write(&mut self, buf: &[u8]); }
impl Writer for Vec<u8> { fn write(&mut self, buf: &[u8]) { self.extend_from_slice(buf); } }
impl Writer for Hasher { fn write(&mut self, buf: &[u8]) { self.update(buf); } }
pub(crate) fn write_name<W: Writer>(out: &mut W, name: &str) {
	let canonical_name = name.to_ascii_lowercase();
	if canonical_name == "." {
		out.write(&[0]);
	} else {
		for label in canonical_name.split(".") {
			out.write(&(label.len() as u8).to_be_bytes());
			out.write(label.as_bytes());
		}
	}
}
pub(crate) fn name_len(name: &Name) -> u16 {
	if name.as_str() == "." {
		1
	} else {
		let mut res = 0;
		for label in name.split(".") {
			res += 1 + label.len();
		}
		res as u16
	}
}

/// Writes the RRSIG RDATA fields which precede the signature itself.
pub(crate) fn write_rrsig_header(out: &mut Vec<u8>, sig: &RRSig) {
	out.extend_from_slice(&sig.ty.to_be_bytes());
	out.extend_from_slice(&sig.alg.to_be_bytes());
	out.extend_from_slice(&sig.labels.to_be_bytes());
	out.extend_from_slice(&sig.orig_ttl.to_be_bytes());
	out.extend_from_slice(&sig.expiration.to_be_bytes());
	out.extend_from_slice(&sig.inception.to_be_bytes());
	out.extend_from_slice(&sig.key_tag.to_be_bytes());
	write_name(out, &sig.key_name);
}

/// Writes an NSEC/NSEC3 type bitmap (RFC 4034 section 4.1.2) for the given types.
pub(crate) fn write_type_bitmap(out: &mut Vec<u8>, types: &[u16]) {
	let mut types = types.to_vec();
	types.sort_unstable();
	types.dedup();

	let mut idx = 0;
	while idx < types.len() {
		let window = (types[idx] >> 8) as u8;
		let mut bitmap = [0u8; 32];
		let mut bitmap_len = 0;
		while idx < types.len() && (types[idx] >> 8) as u8 == window {
			let low = (types[idx] & 0xff) as usize;
			bitmap[low / 8] |= 0x80 >> (low % 8);
			bitmap_len = low / 8 + 1;
			idx += 1;
		}
		out.extend_from_slice(&[window, bitmap_len as u8]);
		out.extend_from_slice(&bitmap[..bitmap_len]);
	}
}

/// Builds the data which `sig` signs over (RFC 4034 section 3.1.8.1) for the given records.
///
/// Records are written in canonical order, with duplicates removed. Fails if any record is not of
/// the type `sig` covers or has fewer labels than `sig` claims.
pub(crate) fn signed_data<'a, RR: Record + 'a, I>(sig: &RRSig, records: I) -> Result<Vec<u8>, ()>
where I: IntoIterator<Item = &'a RR> {
	let mut signed_data = Vec::with_capacity(2048);
	write_rrsig_header(&mut signed_data, sig);

	let mut rdatas = Vec::new();
	for record in records {
		if sig.ty != record.ty() { return Err(()); }
		let mut rdata = Vec::new();
		record.write_u16_len_prefixed_data(&mut rdata);
		rdatas.push((record.name(), rdata));
	}
	// Canonical RR ordering sorts by RDATA, ignoring the length prefix.
	rdatas.sort_unstable_by(|(_, a), (_, b)| a[2..].cmp(&b[2..]));
	rdatas.dedup_by(|(_, a), (_, b)| a == b);

	for (name, rdata) in rdatas {
		let periods = name.as_str().chars().filter(|c| *c == '.').count();
		let labels = sig.labels.into();
		if periods != 1 && periods != labels {
			if periods < labels { return Err(()); }
			let signed_name = name.as_str().splitn(periods - labels + 1, ".").last();
			debug_assert!(signed_name.is_some());
			if let Some(name) = signed_name {
				signed_data.extend_from_slice(b"\x01*");
				write_name(&mut signed_data, name);
			} else { return Err(()); }
		} else {
			write_name(&mut signed_data, name);
		}
		signed_data.extend_from_slice(&sig.ty.to_be_bytes());
		signed_data.extend_from_slice(&1u16.to_be_bytes()); // The INternet class
		signed_data.extend_from_slice(&sig.orig_ttl.to_be_bytes());
		signed_data.extend_from_slice(&rdata);
	}
	Ok(signed_data)
}
