//! Resource Records are the fundamental type in the DNS - individual records mapping a name to
//! some data.
//!
//! This module holds the (already-decoded) record types the validator consumes. Records are never
//! mutated once built; validation only ever classifies them.

use alloc::vec::Vec;
use alloc::string::String;
use alloc::borrow::ToOwned;
use core::fmt;

use crate::crypto::hash::Hasher;
use crate::ser::*;

/// A valid domain name.
///
/// It must end with a ".", be no longer than 255 bytes, consist of only printable ASCII
/// characters and each label may be no longer than 63 bytes.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(String);
impl Name {
	/// Gets the root name, `.`.
	pub fn root() -> Name { Name(".".to_owned()) }
	/// Gets the underlying human-readable domain name
	pub fn as_str(&self) -> &str { &self.0 }
	/// Returns true if this is the root name, `.`.
	pub fn is_root(&self) -> bool { self.0 == "." }
	/// Gets the labels of this name, most-specific first, not including the empty root label.
	pub fn labels(&self) -> Vec<&str> {
		if self.is_root() { return Vec::new(); }
		self.0[..self.0.len() - 1].split('.').collect()
	}
	/// Gets the left-most label of this name, or `""` for the root.
	pub fn first_label(&self) -> &str {
		self.labels().first().copied().unwrap_or("")
	}
	/// Returns true if this name is equal to, or below, `zone`, comparing case-insensitively.
	pub fn is_part_of(&self, zone: &Name) -> bool {
		let ours = self.labels();
		let theirs = zone.labels();
		if theirs.len() > ours.len() { return false; }
		ours[ours.len() - theirs.len()..].iter().zip(theirs.iter())
			.all(|(a, b)| a.eq_ignore_ascii_case(b))
	}
	/// Returns true if this name is the same as `other`, comparing case-insensitively.
	pub fn eq_ignore_case(&self, other: &Name) -> bool {
		self.0.eq_ignore_ascii_case(&other.0)
	}
	/// Gets a copy of this name with all ASCII letters lowercased.
	pub fn to_ascii_lowercase(&self) -> Name { Name(self.0.to_ascii_lowercase()) }
	/// Builds the name one level below this one by prepending `label`.
	pub fn prepend_label(&self, label: &str) -> Result<Name, ()> {
		let mut name = String::with_capacity(label.len() + 1 + self.0.len());
		name += label;
		name += ".";
		if !self.is_root() { name += &self.0; }
		name.try_into()
	}
}
impl core::ops::Deref for Name {
	type Target = str;
	fn deref(&self) -> &str { &self.0 }
}
impl fmt::Display for Name {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result { f.write_str(&self.0) }
}
impl TryFrom<String> for Name {
	type Error = ();
	fn try_from(s: String) -> Result<Name, ()> {
		if s.is_empty() { return Err(()); }
		if *s.as_bytes().last().unwrap_or(&0) != b"."[0] { return Err(()); }
		if s.len() > 255 { return Err(()); }
		if s.chars().any(|c| !c.is_ascii_graphic() && c != '.' && c != '-') { return Err(()); }
		if s != "." {
			for label in s[..s.len() - 1].split(".") {
				if label.is_empty() || label.len() > 63 { return Err(()); }
			}
		}

		Ok(Name(s))
	}
}
impl TryFrom<&str> for Name {
	type Error = ();
	fn try_from(s: &str) -> Result<Name, ()> {
		Self::try_from(s.to_owned())
	}
}

/// The record types the validator cares about, as maintained by IANA.
///
/// See <http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4>
pub mod types {
	/// IPv4 address
	pub const A: u16 = 1;
	/// Name server
	pub const NS: u16 = 2;
	/// Canonical name
	pub const CNAME: u16 = 5;
	/// Text
	pub const TXT: u16 = 16;
	/// IPv6 address
	pub const AAAA: u16 = 28;
	/// EDNS pseudo-record
	pub const OPT: u16 = 41;
	/// Delegation signer
	pub const DS: u16 = 43;
	/// Resource record signature
	pub const RRSIG: u16 = 46;
	/// DNS public key
	pub const DNSKEY: u16 = 48;
	/// Hashed authenticated denial of existence
	pub const NSEC3: u16 = 50;
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A supported Resource Record
///
/// This is a closed set: the validator matches it exhaustively rather than testing content types
/// at runtime.
pub enum RR {
	/// An IPv4 resource record
	A(A),
	/// An IPv6 resource record
	AAAA(AAAA),
	/// A name server resource record
	NS(NS),
	/// A text resource record
	Txt(Txt),
	/// A Canonical Name record
	CName(CName),
	/// A DNS (Public) Key resource record
	DnsKey(DnsKey),
	/// A Delegated Signer resource record
	DS(DS),
	/// A Resource Record Signature record
	RRSig(RRSig),
	/// A hashed denial-of-existence record
	NSec3(NSec3),
	/// An EDNS OPT pseudo-record, which carries no data to validate
	Opt(Opt),
}
impl RR {
	/// Gets the name this record refers to.
	pub fn name(&self) -> &Name {
		match self {
			RR::A(rr) => &rr.name,
			RR::AAAA(rr) => &rr.name,
			RR::NS(rr) => &rr.name,
			RR::Txt(rr) => &rr.name,
			RR::CName(rr) => &rr.name,
			RR::DnsKey(rr) => &rr.name,
			RR::DS(rr) => &rr.name,
			RR::RRSig(rr) => &rr.name,
			RR::NSec3(rr) => &rr.name,
			RR::Opt(rr) => &rr.name,
		}
	}
	/// Gets the resource record type of this record.
	pub fn ty(&self) -> u16 {
		match self {
			RR::A(_) => A::TYPE,
			RR::AAAA(_) => AAAA::TYPE,
			RR::NS(_) => NS::TYPE,
			RR::Txt(_) => Txt::TYPE,
			RR::CName(_) => CName::TYPE,
			RR::DnsKey(_) => DnsKey::TYPE,
			RR::DS(_) => DS::TYPE,
			RR::RRSig(_) => RRSig::TYPE,
			RR::NSec3(_) => NSec3::TYPE,
			RR::Opt(_) => Opt::TYPE,
		}
	}
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		match self {
			RR::A(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::AAAA(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::NS(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::Txt(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::CName(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::DnsKey(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::DS(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::RRSig(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::NSec3(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
			RR::Opt(rr) => StaticRecord::write_u16_len_prefixed_data(rr, out),
		}
	}
}
impl From<A> for RR { fn from(a: A) -> RR { RR::A(a) } }
impl From<AAAA> for RR { fn from(aaaa: AAAA) -> RR { RR::AAAA(aaaa) } }
impl From<NS> for RR { fn from(ns: NS) -> RR { RR::NS(ns) } }
impl From<Txt> for RR { fn from(txt: Txt) -> RR { RR::Txt(txt) } }
impl From<CName> for RR { fn from(cname: CName) -> RR { RR::CName(cname) } }
impl From<DnsKey> for RR { fn from(dnskey: DnsKey) -> RR { RR::DnsKey(dnskey) } }
impl From<DS> for RR { fn from(ds: DS) -> RR { RR::DS(ds) } }
impl From<RRSig> for RR { fn from(rrsig: RRSig) -> RR { RR::RRSig(rrsig) } }
impl From<NSec3> for RR { fn from(nsec3: NSec3) -> RR { RR::NSec3(nsec3) } }
impl From<Opt> for RR { fn from(opt: Opt) -> RR { RR::Opt(opt) } }

pub(crate) trait StaticRecord : Ord + Sized {
	// http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4
	const TYPE: u16;
	fn name(&self) -> &Name;
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>);
}
/// A trait describing a resource record (including the [`RR`] enum).
pub trait Record : Ord {
	/// The resource record type, as maintained by IANA.
	///
	/// Current assignments can be found at
	/// <http://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-4>
	fn ty(&self) -> u16;
	/// The name this record is at.
	fn name(&self) -> &Name;
	/// Writes the data of this record, prefixed by a u16 length, to the given `Vec`.
	///
	/// Any names in the data are written in canonical (lowercase, uncompressed) form.
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>);
}
impl<RR: StaticRecord> Record for RR {
	fn ty(&self) -> u16 { RR::TYPE }
	fn name(&self) -> &Name { RR::name(self) }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		RR::write_u16_len_prefixed_data(self, out)
	}
}
impl Record for RR {
	fn ty(&self) -> u16 { self.ty() }
	fn name(&self) -> &Name { self.name() }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		self.write_u16_len_prefixed_data(out)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A text resource record, containing arbitrary text data
pub struct Txt {
	/// The name this record is at.
	pub name: Name,
	/// The text record itself.
	///
	/// While this is generally UTF-8-valid, there is no specific requirement that it be, and thus
	/// is an arbitrary series of bytes here.
	pub data: Vec<u8>,
}
impl StaticRecord for Txt {
	const TYPE: u16 = types::TXT;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let len = (self.data.len() + self.data.len() / 255 + 1) as u16;
		out.extend_from_slice(&len.to_be_bytes());

		let mut data_write = &self.data[..];
		out.extend_from_slice(&[data_write.len().try_into().unwrap_or(255)]);
		while !data_write.is_empty() {
			let split_pos = core::cmp::min(255, data_write.len());
			out.extend_from_slice(&data_write[..split_pos]);
			data_write = &data_write[split_pos..];
			if !data_write.is_empty() {
				out.extend_from_slice(&[data_write.len().try_into().unwrap_or(255)]);
			}
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A Canonical Name resource record, referring all queries for this name to another name.
pub struct CName {
	/// The name this record is at.
	pub name: Name,
	/// The canonical name.
	pub canonical_name: Name,
}
impl StaticRecord for CName {
	const TYPE: u16 = types::CNAME;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let len: u16 = name_len(&self.canonical_name);
		out.extend_from_slice(&len.to_be_bytes());
		write_name(out, &self.canonical_name);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A public key resource record which can be used to validate [`RRSig`]s.
pub struct DnsKey {
	/// The name this record is at.
	pub name: Name,
	/// Flags which constrain the usage of this public key.
	pub flags: u16,
	/// The protocol this key is used for (protocol `3` is DNSSEC).
	pub protocol: u8,
	/// The algorithm which this public key uses to sign data.
	pub alg: u8,
	/// The public key itself.
	pub pubkey: Vec<u8>,
}
impl StaticRecord for DnsKey {
	const TYPE: u16 = types::DNSKEY;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let len = 2 + 1 + 1 + self.pubkey.len();
		out.extend_from_slice(&(len as u16).to_be_bytes());
		out.extend_from_slice(&self.flags.to_be_bytes());
		out.extend_from_slice(&self.protocol.to_be_bytes());
		out.extend_from_slice(&self.alg.to_be_bytes());
		out.extend_from_slice(&self.pubkey);
	}
}
impl DnsKey {
	/// A short (non-cryptographic) digest which can be used to refer to this [`DnsKey`].
	///
	/// Distinct keys may share a tag.
	pub fn key_tag(&self) -> u16 {
		let mut res = u32::from(self.flags);
		res += u32::from(self.protocol) << 8;
		res += u32::from(self.alg);
		for (idx, b) in self.pubkey.iter().enumerate() {
			if idx % 2 == 0 {
				res += u32::from(*b) << 8;
			} else {
				res += u32::from(*b);
			}
		}
		res += (res >> 16) & 0xffff;
		(res & 0xffff) as u16
	}

	/// Builds the [`DS`] record a parent zone would publish for this key using the given digest
	/// type, or `None` if the digest type is not supported.
	///
	/// The digest covers this key's canonical owner name followed by its RDATA.
	pub fn to_ds(&self, digest_type: u8) -> Option<DS> {
		let mut hasher = match digest_type {
			1 => Hasher::sha1(),
			2 => Hasher::sha256(),
			4 => Hasher::sha384(),
			_ => return None,
		};
		write_name(&mut hasher, &self.name);
		hasher.update(&self.flags.to_be_bytes());
		hasher.update(&self.protocol.to_be_bytes());
		hasher.update(&self.alg.to_be_bytes());
		hasher.update(&self.pubkey);
		Some(DS {
			name: self.name.clone(), key_tag: self.key_tag(), alg: self.alg, digest_type,
			digest: hasher.finish().as_ref().to_vec(),
		})
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A Delegation Signer resource record which indicates that some alternative [`DnsKey`] can sign
/// for records in the zone which matches [`DS::name`].
pub struct DS {
	/// The name this record is at.
	///
	/// This is also the zone that a [`DnsKey`] which matches the [`Self::digest`] can sign for.
	pub name: Name,
	/// A short tag which describes the matching [`DnsKey`].
	///
	/// This matches the [`DnsKey::key_tag`] for the [`DnsKey`] which is referred to by this
	/// [`DS`].
	pub key_tag: u16,
	/// The algorithm which the [`DnsKey`] referred to by this [`DS`] uses.
	///
	/// This matches the [`DnsKey::alg`] field in the referred-to [`DnsKey`].
	pub alg: u8,
	/// The type of digest used to hash the referred-to [`DnsKey`].
	pub digest_type: u8,
	/// The digest itself.
	pub digest: Vec<u8>,
}
impl StaticRecord for DS {
	const TYPE: u16 = types::DS;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let len = 2 + 1 + 1 + self.digest.len();
		out.extend_from_slice(&(len as u16).to_be_bytes());
		out.extend_from_slice(&self.key_tag.to_be_bytes());
		out.extend_from_slice(&self.alg.to_be_bytes());
		out.extend_from_slice(&self.digest_type.to_be_bytes());
		out.extend_from_slice(&self.digest);
	}
}
impl DS {
	/// Parses the presentation form of a DS record's data, eg
	/// `19036 8 2 49aac11d7b6f6446702e54a1607371607a1a41855200fd2ce1cdde32f24e8fb5`.
	pub fn from_presentation(name: Name, data: &str) -> Result<DS, ()> {
		let mut fields = data.split_ascii_whitespace();
		let key_tag = fields.next().ok_or(())?.parse().map_err(|_| ())?;
		let alg = fields.next().ok_or(())?.parse().map_err(|_| ())?;
		let digest_type = fields.next().ok_or(())?.parse().map_err(|_| ())?;
		// The digest may be split into several whitespace-separated chunks.
		let digest_hex: String = fields.collect();
		if digest_hex.is_empty() { return Err(()); }
		let digest = <Vec<u8> as hex_conservative::FromHex>::from_hex(&digest_hex).map_err(|_| ())?;
		Ok(DS { name, key_tag, alg, digest_type, digest })
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A Resource Record (set) Signature resource record. This contains a signature over all the
/// resources records of the given type at the given name.
pub struct RRSig {
	/// The name this record is at.
	///
	/// This is also the name of any records which this signature is covering (ignoring wildcards).
	pub name: Name,
	/// The resource record type which this [`RRSig`] is signing.
	///
	/// All resources records of this type at the same name as [`Self::name`] must be signed by
	/// this [`RRSig`].
	pub ty: u16,
	/// The algorithm which is being used to sign.
	///
	/// Note that this is not checked against [`DnsKey::alg`] when picking candidate keys.
	pub alg: u8,
	/// The number of labels in the name of the records that this signature is signing, not
	/// counting a leading wildcard label.
	pub labels: u8,
	/// The TTL of the records which this [`RRSig`] is signing.
	pub orig_ttl: u32,
	/// The expiration (as a UNIX timestamp) of this signature.
	pub expiration: u32,
	/// The time (as a UNIX timestamp) at which this signature becomes valid.
	pub inception: u32,
	/// A short tag which describes the matching [`DnsKey`].
	///
	/// This matches the [`DnsKey::key_tag`] for the [`DnsKey`] which created this signature.
	pub key_tag: u16,
	/// The [`DnsKey::name`] in the [`DnsKey`] which created this signature.
	///
	/// This must be a parent of the [`Self::name`].
	pub key_name: Name,
	/// The signature itself.
	pub signature: Vec<u8>,
}
impl StaticRecord for RRSig {
	const TYPE: u16 = types::RRSIG;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let len = 2 + 1 + 1 + 4*3 + 2 + name_len(&self.key_name) + self.signature.len() as u16;
		out.extend_from_slice(&len.to_be_bytes());
		write_rrsig_header(out, self);
		out.extend_from_slice(&self.signature);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A hashed denial-of-existence record, proving no names hash to a value strictly between its
/// own hashed owner label and [`Self::next_name_hash`].
pub struct NSec3 {
	/// The name this record is at.
	///
	/// The first label is the base32hex-encoded hash of the name this record describes.
	pub name: Name,
	/// The hash algorithm used (only `1`, SHA-1, is defined).
	pub hash_algo: u8,
	/// Flags, of which only bit 0 (opt-out) is defined.
	pub flags: u8,
	/// The number of additional hash iterations applied.
	pub hash_iterations: u16,
	/// The salt appended to the name at each hash iteration.
	pub salt: Vec<u8>,
	/// The raw hash of the next hashed owner name in the zone's NSEC3 chain.
	pub next_name_hash: Vec<u8>,
	/// The record types present at the name this record describes.
	pub types: Vec<u16>,
}
impl StaticRecord for NSec3 {
	const TYPE: u16 = types::NSEC3;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		let mut bitmap = Vec::with_capacity(34);
		write_type_bitmap(&mut bitmap, &self.types);
		let len = 1 + 1 + 2 + 1 + self.salt.len() + 1 + self.next_name_hash.len() + bitmap.len();
		out.extend_from_slice(&(len as u16).to_be_bytes());
		out.extend_from_slice(&[self.hash_algo, self.flags]);
		out.extend_from_slice(&self.hash_iterations.to_be_bytes());
		out.extend_from_slice(&[self.salt.len() as u8]);
		out.extend_from_slice(&self.salt);
		out.extend_from_slice(&[self.next_name_hash.len() as u8]);
		out.extend_from_slice(&self.next_name_hash);
		out.extend_from_slice(&bitmap);
	}
}
impl NSec3 {
	/// Returns true if the opt-out flag is set, indicating that unsigned delegations may exist in
	/// the range this record covers.
	pub fn opt_out(&self) -> bool { self.flags & 1 != 0 }
	/// Returns true if the given record type is listed in this record's type bitmap.
	pub fn has_type(&self, ty: u16) -> bool { self.types.contains(&ty) }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// An EDNS OPT pseudo-record. It only ever describes the transport and is never validated.
pub struct Opt {
	/// The name this record is at (always the root).
	pub name: Name,
	/// The requestor's UDP payload size.
	pub udp_payload_size: u16,
	/// Whether the DNSSEC OK bit was set.
	pub dnssec_ok: bool,
}
impl StaticRecord for Opt {
	const TYPE: u16 = types::OPT;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&0u16.to_be_bytes());
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// An IPv4 Address resource record
pub struct A {
	/// The name this record is at.
	pub name: Name,
	/// The bytes of the IPv4 address.
	pub address: [u8; 4],
}
impl StaticRecord for A {
	const TYPE: u16 = types::A;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&4u16.to_be_bytes());
		out.extend_from_slice(&self.address);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// An IPv6 Address resource record
pub struct AAAA {
	/// The name this record is at.
	pub name: Name,
	/// The bytes of the IPv6 address.
	pub address: [u8; 16],
}
impl StaticRecord for AAAA {
	const TYPE: u16 = types::AAAA;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&16u16.to_be_bytes());
		out.extend_from_slice(&self.address);
	}
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// A Name Server resource record, which indicates the server responsible for handling queries for
/// a zone.
pub struct NS {
	/// The name this record is at.
	///
	/// This is also the zone which the server at [`Self::name_server`] is responsible for handling
	/// queries for.
	pub name: Name,
	/// The name of the server which is responsible for handling queries for the [`Self::name`]
	/// zone.
	pub name_server: Name,
}
impl StaticRecord for NS {
	const TYPE: u16 = types::NS;
	fn name(&self) -> &Name { &self.name }
	fn write_u16_len_prefixed_data(&self, out: &mut Vec<u8>) {
		out.extend_from_slice(&name_len(&self.name_server).to_be_bytes());
		write_name(out, &self.name_server);
	}
}
