//! Grouping of flat record lists into RRsets paired with the signatures covering them.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;

use crate::rr::*;

/// The records sharing one owner name and type, along with the [`RRSig`]s which claim to cover
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignedRRset {
	/// The records themselves. Never contains [`RR::RRSig`] or [`RR::Opt`].
	pub records: Vec<RR>,
	/// Signatures at the same owner name whose [`RRSig::ty`] is this set's type.
	pub signatures: Vec<RRSig>,
}

/// RRsets keyed by (lowercased owner name, record type).
pub type RRsetMap = BTreeMap<(Name, u16), SignedRRset>;

/// Groups `records` into [`SignedRRset`]s.
///
/// Owner names are compared case-insensitively, so records and signatures whose owners differ
/// only in case land in the same set. [`RRSig`]s are filed as signatures under the type they cover
/// rather than as records, and [`Opt`] pseudo-records are dropped.
pub fn harvest(records: &[RR]) -> RRsetMap {
	let mut rrsets = RRsetMap::new();
	for record in records {
		match record {
			RR::Opt(_) => {},
			RR::RRSig(sig) => {
				rrsets.entry((sig.name.to_ascii_lowercase(), sig.ty)).or_default().signatures.push(sig.clone());
			},
			RR::A(_)|RR::AAAA(_)|RR::NS(_)|RR::Txt(_)|RR::CName(_)|RR::DnsKey(_)|RR::DS(_)|RR::NSec3(_) => {
				rrsets.entry((record.name().to_ascii_lowercase(), record.ty())).or_default().records.push(record.clone());
			},
		}
	}
	rrsets
}
