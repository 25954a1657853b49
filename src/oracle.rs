//! The source of records the chain walker pulls DNSKEY and DS data from.
//!
//! How records are obtained (recursion, caching, retries, negative responses) is entirely up to the
//! oracle. The walker only ever issues one request at a time and strictly in walk order.

use alloc::string::String;
use alloc::vec::Vec;

use crate::rr::{Name, RR};

/// A failure to obtain records for a name and type.
///
/// This is distinct from any validation result: it means the evidence could not be fetched, not
/// that it was shown to be invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
	/// The oracle gave up waiting for an answer.
	#[error("timed out fetching {name} type {ty}")]
	Timeout {
		/// The name which was being fetched.
		name: Name,
		/// The record type which was being fetched.
		ty: u16,
	},
	/// The upstream server(s) failed to answer.
	#[error("server failure fetching {name} type {ty}")]
	ServerFailure {
		/// The name which was being fetched.
		name: Name,
		/// The record type which was being fetched.
		ty: u16,
	},
	/// Some other failure, described by the oracle.
	#[error("fetch failed: {0}")]
	Other(String),
}

/// Something which can fetch the records at a name for a given type.
///
/// Any [`crate::rr::RRSig`]s covering the returned records should be included, as well as any
/// NSEC3 records (and their signatures) proving a negative answer.
pub trait RecordOracle {
	/// Fetches the records (and covering signatures) for `name` and `ty`. May block.
	fn get(&mut self, name: &Name, ty: u16) -> Result<Vec<RR>, FetchError>;
}

impl<F> RecordOracle for F where F: FnMut(&Name, u16) -> Result<Vec<RR>, FetchError> {
	fn get(&mut self, name: &Name, ty: u16) -> Result<Vec<RR>, FetchError> {
		self(name, ty)
	}
}
