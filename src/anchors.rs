//! Trust anchors: [`DS`] records pinned by configuration rather than fetched.
//!
//! A [`TrustAnchors`] set is immutable once built. With the `std` feature, a [`TrustAnchorStore`]
//! publishes versioned [`TrustAnchorSnapshot`]s of one, letting configuration reloads swap in a
//! new set while in-flight validations keep using the snapshot they acquired.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::vec::Vec;
use alloc::vec;

use crate::rr::{DS, Name};

#[cfg(feature = "std")]
use std::sync::{Arc, OnceLock};
#[cfg(feature = "std")]
use arc_swap::ArcSwap;

/// The IANA root zone KSKs (KSK-2017 and KSK-2024).
pub fn root_anchors() -> Vec<DS> {
	vec![DS {
		name: Name::root(), key_tag: 19036, alg: 8, digest_type: 2,
		digest: hex_lit::hex!("49AAC11D7B6F6446702E54A1607371607A1A41855200FD2CE1CDDE32F24E8FB5").to_vec(),
	}, DS {
		name: Name::root(), key_tag: 20326, alg: 8, digest_type: 2,
		digest: hex_lit::hex!("E06D44B80B8F1D39A95C0B0D7C65D08458E880409BBC683457104237C7F8EC8D").to_vec(),
	}]
}

/// An error parsing configured trust anchors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AnchorError {
	/// The zone name was not a valid absolute domain name.
	#[error("invalid trust anchor zone name {0:?}")]
	InvalidName(String),
	/// The DS data could not be parsed.
	#[error("invalid DS data for trust anchor at {zone}: {data:?}")]
	InvalidDs {
		/// The zone the anchor was configured for.
		zone: Name,
		/// The unparseable DS data.
		data: String,
	},
}

/// An immutable set of trust anchors, keyed by (lowercased) zone name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchors {
	anchors: BTreeMap<Name, Vec<DS>>,
}

impl Default for TrustAnchors {
	/// The root zone anchors from [`root_anchors`].
	fn default() -> Self {
		root_anchors().into_iter().fold(Self::empty(), Self::with_anchor)
	}
}

impl TrustAnchors {
	/// A set with no anchors at all. Nothing will validate until some are added.
	pub fn empty() -> Self {
		TrustAnchors { anchors: BTreeMap::new() }
	}

	/// Adds `ds` as an anchor for the zone [`DS::name`]. Duplicates are ignored.
	pub fn with_anchor(mut self, ds: DS) -> Self {
		let zone_anchors = self.anchors.entry(ds.name.to_ascii_lowercase()).or_default();
		if !zone_anchors.contains(&ds) {
			zone_anchors.push(ds);
		}
		self
	}

	/// Builds a set from `(zone, DS data)` pairs in presentation format, eg
	/// `(".", "20326 8 2 E06D44B8...")`.
	pub fn from_presentation(entries: &[(&str, &str)]) -> Result<Self, AnchorError> {
		let mut res = Self::empty();
		for (zone, data) in entries {
			let zone: Name = (*zone).try_into()
				.map_err(|()| AnchorError::InvalidName(String::from(*zone)))?;
			let ds = DS::from_presentation(zone.clone(), data)
				.map_err(|()| AnchorError::InvalidDs { zone, data: String::from(*data) })?;
			res = res.with_anchor(ds);
		}
		Ok(res)
	}

	/// Gets the anchors configured for exactly `zone` (compared case-insensitively).
	pub fn get(&self, zone: &Name) -> &[DS] {
		self.anchors.get(&zone.to_ascii_lowercase()).map(|v| &v[..]).unwrap_or(&[])
	}

	/// Iterates over every configured anchor.
	pub fn iter(&self) -> impl Iterator<Item = &DS> {
		self.anchors.values().flat_map(|v| v.iter())
	}

	/// The number of configured anchors.
	pub fn len(&self) -> usize {
		self.anchors.values().map(|v| v.len()).sum()
	}

	/// Returns true if there are no anchors.
	pub fn is_empty(&self) -> bool { self.anchors.is_empty() }
}

/// A [`TrustAnchors`] set as published by a [`TrustAnchorStore`] at some version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrustAnchorSnapshot {
	/// Starts at 0 and increases by one with every install.
	pub version: u64,
	/// The anchors themselves.
	pub anchors: TrustAnchors,
}

impl core::ops::Deref for TrustAnchorSnapshot {
	type Target = TrustAnchors;
	fn deref(&self) -> &TrustAnchors { &self.anchors }
}

/// A process-wide, read-mostly holder of the current [`TrustAnchorSnapshot`].
///
/// Readers never block writers (or each other), and a snapshot once acquired never changes.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct TrustAnchorStore {
	current: ArcSwap<TrustAnchorSnapshot>,
}

#[cfg(feature = "std")]
impl Default for TrustAnchorStore {
	fn default() -> Self { Self::new(TrustAnchors::default()) }
}

#[cfg(feature = "std")]
impl TrustAnchorStore {
	/// Builds a store whose initial snapshot (version 0) is `anchors`.
	pub fn new(anchors: TrustAnchors) -> Self {
		TrustAnchorStore {
			current: ArcSwap::from_pointee(TrustAnchorSnapshot { version: 0, anchors }),
		}
	}

	/// Gets the current snapshot.
	pub fn acquire(&self) -> Arc<TrustAnchorSnapshot> {
		self.current.load_full()
	}

	/// Replaces the current snapshot with `anchors`, returning the new version.
	pub fn install(&self, anchors: TrustAnchors) -> u64 {
		let prev = self.current.rcu(|cur| TrustAnchorSnapshot {
			version: cur.version + 1, anchors: anchors.clone(),
		});
		let version = prev.version + 1;
		tracing::info!(version, count = anchors.len(), "installed trust anchors");
		version
	}
}

#[cfg(feature = "std")]
fn global_store() -> &'static TrustAnchorStore {
	static STORE: OnceLock<TrustAnchorStore> = OnceLock::new();
	STORE.get_or_init(TrustAnchorStore::default)
}

/// Gets the current process-wide trust anchor snapshot, initially the root anchors.
#[cfg(feature = "std")]
pub fn acquire_snapshot() -> Arc<TrustAnchorSnapshot> {
	global_store().acquire()
}

/// Replaces the process-wide trust anchors, returning the new snapshot version.
#[cfg(feature = "std")]
pub fn install_snapshot(anchors: TrustAnchors) -> u64 {
	global_store().install(anchors)
}
