//! Encoder types and functions.
//!
//! The [`Encoder`] is fed files one at a time, in the order they should appear in the container.
//! It builds a directory entry (and a sub-header, for LZMA payloads) for each, keeping a running
//! offset and checksum, and [`finalise()`](Encoder::finalise) produces the header and hands back a
//! [`Container`] ready to be written out.

use std::fmt;

use tracing::{debug, instrument};

use crate::{
	constants::ENTRY_SIZE, error::Result, header::Version, mirror::Mirror, timestamp::Timestamp,
};

#[doc(inline)]
pub use self::container::{Container, Entry};

mod add_file;
mod container;
mod finalise;

/// What kind of container to build.
#[derive(Clone, Debug)]
pub enum Target {
	/// A container of this header version, with all opaque fields left at their defaults.
	Version(Version),

	/// A container of the same version as this mirror, with opaque fields copied from it.
	Mirror(Mirror),
}

impl Target {
	/// The header version that will be produced.
	pub fn version(&self) -> Version {
		match self {
			Self::Version(version) => *version,
			Self::Mirror(mirror) => mirror.version(),
		}
	}
}

/// Container encoder context.
pub struct Encoder {
	version: Version,
	mirror: Option<Mirror>,
	timestamp: Timestamp,
	declared_entries: usize,
	entries: Vec<Entry>,
	offset: u64,
	checksum: u128,
}

impl fmt::Debug for Encoder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Encoder")
			.field("version", &self.version)
			.field("mirror", &self.mirror)
			.field("timestamp", &self.timestamp)
			.field("declared_entries", &self.declared_entries)
			.field("entries", &self.entries.len())
			.field("offset", &self.offset)
			.field("checksum", &self.checksum)
			.finish()
	}
}

impl Encoder {
	/// Create a new encoder, stamped with the current local time.
	///
	/// The number of entries must be known up front: payloads start after the header and the
	/// whole directory, so the first offset depends on it.
	pub fn new(target: Target, entry_count: usize) -> Result<Self> {
		Ok(Self::with_timestamp(target, entry_count, Timestamp::now()?))
	}

	/// Create a new encoder with a fixed timestamp.
	#[instrument(level = "debug", skip(target), fields(version = %target.version()))]
	pub fn with_timestamp(target: Target, entry_count: usize, timestamp: Timestamp) -> Self {
		let version = target.version();
		let mirror = match target {
			Target::Version(_) => None,
			Target::Mirror(mirror) => Some(mirror),
		};

		let offset = (entry_count as u64)
			.saturating_mul(ENTRY_SIZE as u64)
			.saturating_add(version.header_size() as u64);
		debug!(%offset, "first payload offset");

		Self {
			version,
			mirror,
			timestamp,
			declared_entries: entry_count,
			entries: Vec::with_capacity(entry_count),
			offset,
			checksum: 0,
		}
	}

	/// The header version being produced.
	pub fn version(&self) -> Version {
		self.version
	}

	/// Offset the next payload will be written at.
	pub fn offset(&self) -> u64 {
		self.offset
	}
}
