//! Recovering opaque fields from a reference container.
//!
//! Much of the format is not understood: reserved bytes, timestamps, and the firmware version are
//! carried over byte-for-byte from a "mirror", an existing container, so that a newly built
//! container matches it everywhere we can't compute the value ourselves.
//!
//! Header fields are found at fixed offsets. Directory entries and sub-headers are found by name:
//! the mirror is scanned in 16-byte steps (even though entries are 32 bytes wide) for the padded
//! name field, and the last match in the scan range wins. Containers in the wild were produced by
//! tooling that scans the same way, so the stride stays.

use std::{fmt, path::Path};

use tracing::{debug, instrument, trace};

use crate::{
	codec::{take, u32_le_at},
	constants::{ENTRY_NAME_WIDTH, MIRROR_SCAN_STEPS, MIRROR_SCAN_STRIDE},
	error::Result,
	header::{Header, MirroredHeader, Version},
	subheader::MirroredSubHeader,
};

/// A reference container, read fully into memory.
///
/// Never modified, and never validated beyond [`sniff()`](crate::header::sniff).
#[derive(Clone)]
pub struct Mirror {
	bytes: Vec<u8>,
	header: Header,
}

impl fmt::Debug for Mirror {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Mirror")
			.field("bytes", &format!("{} bytes", self.bytes.len()))
			.field("header", &self.header)
			.finish()
	}
}

impl Mirror {
	/// Use a buffer as a mirror.
	///
	/// Fails with a format error if the buffer isn't recognisably a container.
	#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
	pub fn new(bytes: Vec<u8>) -> Result<Self> {
		let header = Header::decode(&bytes)?;
		debug!(version = %header.version(), "mirror accepted");
		Ok(Self { bytes, header })
	}

	/// Read a file and use it as a mirror.
	#[instrument(level = "debug")]
	pub fn open(path: &Path) -> Result<Self> {
		Self::new(std::fs::read(path)?)
	}

	/// Header version of the mirror.
	pub fn version(&self) -> Version {
		self.header.version()
	}

	/// The raw bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.bytes
	}

	/// The opaque header fields.
	pub fn header_fields(&self) -> MirroredHeader {
		match &self.header {
			Header::V1(header) => MirroredHeader::V1 {
				timestamp: header.timestamp,
				reserved_a: header.reserved_a,
				reserved_b: header.reserved_b,
			},
			Header::V2(header) => MirroredHeader::V2 {
				reserved_a: header.reserved_a,
				reserved_b: header.reserved_b,
				timestamp: header.timestamp,
				reserved_c: header.reserved_c,
				firmware_version: header.firmware_version,
			},
		}
	}

	/// Find where a name field appears in the scan range.
	fn find_name(&self, name: &[u8; ENTRY_NAME_WIDTH]) -> Option<usize> {
		let mut found = None;
		for step in 0..MIRROR_SCAN_STEPS {
			let at = step * MIRROR_SCAN_STRIDE;
			if self.bytes.get(at..(at + ENTRY_NAME_WIDTH)) == Some(&name[..]) {
				trace!(%at, "name match");
				found = Some(at);
			}
		}

		found
	}

	/// The reserved bytes of the directory entry with this name.
	///
	/// Returns `None` if the name isn't found, which is not an error: leave the field at zero.
	#[instrument(level = "debug", skip(self, name), fields(name = %crate::codec::display_ascii(name)))]
	pub fn entry_reserved(&self, name: &[u8; ENTRY_NAME_WIDTH]) -> Option<[u8; 8]> {
		let at = self.find_name(name)?;
		let reserved = take(&self.bytes, at + 24);
		debug!(?reserved, "mirrored entry");
		reserved
	}

	/// The opaque fields of the sub-header belonging to the entry with this name.
	///
	/// The entry's offset field points at the sub-header. Returns `None` if the name isn't found or
	/// the offset points past the end of the mirror.
	#[instrument(level = "debug", skip(self, name), fields(name = %crate::codec::display_ascii(name)))]
	pub fn subheader_fields(&self, name: &[u8; ENTRY_NAME_WIDTH]) -> Option<MirroredSubHeader> {
		let at = self.find_name(name)?;
		let offset = u32_le_at(&self.bytes, at + 16)? as usize;
		trace!(%offset, "sub-header offset");

		let fields = MirroredSubHeader {
			timestamp: take(&self.bytes, offset.checked_add(8)?)?,
			reserved_a: take(&self.bytes, offset.checked_add(16)?)?,
			reserved_b: take(&self.bytes, offset.checked_add(24)?)?,
		};
		debug!(?fields, "mirrored sub-header");
		Some(fields)
	}
}
