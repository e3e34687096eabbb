//! Compression sub-header, prepended to payloads that look like LZMA streams.

use deku::prelude::*;
use tracing::trace;

use crate::{
	codec::{take, Record},
	constants::{
		LZMA_MARKER, LZMA_SIZE_RANGE, SUBHEADER_FORMAT_INDEX, SUBHEADER_MAGIC, SUBHEADER_SIZE,
	},
	error::Result,
	timestamp::{Timestamp, YearOrder},
};

/// Compression sub-header.
///
/// ```text
/// 0           4           8           12          16
/// |   MAGIC   |   INDEX   |        TIMESTAMP      |
/// | RESERVED A|   SIZE    |       RESERVED B      |
/// ```
///
/// The timestamp stores its year big-endian, unlike everywhere else in the format.
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct SubHeader {
	/// Magic, [`SUBHEADER_MAGIC`].
	pub magic: [u8; 4],

	/// Format index, [`SUBHEADER_FORMAT_INDEX`].
	pub format_index: [u8; 4],

	/// Timestamp, see [`YearOrder::Big`].
	pub timestamp: [u8; 8],

	/// Opaque.
	pub reserved_a: [u8; 4],

	/// Uncompressed size, relocated verbatim from the payload.
	pub uncompressed_size: [u8; 4],

	/// Opaque.
	pub reserved_b: [u8; 8],
}

impl Record for SubHeader {
	const SIZE: usize = SUBHEADER_SIZE;
}

/// Fields of a sub-header recovered from a mirror.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct MirroredSubHeader {
	/// Timestamp bytes, as-is.
	pub timestamp: [u8; 8],

	/// Reserved A bytes, as-is.
	pub reserved_a: [u8; 4],

	/// Reserved B bytes, as-is.
	pub reserved_b: [u8; 8],
}

/// Whether a payload needs a sub-header.
pub fn needs_subheader(payload: &[u8]) -> bool {
	payload.starts_with(&LZMA_MARKER)
}

impl SubHeader {
	/// Start building a sub-header for a payload.
	///
	/// Returns `None` if the payload doesn't need one.
	///
	/// The uncompressed size is copied from bytes 5 to 9 of the payload. If the payload is shorter
	/// than that, what's there is copied and the rest stays zero.
	pub fn for_payload(payload: &[u8], timestamp: &Timestamp) -> Result<Option<SubHeaderBuilder>> {
		if !needs_subheader(payload) {
			return Ok(None);
		}

		let uncompressed_size = take(payload, LZMA_SIZE_RANGE.start).unwrap_or_else(|| {
			let mut size = [0; 4];
			if let Some(partial) = payload.get(LZMA_SIZE_RANGE.start..) {
				size[..partial.len()].copy_from_slice(partial);
			}
			trace!(?size, "payload too short for a full size field");
			size
		});

		Ok(Some(SubHeaderBuilder(Self {
			magic: SUBHEADER_MAGIC,
			format_index: SUBHEADER_FORMAT_INDEX,
			timestamp: timestamp.to_bytes(YearOrder::Big)?,
			reserved_a: [0; 4],
			uncompressed_size,
			reserved_b: [0; 8],
		})))
	}

	/// The uncompressed size, as a number.
	pub fn uncompressed_size(&self) -> u32 {
		u32::from_le_bytes(self.uncompressed_size)
	}
}

/// Builder for a [`SubHeader`].
#[derive(Clone, Debug)]
pub struct SubHeaderBuilder(SubHeader);

impl SubHeaderBuilder {
	/// Replace the timestamp and reserved fields with ones recovered from a mirror.
	pub fn mirrored(&mut self, fields: MirroredSubHeader) -> &mut Self {
		self.0.timestamp = fields.timestamp;
		self.0.reserved_a = fields.reserved_a;
		self.0.reserved_b = fields.reserved_b;
		self
	}

	/// Finish the sub-header.
	pub fn build(self) -> SubHeader {
		self.0
	}
}
