//! Container header, in its two on-disk versions.
//!
//! The header is the first record of a container. Both versions start with a magic and a format
//! index, and both have the [`SIGNATURE`] at the same byte offset, which is how a buffer is
//! recognised as a container at all (see [`sniff()`]). After that the layouts diverge: version 1
//! is 48 bytes with a single length and checksum, version 2 is 80 bytes with two lengths, two
//! checksums, and a self-checksum over the header itself.

use std::fmt;

use deku::prelude::*;
use tracing::{debug, instrument, trace};

use crate::{
	codec::{byte_sum, fit, take, wrap32, Record},
	constants::{
		FORMAT_INDEX_OFFSET, SIGNATURE, SIGNATURE_OFFSET, V1_FORMAT_INDEX, V1_HEADER_SIZE,
		V1_MAGIC, V2_DEFAULT_FIRMWARE_VERSION, V2_FORMAT_INDEX, V2_HEADER_SIZE, V2_MAGIC,
	},
	error::{ErrorKind, Result, SourceError},
	timestamp::{Timestamp, YearOrder},
};

/// Header version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Version {
	/// Format index `1.01`, 48-byte header.
	V1,

	/// Format index `2.00`, 80-byte header.
	V2,
}

impl Version {
	/// Size of this version's header in bytes.
	pub const fn header_size(self) -> usize {
		match self {
			Self::V1 => V1_HEADER_SIZE,
			Self::V2 => V2_HEADER_SIZE,
		}
	}

	/// The format index bytes that identify this version.
	pub const fn format_index(self) -> [u8; 4] {
		match self {
			Self::V1 => V1_FORMAT_INDEX,
			Self::V2 => V2_FORMAT_INDEX,
		}
	}

	/// Identify a version from its format index.
	pub fn from_format_index(index: [u8; 4]) -> Option<Self> {
		match index {
			V1_FORMAT_INDEX => Some(Self::V1),
			V2_FORMAT_INDEX => Some(Self::V2),
			_ => None,
		}
	}

	/// Version from its number, as given on the command line.
	pub fn from_number(number: u8) -> Option<Self> {
		match number {
			1 => Some(Self::V1),
			2 => Some(Self::V2),
			_ => None,
		}
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::V1 => write!(f, "version 1"),
			Self::V2 => write!(f, "version 2"),
		}
	}
}

/// Check that a buffer looks like a container, and find its header version.
///
/// This only looks at the signature and the format index, nothing else is validated.
#[instrument(level = "debug", skip(buf), fields(len = buf.len()))]
pub fn sniff(buf: &[u8]) -> Result<Version> {
	let Some(signature) = take::<4>(buf, SIGNATURE_OFFSET) else {
		return Err(ErrorKind::Truncated {
			needed: SIGNATURE_OFFSET + SIGNATURE.len(),
			actual: buf.len(),
		}
		.into());
	};

	if signature != SIGNATURE {
		return Err(SourceError::from_source(
			ErrorKind::MissingSignature { found: signature },
			buf,
			SIGNATURE_OFFSET,
			SIGNATURE.len(),
			8,
		)
		.into());
	}

	// the signature check guarantees we have at least 28 bytes
	let index = take::<4>(buf, FORMAT_INDEX_OFFSET).unwrap_or_default();
	let version = Version::from_format_index(index).ok_or_else(|| {
		SourceError::from_source(
			ErrorKind::UnknownFormatIndex(index),
			buf,
			FORMAT_INDEX_OFFSET,
			index.len(),
			4,
		)
	})?;

	debug!(%version, "sniffed container");
	Ok(version)
}

/// Version 1 header.
///
/// ```text
/// 0           4           8           12          16
/// |   MAGIC   |   INDEX   |        TIMESTAMP      |
/// |  LENGTH   | CHECKSUM  | SIGNATURE | RESERVED A|
/// |  ENTRIES  |             RESERVED B            |
/// ```
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct HeaderV1 {
	/// Magic, [`V1_MAGIC`].
	pub magic: [u8; 4],

	/// Format index, [`V1_FORMAT_INDEX`].
	pub format_index: [u8; 4],

	/// Timestamp, see [`YearOrder::Little`].
	pub timestamp: [u8; 8],

	/// Length of the container without this header.
	pub total_length: u32,

	/// Byte sum of all directory entries and payloads, wrapped to 32 bits.
	pub checksum: u32,

	/// Signature, [`SIGNATURE`].
	pub signature: [u8; 4],

	/// Opaque.
	pub reserved_a: [u8; 4],

	/// Number of directory entries.
	pub entry_count: u32,

	/// Opaque.
	pub reserved_b: [u8; 12],
}

impl Record for HeaderV1 {
	const SIZE: usize = V1_HEADER_SIZE;
}

/// Version 2 header.
///
/// ```text
/// 0           4           8           12          16          20          24          28          32
/// |   MAGIC   |   INDEX   |HEADER LEN |HEADER SUM | LENGTH 1  |CHECKSUM 1 | SIGNATURE | RESERVED A|
/// |  ENTRIES  | RESERVED B|        TIMESTAMP      | LENGTH 2  |CHECKSUM 2 |       RESERVED C      |
/// |                FIRMWARE VERSION               |
/// ```
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct HeaderV2 {
	/// Magic, [`V2_MAGIC`].
	pub magic: [u8; 4],

	/// Format index, [`V2_FORMAT_INDEX`].
	pub format_index: [u8; 4],

	/// Always [`V2_HEADER_SIZE`].
	pub header_length: u32,

	/// `0xFFFFFFFF` minus the byte sum of this header with this field zeroed.
	pub header_checksum: u32,

	/// Final offset plus 32.
	pub length1: u32,

	/// Byte sum of this header with both checksum fields zeroed.
	pub checksum1: u32,

	/// Signature, [`SIGNATURE`].
	pub signature: [u8; 4],

	/// Opaque.
	pub reserved_a: [u8; 4],

	/// Number of directory entries.
	pub entry_count: u32,

	/// Opaque.
	pub reserved_b: [u8; 4],

	/// Timestamp, see [`YearOrder::Little`].
	pub timestamp: [u8; 8],

	/// Length of the container without this header.
	pub length2: u32,

	/// Byte sum of all directory entries and payloads, wrapped to 32 bits.
	pub checksum2: u32,

	/// Opaque.
	pub reserved_c: [u8; 8],

	/// Firmware version, opaque.
	pub firmware_version: [u8; 16],
}

impl Record for HeaderV2 {
	const SIZE: usize = V2_HEADER_SIZE;
}

impl HeaderV2 {
	/// Compute `checksum1` and then `header_checksum`.
	///
	/// Must run last: both sums cover every other field.
	fn apply_checksums(&mut self) -> Result<()> {
		self.header_checksum = 0;
		self.checksum1 = 0;
		self.checksum1 = wrap32(u128::from(byte_sum(&self.encode()?)));

		// header_checksum is still zero, so it doesn't contribute to its own sum
		let sum = wrap32(u128::from(byte_sum(&self.encode()?)));
		self.header_checksum = u32::MAX.wrapping_sub(sum);
		trace!(checksum1 = %self.checksum1, header_checksum = %self.header_checksum, "computed header checksums");
		Ok(())
	}
}

/// Container header.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Header {
	/// Version 1.
	V1(HeaderV1),

	/// Version 2.
	V2(HeaderV2),
}

impl Header {
	/// Which version this is.
	pub fn version(&self) -> Version {
		match self {
			Self::V1(_) => Version::V1,
			Self::V2(_) => Version::V2,
		}
	}

	/// Serialise to exactly [`Version::header_size()`] bytes.
	pub fn encode(&self) -> Result<Vec<u8>> {
		match self {
			Self::V1(header) => header.encode(),
			Self::V2(header) => header.encode(),
		}
	}

	/// Parse the header at the start of a container, after sniffing it.
	pub fn decode(buf: &[u8]) -> Result<Self> {
		match sniff(buf)? {
			Version::V1 => HeaderV1::decode_at(buf, 0).map(Self::V1),
			Version::V2 => HeaderV2::decode_at(buf, 0).map(Self::V2),
		}
	}

	/// Number of directory entries.
	pub fn entry_count(&self) -> u32 {
		match self {
			Self::V1(header) => header.entry_count,
			Self::V2(header) => header.entry_count,
		}
	}

	/// Total container length in bytes, as declared by the header.
	pub fn declared_length(&self) -> u64 {
		match self {
			Self::V1(header) => u64::from(header.total_length) + V1_HEADER_SIZE as u64,
			Self::V2(header) => u64::from(header.length2) + V2_HEADER_SIZE as u64,
		}
	}

	/// The payload checksum field.
	pub fn payload_checksum(&self) -> u32 {
		match self {
			Self::V1(header) => header.checksum,
			Self::V2(header) => header.checksum2,
		}
	}

	/// The raw timestamp bytes.
	pub fn timestamp_bytes(&self) -> [u8; 8] {
		match self {
			Self::V1(header) => header.timestamp,
			Self::V2(header) => header.timestamp,
		}
	}

	/// The timestamp, decoded.
	pub fn timestamp(&self) -> Result<Timestamp> {
		Timestamp::from_bytes(self.timestamp_bytes(), YearOrder::Little)
	}
}

/// Fields of a header recovered from a mirror.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MirroredHeader {
	/// From a version 1 container.
	V1 {
		/// Bytes 8 to 16.
		timestamp: [u8; 8],
		/// Bytes 28 to 32.
		reserved_a: [u8; 4],
		/// Bytes 36 to 48.
		reserved_b: [u8; 12],
	},

	/// From a version 2 container.
	V2 {
		/// Bytes 28 to 32.
		reserved_a: [u8; 4],
		/// Bytes 36 to 40.
		reserved_b: [u8; 4],
		/// Bytes 40 to 48.
		timestamp: [u8; 8],
		/// Bytes 56 to 64.
		reserved_c: [u8; 8],
		/// Bytes 64 to 80.
		firmware_version: [u8; 16],
	},
}

impl MirroredHeader {
	/// Which version these fields came from.
	pub fn version(&self) -> Version {
		match self {
			Self::V1 { .. } => Version::V1,
			Self::V2 { .. } => Version::V2,
		}
	}
}

/// Builder for a [`Header`].
///
/// Takes the freshly computed values, optionally the fields recovered from a mirror, and produces
/// the header (with its self-checksum, for version 2) in one go.
#[derive(Clone, Debug)]
pub struct HeaderBuilder {
	version: Version,
	timestamp: Timestamp,
	entry_count: usize,
	final_offset: u64,
	payload_checksum: u128,
	mirrored: Option<MirroredHeader>,
}

impl HeaderBuilder {
	/// Start a header.
	///
	/// `final_offset` is the offset one past the last payload byte, which is the total length of
	/// the container. `payload_checksum` is the running byte sum of entries and payloads.
	pub fn new(
		version: Version,
		timestamp: Timestamp,
		entry_count: usize,
		final_offset: u64,
		payload_checksum: u128,
	) -> Self {
		Self {
			version,
			timestamp,
			entry_count,
			final_offset,
			payload_checksum,
			mirrored: None,
		}
	}

	/// Use fields recovered from a mirror.
	///
	/// The mirror must be of the same version, which is checked on [`build()`](Self::build).
	pub fn mirrored(&mut self, fields: MirroredHeader) -> &mut Self {
		self.mirrored = Some(fields);
		self
	}

	/// Produce the header.
	#[instrument(level = "debug", skip(self), fields(version = %self.version))]
	pub fn build(&self) -> Result<Header> {
		if let Some(mirrored) = &self.mirrored {
			if mirrored.version() != self.version {
				return Err(ErrorKind::VersionMismatch {
					expected: self.version,
					actual: mirrored.version(),
				}
				.into());
			}
		}

		let entry_count = fit("entry count", self.entry_count as u64)?;
		let timestamp = self.timestamp.to_bytes(YearOrder::Little)?;
		let checksum = wrap32(self.payload_checksum);
		let offset = i128::from(self.final_offset);

		let header = match self.version {
			Version::V1 => {
				let mut header = HeaderV1 {
					magic: V1_MAGIC,
					format_index: V1_FORMAT_INDEX,
					timestamp,
					total_length: fit("total length", offset - V1_HEADER_SIZE as i128)?,
					checksum,
					signature: SIGNATURE,
					reserved_a: [0; 4],
					entry_count,
					reserved_b: [0; 12],
				};

				if let Some(MirroredHeader::V1 {
					timestamp,
					reserved_a,
					reserved_b,
				}) = self.mirrored
				{
					header.timestamp = timestamp;
					header.reserved_a = reserved_a;
					header.reserved_b = reserved_b;
				}

				Header::V1(header)
			}
			Version::V2 => {
				let mut header = HeaderV2 {
					magic: V2_MAGIC,
					format_index: V2_FORMAT_INDEX,
					header_length: V2_HEADER_SIZE as u32,
					header_checksum: 0,
					length1: fit("length 1", offset + 32)?,
					checksum1: 0,
					signature: SIGNATURE,
					reserved_a: [0; 4],
					entry_count,
					reserved_b: [0; 4],
					timestamp,
					length2: fit("length 2", offset - V2_HEADER_SIZE as i128)?,
					checksum2: checksum,
					reserved_c: [0; 8],
					firmware_version: V2_DEFAULT_FIRMWARE_VERSION,
				};

				if let Some(MirroredHeader::V2 {
					reserved_a,
					reserved_b,
					timestamp,
					reserved_c,
					firmware_version,
				}) = self.mirrored
				{
					header.reserved_a = reserved_a;
					header.reserved_b = reserved_b;
					header.timestamp = timestamp;
					header.reserved_c = reserved_c;
					header.firmware_version = firmware_version;
				}

				header.apply_checksums()?;
				Header::V2(header)
			}
		};

		debug!(?header, "built header");
		Ok(header)
	}
}
