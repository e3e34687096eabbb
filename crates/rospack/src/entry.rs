//! Directory entries: one 32-byte record per packed file.

use std::borrow::Cow;

use deku::prelude::*;

use crate::{
	codec::{display_ascii, fit, fixed_ascii, Record},
	constants::{ENTRY_NAME_WIDTH, ENTRY_SIZE},
	error::Result,
};

/// Directory entry.
///
/// ```text
/// 0           4           8           12          16
/// |                      NAME                     |
/// |  OFFSET   |  LENGTH   |        RESERVED       |
/// ```
#[derive(Clone, Debug, Eq, PartialEq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
pub struct DirectoryEntry {
	/// File name, ASCII, zero-padded and truncated to 16 bytes.
	pub name: [u8; ENTRY_NAME_WIDTH],

	/// Absolute offset of the payload region from the start of the container.
	pub offset: u32,

	/// Length of the payload region, including any sub-header.
	pub length: u32,

	/// Opaque.
	pub reserved: [u8; 8],
}

impl Record for DirectoryEntry {
	const SIZE: usize = ENTRY_SIZE;
}

impl DirectoryEntry {
	/// Start building an entry.
	///
	/// Fails if the name isn't ASCII or if the offset or length don't fit in 32 bits.
	pub fn builder(name: &str, offset: u64, length: u64) -> Result<EntryBuilder> {
		Ok(EntryBuilder(Self {
			name: fixed_ascii(name)?,
			offset: fit("entry offset", offset)?,
			length: fit("entry length", length)?,
			reserved: [0; 8],
		}))
	}

	/// The name without its padding.
	pub fn display_name(&self) -> Cow<'_, str> {
		display_ascii(&self.name)
	}
}

/// Builder for a [`DirectoryEntry`].
///
/// Create with [`DirectoryEntry::builder()`], patch the reserved bytes if mirroring, then
/// [`build()`](EntryBuilder::build).
#[derive(Clone, Debug)]
pub struct EntryBuilder(DirectoryEntry);

impl EntryBuilder {
	/// The padded name field, as it will be written.
	pub fn name(&self) -> &[u8; ENTRY_NAME_WIDTH] {
		&self.0.name
	}

	/// Set the reserved bytes.
	pub fn reserved(&mut self, reserved: [u8; 8]) -> &mut Self {
		self.0.reserved = reserved;
		self
	}

	/// Finish the entry.
	pub fn build(self) -> DirectoryEntry {
		self.0
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn layout() {
		let mut builder = DirectoryEntry::builder("kernel.bin", 0x70, 0x1234).unwrap();
		builder.reserved([1, 2, 3, 4, 5, 6, 7, 8]);
		let bytes = builder.build().encode().unwrap();

		assert_eq!(bytes.len(), 32);
		assert_eq!(&bytes[..16], b"kernel.bin\0\0\0\0\0\0");
		assert_eq!(&bytes[16..20], &[0x70, 0, 0, 0]);
		assert_eq!(&bytes[20..24], &[0x34, 0x12, 0, 0]);
		assert_eq!(&bytes[24..32], &[1, 2, 3, 4, 5, 6, 7, 8]);
	}

	#[test]
	fn reserved_defaults_to_zero() {
		let entry = DirectoryEntry::builder("a", 0, 0).unwrap().build();
		assert_eq!(entry.reserved, [0; 8]);
	}

	#[test]
	fn refuses_oversized_offset() {
		let err = DirectoryEntry::builder("a", 1 << 32, 0).unwrap_err();
		assert!(err.is_encoding());
	}

	#[test]
	fn decodes_at_offset() {
		let entry = DirectoryEntry::builder("boot", 48, 10).unwrap().build();
		let mut buf = vec![0xAA; 8];
		buf.extend(entry.encode().unwrap());

		let decoded = DirectoryEntry::decode_at(&buf, 8).unwrap();
		assert_eq!(decoded, entry);
		assert_eq!(decoded.display_name(), "boot");
		assert!(DirectoryEntry::decode_at(&buf, 9).is_err());
	}
}
