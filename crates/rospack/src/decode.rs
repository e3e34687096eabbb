//! Decoder types and functions.
//!
//! Reads back the header and directory of a container, for listing. Checksums are not verified
//! and payloads are not decompressed.

use std::{fmt, path::Path};

use tracing::{debug, instrument, trace};

use crate::{
	codec::Record,
	constants::{ENTRY_SIZE, LZMA_MARKER, SUBHEADER_FORMAT_INDEX, SUBHEADER_MAGIC, SUBHEADER_SIZE},
	entry::DirectoryEntry,
	error::{ErrorKind, Result},
	header::Header,
	subheader::SubHeader,
};

/// Decoder context, over a container held in memory.
#[derive(Clone)]
pub struct Decoder {
	bytes: Vec<u8>,
	header: Header,
}

impl fmt::Debug for Decoder {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Decoder")
			.field("bytes", &format!("{} bytes", self.bytes.len()))
			.field("header", &self.header)
			.finish()
	}
}

/// A directory entry as read from a container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ListedEntry {
	/// The directory entry.
	pub directory: DirectoryEntry,

	/// The sub-header at the start of the payload region, if there seems to be one.
	pub subheader: Option<SubHeader>,
}

impl Decoder {
	/// Parse the header of a container.
	#[instrument(level = "debug", skip(bytes), fields(len = bytes.len()))]
	pub fn new(bytes: Vec<u8>) -> Result<Self> {
		let header = Header::decode(&bytes)?;
		debug!(?header, "read header");
		Ok(Self { bytes, header })
	}

	/// Read a container file.
	#[instrument(level = "debug")]
	pub fn open(path: &Path) -> Result<Self> {
		Self::new(std::fs::read(path)?)
	}

	/// The header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// Length of the container in bytes.
	pub fn file_length(&self) -> u64 {
		self.bytes.len() as u64
	}

	/// Read the directory entries.
	#[instrument(level = "debug", skip(self))]
	pub fn entries(&self) -> Result<Vec<ListedEntry>> {
		let start = self.header.version().header_size();
		(0..self.header.entry_count() as usize)
			.map(|index| -> Result<ListedEntry> {
				let directory = DirectoryEntry::decode_at(&self.bytes, start + index * ENTRY_SIZE)?;
				let subheader = self.subheader_at(directory.offset as usize)?;
				trace!(%index, ?directory, ?subheader, "read entry");
				Ok(ListedEntry {
					directory,
					subheader,
				})
			})
			.collect()
	}

	/// The sub-header at this offset, if the bytes there look like one followed by an LZMA stream.
	fn subheader_at(&self, offset: usize) -> Result<Option<SubHeader>> {
		let Some(head) = self.bytes.get(offset..) else {
			return Ok(None);
		};

		if head.len() < SUBHEADER_SIZE + LZMA_MARKER.len()
			|| head[0..4] != SUBHEADER_MAGIC
			|| head[4..8] != SUBHEADER_FORMAT_INDEX
			|| !head[SUBHEADER_SIZE..].starts_with(&LZMA_MARKER)
		{
			return Ok(None);
		}

		SubHeader::decode_at(&self.bytes, offset).map(Some)
	}

	/// The payload region of an entry, including any sub-header.
	pub fn payload(&self, entry: &DirectoryEntry) -> Result<&[u8]> {
		let start = entry.offset as usize;
		let end = start.saturating_add(entry.length as usize);
		self.bytes.get(start..end).ok_or_else(|| {
			ErrorKind::Truncated {
				needed: end,
				actual: self.bytes.len(),
			}
			.into()
		})
	}
}
