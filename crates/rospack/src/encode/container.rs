use std::{
	fs::{remove_file, OpenOptions},
	io::{BufWriter, Write},
	path::Path,
};

use tracing::{debug, instrument, trace, warn};

use crate::{
	codec::Record,
	constants::ENTRY_SIZE,
	entry::DirectoryEntry,
	error::Result,
	header::Header,
	subheader::SubHeader,
};

/// One packed file: its directory entry and its payload region.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Entry {
	/// The directory entry.
	pub directory: DirectoryEntry,

	/// The sub-header, if the payload got one.
	///
	/// Its bytes are already at the start of [`payload`](Self::payload).
	pub subheader: Option<SubHeader>,

	/// Payload region: sub-header bytes if any, then the file's bytes.
	pub payload: Vec<u8>,
}

/// A fully assembled container, ready to write.
///
/// On disk this is the header, then every directory entry, then every payload region, with
/// entries and payloads in the same order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Container {
	header: Header,
	entries: Vec<Entry>,
}

impl Container {
	pub(crate) fn new(header: Header, entries: Vec<Entry>) -> Self {
		Self { header, entries }
	}

	/// The header.
	pub fn header(&self) -> &Header {
		&self.header
	}

	/// The entries, in container order.
	pub fn entries(&self) -> &[Entry] {
		&self.entries
	}

	/// Length of the serialised container in bytes.
	#[allow(clippy::len_without_is_empty)] // CLIPPY: this is not a collection
	pub fn len(&self) -> u64 {
		let payloads: u64 = self.entries.iter().map(|e| e.payload.len() as u64).sum();
		(self.header.version().header_size() + self.entries.len() * ENTRY_SIZE) as u64 + payloads
	}

	/// Write the container to a writer.
	#[instrument(level = "debug", skip(self, writer))]
	pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
		debug!("write header");
		writer.write_all(&self.header.encode()?)?;

		debug!(count = %self.entries.len(), "write directory entries");
		for entry in &self.entries {
			writer.write_all(&entry.directory.encode()?)?;
		}

		debug!("write payloads");
		for entry in &self.entries {
			trace!(name = %entry.directory.display_name(), len = %entry.payload.len(), "write payload");
			writer.write_all(&entry.payload)?;
		}

		writer.flush()?;
		Ok(())
	}

	/// Serialise the container to a vector.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		let mut bytes = Vec::with_capacity(self.len() as usize);
		self.write_to(&mut bytes)?;
		Ok(bytes)
	}

	/// Write the container to a new file.
	///
	/// Refuses to overwrite an existing file. If writing fails, the partial file is removed.
	#[instrument(level = "debug", skip(self))]
	pub fn save(&self, path: &Path) -> Result<()> {
		let file = OpenOptions::new().write(true).create_new(true).open(path)?;
		let mut writer = BufWriter::new(file);

		let written = self.write_to(&mut writer).and_then(|()| {
			let file = writer.into_inner().map_err(|err| err.into_error())?;
			file.sync_all()?;
			Ok(())
		});
		discard_on_error(path, written)?;

		debug!(?path, len = %self.len(), "wrote container");
		Ok(())
	}
}

/// Remove a partially written file if writing it failed, passing the result through.
fn discard_on_error(path: &Path, written: Result<()>) -> Result<()> {
	if let Err(err) = written {
		warn!(?path, %err, "write failed, removing partial output");
		if let Err(rmerr) = remove_file(path) {
			warn!(?path, %rmerr, "could not remove partial output");
		}
		return Err(err);
	}

	Ok(())
}
