use tracing::{debug, instrument, trace};

use crate::{
	codec::{byte_sum, fixed_ascii, Record},
	entry::DirectoryEntry,
	error::{ErrorKind, Result},
	subheader::SubHeader,
};

use super::{Encoder, Entry};

impl Encoder {
	/// Add a file.
	///
	/// Files end up in the container in the order they're added. If the data starts like an LZMA
	/// stream, a sub-header is prepended to it. When mirroring, the entry's reserved bytes and the
	/// sub-header's opaque fields are looked up in the mirror by name.
	#[instrument(level = "debug", skip(self, data), fields(len = data.len()))]
	pub fn add_file(&mut self, name: &str, data: &[u8]) -> Result<&DirectoryEntry> {
		if self.entries.len() >= self.declared_entries {
			return Err(ErrorKind::EntryCountMismatch {
				declared: self.declared_entries,
				actual: self.entries.len() + 1,
			}
			.into());
		}

		let name_field = fixed_ascii(name)?;

		let subheader = match SubHeader::for_payload(data, &self.timestamp)? {
			Some(mut builder) => {
				debug!("payload looks like an LZMA stream, adding sub-header");
				if let Some(fields) = self
					.mirror
					.as_ref()
					.and_then(|mirror| mirror.subheader_fields(&name_field))
				{
					builder.mirrored(fields);
				}
				Some(builder.build())
			}
			None => None,
		};

		let mut payload = match &subheader {
			Some(subheader) => subheader.encode()?,
			None => Vec::new(),
		};
		payload.extend_from_slice(data);

		let mut builder = DirectoryEntry::builder(name, self.offset, payload.len() as u64)?;
		if let Some(reserved) = self
			.mirror
			.as_ref()
			.and_then(|mirror| mirror.entry_reserved(builder.name()))
		{
			builder.reserved(reserved);
		}
		let directory = builder.build();

		let entry_bytes = directory.encode()?;
		let sum = byte_sum(&entry_bytes) + byte_sum(&payload);
		self.checksum += u128::from(sum);
		self.offset += payload.len() as u64;
		trace!(
			entry = %format!("{entry_bytes:02x?}"),
			%sum,
			checksum = %self.checksum,
			next_offset = %self.offset,
			"added entry"
		);

		self.entries.push(Entry {
			directory,
			subheader,
			payload,
		});

		let index = self.entries.len() - 1;
		Ok(&self.entries[index].directory)
	}
}
