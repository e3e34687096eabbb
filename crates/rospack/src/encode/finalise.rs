use tracing::{debug, instrument};

use crate::{
	error::{ErrorKind, Result},
	header::HeaderBuilder,
};

use super::{Container, Encoder};

impl Encoder {
	/// Build the header and return the finished container.
	///
	/// Fails if fewer files were added than declared.
	#[instrument(level = "debug", skip(self))]
	pub fn finalise(self) -> Result<Container> {
		if self.entries.len() != self.declared_entries {
			return Err(ErrorKind::EntryCountMismatch {
				declared: self.declared_entries,
				actual: self.entries.len(),
			}
			.into());
		}

		let mut builder = HeaderBuilder::new(
			self.version,
			self.timestamp,
			self.declared_entries,
			self.offset,
			self.checksum,
		);

		if let Some(mirror) = &self.mirror {
			debug!("mirroring header fields");
			builder.mirrored(mirror.header_fields());
		}

		let header = builder.build()?;
		debug!(length = %self.offset, entries = %self.entries.len(), "container finalised");
		Ok(Container::new(header, self.entries))
	}
}
