//! Fixed-width field primitives shared by all records.
//!
//! Records themselves are laid out with [`deku`]; this module has the pieces deku doesn't do for
//! us: refusing integers that don't fit their field, padding names, summing bytes, and slicing
//! offset-addressed ranges out of a larger buffer.

use std::{borrow::Cow, mem::size_of};

use deku::{DekuContainerRead, DekuContainerWrite};

use crate::error::{ErrorKind, Result, SimpleError, SourceError};

/// A fixed-width on-disk record.
pub trait Record: DekuContainerWrite + Sized {
	/// Width of the record in bytes.
	const SIZE: usize;

	/// Serialise to exactly [`SIZE`](Self::SIZE) bytes.
	fn encode(&self) -> Result<Vec<u8>> {
		let bytes = self.to_bytes().map_err(SimpleError::from_deku_write)?;
		if bytes.len() != Self::SIZE {
			return Err(SimpleError::new(ErrorKind::Serialise)
				.with_message(format!(
					"record encoded to {} bytes instead of {}",
					bytes.len(),
					Self::SIZE
				))
				.into());
		}

		Ok(bytes)
	}

	/// Parse the record found at `offset` in a larger buffer.
	fn decode_at<'a>(buf: &'a [u8], offset: usize) -> Result<Self>
	where
		Self: DekuContainerRead<'a>,
	{
		let end = offset.saturating_add(Self::SIZE);
		let Some(bytes) = buf.get(offset..end) else {
			return Err(ErrorKind::Truncated {
				needed: end,
				actual: buf.len(),
			}
			.into());
		};

		let (_, record) =
			Self::from_bytes((bytes, 0)).map_err(|err| SourceError::from_deku(err, buf, offset, 16))?;
		Ok(record)
	}
}

/// Convert an integer to the type of its field, failing if it doesn't fit.
///
/// Nothing is ever truncated or wrapped here: checksums downstream depend on exact widths.
pub fn fit<T, V>(field: &'static str, value: V) -> Result<T>
where
	T: TryFrom<V>,
	V: Copy + Into<i128>,
{
	T::try_from(value).map_err(|_| {
		ErrorKind::FieldOverflow {
			field,
			value: value.into(),
			width: size_of::<T>(),
		}
		.into()
	})
}

/// Pack an ASCII string into a zero-padded field of `N` bytes, truncating if longer.
pub fn fixed_ascii<const N: usize>(name: &str) -> Result<[u8; N]> {
	if !name.is_ascii() {
		return Err(ErrorKind::NonAsciiName.into());
	}

	let mut field = [0; N];
	let len = name.len().min(N);
	field[..len].copy_from_slice(&name.as_bytes()[..len]);
	Ok(field)
}

/// Render a zero-padded ASCII field for display, without the padding.
pub fn display_ascii(field: &[u8]) -> Cow<'_, str> {
	let end = field
		.iter()
		.rposition(|b| *b != 0)
		.map_or(0, |last| last + 1);
	String::from_utf8_lossy(&field[..end])
}

/// Unsigned sum of all bytes.
pub fn byte_sum(bytes: &[u8]) -> u64 {
	bytes.iter().map(|b| u64::from(*b)).sum()
}

/// Reduce a running checksum to a 32-bit field.
///
/// Checksums are the one place where wrapping is part of the format.
pub fn wrap32(sum: u128) -> u32 {
	(sum & 0xFFFF_FFFF) as u32
}

/// Copy `N` bytes starting at `offset`, if the buffer is long enough.
pub fn take<const N: usize>(buf: &[u8], offset: usize) -> Option<[u8; N]> {
	let end = offset.checked_add(N)?;
	buf.get(offset..end)?.try_into().ok()
}

/// Read a little-endian u32 at `offset`, if the buffer is long enough.
pub fn u32_le_at(buf: &[u8], offset: usize) -> Option<u32> {
	take(buf, offset).map(u32::from_le_bytes)
}
