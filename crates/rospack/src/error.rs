//! Error types for the container codec.
use std::borrow::Cow;

use deku::DekuError;
use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::header::Version;

/// Convenience return type.
pub type Result<T> = std::result::Result<T, Error>;

/// Combined return error type.
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
	/// I/O error.
	#[error(transparent)]
	Io(#[from] std::io::Error),

	/// Codec error that's just a message.
	#[error(transparent)]
	Simple(#[from] SimpleError),

	/// Codec error that includes a snippet of the offending buffer.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Source(#[from] SourceError),
}

impl Error {
	/// The kind of codec error, if this isn't an I/O error.
	pub fn kind(&self) -> Option<ErrorKind> {
		match self {
			Self::Io(_) => None,
			Self::Simple(err) => Some(err.kind),
			Self::Source(err) => Some(err.kind),
		}
	}

	/// Whether this is a format error (a container that can't be used as a mirror).
	pub fn is_format(&self) -> bool {
		self.kind()
			.map_or(false, |kind| kind.class() == ErrorClass::Format)
	}

	/// Whether this is an encoding error (a value that doesn't fit its field).
	pub fn is_encoding(&self) -> bool {
		self.kind()
			.map_or(false, |kind| kind.class() == ErrorClass::Encoding)
	}
}

/// Codec error.
#[derive(Error, Diagnostic, Debug)]
#[error("ros: {message}")]
pub struct SimpleError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,
}

/// Codec error, with a hex snippet of the buffer it was found in.
#[derive(Error, Diagnostic, Debug)]
#[error("ros: {message}")]
pub struct SourceError {
	/// Error kind.
	pub kind: ErrorKind,

	/// Error message.
	pub message: Cow<'static, str>,

	/// Error location in the snippet.
	#[label("here")]
	pub at: SourceSpan,

	/// Snippet of the buffer.
	#[source_code]
	pub snippet: String,
}

impl SimpleError {
	/// New error without source.
	pub fn new(kind: ErrorKind) -> Self {
		Self {
			kind,
			message: kind.default_message(),
		}
	}

	/// New parse error from deku.
	pub fn from_deku(orig: DekuError) -> Self {
		Self::new(ErrorKind::Parse).with_message(orig.to_string())
	}

	/// New serialisation error from deku.
	pub fn from_deku_write(orig: DekuError) -> Self {
		Self::new(ErrorKind::Serialise).with_message(orig.to_string())
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

impl SourceError {
	/// New error with source snippet.
	///
	/// `at_byte` is relative to the snippet, and the label covers `width` bytes.
	pub fn new(kind: ErrorKind, snippet: &[u8], at_byte: usize, width: usize) -> Self {
		// each byte renders as "xx, " in the debug output, after the opening bracket
		let width = width.max(1);
		Self {
			kind,
			message: kind.default_message(),
			snippet: format!("{snippet:02x?}"),
			at: SourceSpan::from(((at_byte * 4) + 1, (width * 4) - 2)),
		}
	}

	/// New error with source snippet, extracted from a larger source.
	pub fn from_source(
		kind: ErrorKind,
		source: &[u8],
		at_byte: usize,
		width: usize,
		context: usize,
	) -> Self {
		let at_byte = at_byte.min(source.len());
		let start = at_byte.saturating_sub(context);
		let end = at_byte
			.saturating_add(width)
			.saturating_add(context)
			.min(source.len());
		let width = width.min(end - at_byte);
		Self::new(kind, &source[start..end], at_byte - start, width)
	}

	/// New parse error from deku.
	pub fn from_deku(orig: DekuError, source: &[u8], at_byte: usize, context: usize) -> Self {
		Self::from_source(ErrorKind::Parse, source, at_byte, 1, context)
			.with_message(orig.to_string())
	}

	/// Change the error message.
	pub fn with_message(mut self, message: impl Into<Cow<'static, str>>) -> Self {
		self.message = message.into();
		self
	}
}

/// Broad category of a codec error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
	/// The input container isn't one this crate understands.
	Format,

	/// A value can't be represented in its fixed-width field.
	Encoding,
}

/// Codec error kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	/// The signature isn't where it should be.
	MissingSignature {
		/// The four bytes found at the signature offset.
		found: [u8; 4],
	},

	/// The format index matches neither header version.
	UnknownFormatIndex([u8; 4]),

	/// The buffer ends before the structure it should contain.
	Truncated {
		/// Bytes needed
		needed: usize,
		/// Bytes available
		actual: usize,
	},

	/// Mirrored header fields were applied to a header of the other version.
	VersionMismatch {
		/// Version of the header being built
		expected: Version,
		/// Version the mirrored fields came from
		actual: Version,
	},

	/// An integer doesn't fit the width of its field.
	FieldOverflow {
		/// Name of the field
		field: &'static str,
		/// Value that was given
		value: i128,
		/// Width of the field in bytes
		width: usize,
	},

	/// A name can't be stored as ASCII.
	NonAsciiName,

	/// The number of files added doesn't match the entry count declared up front.
	EntryCountMismatch {
		/// Declared entry count
		declared: usize,
		/// Number of files added
		actual: usize,
	},

	/// Parse error.
	Parse,

	/// Serialisation error.
	Serialise,
}

impl ErrorKind {
	/// Which category this kind belongs to.
	pub fn class(self) -> ErrorClass {
		match self {
			Self::MissingSignature { .. }
			| Self::UnknownFormatIndex(_)
			| Self::Truncated { .. }
			| Self::VersionMismatch { .. }
			| Self::Parse => ErrorClass::Format,
			Self::FieldOverflow { .. }
			| Self::NonAsciiName
			| Self::EntryCountMismatch { .. }
			| Self::Serialise => ErrorClass::Encoding,
		}
	}

	/// Get the default error message for this error kind.
	pub fn default_message(self) -> Cow<'static, str> {
		match self {
			ErrorKind::MissingSignature { found } => Cow::Owned(format!(
				"no {:?} signature at offset 0x{:X} (found {found:02x?}), is this a ros container?",
				String::from_utf8_lossy(&crate::constants::SIGNATURE),
				crate::constants::SIGNATURE_OFFSET,
			)),
			ErrorKind::UnknownFormatIndex(index) => Cow::Owned(format!(
				"unknown format index {:?}, this crate supports {:?} and {:?}",
				String::from_utf8_lossy(&index),
				String::from_utf8_lossy(&crate::constants::V1_FORMAT_INDEX),
				String::from_utf8_lossy(&crate::constants::V2_FORMAT_INDEX),
			)),
			ErrorKind::Truncated { needed, actual } => Cow::Owned(format!(
				"container too short: need {needed} bytes, have {actual}"
			)),
			ErrorKind::VersionMismatch { expected, actual } => Cow::Owned(format!(
				"cannot apply {actual} header fields to a {expected} header"
			)),
			ErrorKind::FieldOverflow {
				field,
				value,
				width,
			} => Cow::Owned(format!(
				"value {value} does not fit the {width}-byte {field} field"
			)),
			ErrorKind::NonAsciiName => Cow::Borrowed("file name is not ASCII"),
			ErrorKind::EntryCountMismatch { declared, actual } => Cow::Owned(format!(
				"declared {declared} entries but {actual} files were added"
			)),
			ErrorKind::Parse => Cow::Borrowed("parse error"),
			ErrorKind::Serialise => Cow::Borrowed("serialisation error"),
		}
	}
}

impl From<ErrorKind> for SimpleError {
	fn from(ek: ErrorKind) -> Self {
		Self::new(ek)
	}
}

impl From<ErrorKind> for Error {
	fn from(ek: ErrorKind) -> Self {
		Self::Simple(ek.into())
	}
}
