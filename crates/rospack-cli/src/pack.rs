use std::{fs::read, path::PathBuf};

use clap::{Parser, ValueHint};
use rospack::{
	encode::{Encoder, Target},
	header::Version,
	mirror::Mirror,
};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{CliError, ValidationError};

#[derive(Debug, Clone, Parser)]
pub struct PackArgs {
	/// Directory of files to pack.
	///
	/// Only regular files directly inside it are packed, in file name order. Subdirectories are
	/// skipped.
	#[arg(
		value_hint = ValueHint::DirPath,
		value_name = "DIR",
	)]
	pub input: PathBuf,

	/// Output file.
	///
	/// Must not exist yet.
	#[arg(
		long,
		short,
		value_hint = ValueHint::AnyPath,
		value_name = "PATH",
		default_value = "container.ros",
	)]
	pub output: PathBuf,

	/// Existing container to copy opaque fields from.
	///
	/// The new container will have the same header version as the mirror, and its reserved bytes,
	/// timestamps, and firmware version will be copied over where they can be found.
	#[arg(
		long,
		short,
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
		conflicts_with = "container_version",
	)]
	pub mirror: Option<PathBuf>,

	/// Header version to produce, when not mirroring.
	#[arg(
		long,
		short = 'V',
		value_name = "1|2",
		value_parser = clap::value_parser!(u8).range(1..=2),
	)]
	pub container_version: Option<u8>,
}

/// Where the container version comes from, after validation.
enum Source {
	Version(Version),
	Mirror(PathBuf),
}

pub(crate) fn pack(args: PackArgs) -> Result<(), CliError> {
	let (source, files) = validate(&args)?;

	let target = match source {
		Source::Version(version) => Target::Version(version),
		Source::Mirror(path) => {
			info!(?path, "read mirror");
			let mirror = Mirror::open(&path)?;
			info!(version = %mirror.version(), "mirroring");
			Target::Mirror(mirror)
		}
	};

	info!(version = %target.version(), count = %files.len(), "initialise encoder");
	let mut encoder = Encoder::new(target, files.len())?;

	for path in &files {
		let name = path
			.file_name()
			.map(|name| name.to_string_lossy())
			.unwrap_or_default();
		info!(?path, "processing file");
		let data = read(path).map_err(rospack::error::Error::from)?;
		let entry = encoder.add_file(&name, &data)?;
		debug!(offset = %entry.offset, length = %entry.length, "packed");
	}

	info!("finalising container");
	let container = encoder.finalise()?;

	info!(path = ?args.output, len = %container.len(), "write output file");
	container.save(&args.output)?;
	Ok(())
}

/// Check the inputs and collect the files to pack, without reading any of them.
fn validate(args: &PackArgs) -> Result<(Source, Vec<PathBuf>), CliError> {
	let source = match (&args.mirror, args.container_version) {
		(Some(mirror), _) => {
			if !mirror.exists() {
				return Err(ValidationError::MissingMirror(mirror.clone()).into());
			}
			if !mirror.is_file() {
				return Err(ValidationError::MirrorNotAFile(mirror.clone()).into());
			}
			Source::Mirror(mirror.clone())
		}
		(None, Some(number)) => {
			Source::Version(Version::from_number(number).ok_or(ValidationError::NoVersion)?)
		}
		(None, None) => return Err(ValidationError::NoVersion.into()),
	};

	if !args.input.exists() {
		return Err(ValidationError::MissingInput(args.input.clone()).into());
	}
	if !args.input.is_dir() {
		return Err(ValidationError::NotADirectory(args.input.clone()).into());
	}
	if args.output.exists() {
		return Err(ValidationError::OutputExists(args.output.clone()).into());
	}

	info!(path = ?args.input, "walk input directory");
	let mut files = Vec::new();
	for entry in WalkDir::new(&args.input)
		.follow_links(true)
		.min_depth(1)
		.max_depth(1)
		.sort_by_file_name()
	{
		let entry = entry?;
		if entry.path_is_symlink() {
			debug!(path = ?entry.path(), "following symlink");
		}

		if !entry.file_type().is_file() {
			debug!(path = ?entry.path(), "not a regular file, skipping");
			continue;
		}

		files.push(entry.into_path());
	}

	if files.is_empty() {
		return Err(ValidationError::EmptyInput(args.input.clone()).into());
	}

	Ok((source, files))
}
