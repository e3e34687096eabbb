use std::{path::PathBuf, process::ExitCode};

use miette::Diagnostic;
use thiserror::Error;

/// Errors the command line reports.
#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
	/// Inputs that were refused before anything was read.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Validation(#[from] ValidationError),

	/// The input directory couldn't be listed, or one of its entries couldn't be read.
	#[error("cannot read input directory")]
	#[diagnostic(code(rospack::input::unreadable))]
	Walk(#[from] walkdir::Error),

	/// Errors from reading, building, or writing containers.
	#[error(transparent)]
	#[diagnostic(transparent)]
	Container(#[from] rospack::error::Error),
}

impl CliError {
	pub fn exit_code(&self) -> ExitCode {
		match self {
			Self::Validation(_) => ExitCode::from(1),
			Self::Container(err) if err.is_format() => ExitCode::from(3),
			Self::Container(err) if err.is_encoding() => ExitCode::from(1),
			Self::Container(_) | Self::Walk(_) => ExitCode::from(4),
		}
	}
}

/// Bad command line inputs.
#[derive(Error, Diagnostic, Debug)]
pub enum ValidationError {
	#[error("input directory {0:?} does not exist")]
	#[diagnostic(code(rospack::input::missing))]
	MissingInput(PathBuf),

	#[error("input {0:?} is not a directory")]
	#[diagnostic(code(rospack::input::not_a_directory))]
	NotADirectory(PathBuf),

	#[error("input directory {0:?} has no files to pack")]
	#[diagnostic(
		code(rospack::input::empty),
		help("only regular files directly inside the directory are packed")
	)]
	EmptyInput(PathBuf),

	#[error("output file {0:?} already exists")]
	#[diagnostic(
		code(rospack::output::exists),
		help("remove it or choose another path with --output")
	)]
	OutputExists(PathBuf),

	#[error("mirror file {0:?} does not exist")]
	#[diagnostic(code(rospack::mirror::missing))]
	MissingMirror(PathBuf),

	#[error("mirror {0:?} is not a file")]
	#[diagnostic(code(rospack::mirror::not_a_file))]
	MirrorNotAFile(PathBuf),

	#[error("no container version given")]
	#[diagnostic(
		code(rospack::version::missing),
		help("pass --container-version 1 or 2, or --mirror with an existing container")
	)]
	NoVersion,
}
