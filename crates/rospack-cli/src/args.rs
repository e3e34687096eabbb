use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::{list::ListArgs, pack::PackArgs};

/// Build and inspect ROS firmware containers.
#[derive(Debug, Clone, Parser)]
#[command(
	name = "rospack",
	bin_name = "rospack",
	author,
	version,
	after_help = "Want more detail? Try the long '--help' flag!",
	after_long_help = "Didn't expect this much output? Use the short '-h' flag to get short help."
)]
#[cfg_attr(debug_assertions, command(before_help = "⚠ DEBUG BUILD ⚠"))]
pub struct Args {
	/// Set diagnostic log level.
	///
	/// This enables diagnostic logging, which is useful for investigating bugs or gaining more
	/// insight into the layout of containers. Use multiple times to increase verbosity.
	///
	/// You may want to use with '--log-file' to avoid polluting your terminal.
	///
	/// Setting $RUST_LOG also works, and takes precedence, but is not recommended unless you know
	/// what you're doing.
	#[arg(
		long,
		short,
		action = ArgAction::Count,
		global = true,
		num_args = 0,
	)]
	pub verbose: u8,

	/// Write diagnostic logs to a file.
	///
	/// This writes diagnostic logs to a file, instead of the terminal, in JSON format. If the path
	/// is a directory, a file named after the current time is created in it.
	#[arg(
		long,
		global = true,
		value_hint = ValueHint::AnyPath,
		value_name = "PATH",
	)]
	pub log_file: Option<PathBuf>,

	#[command(subcommand)]
	pub action: Action,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Action {
	/// Pack the files of a directory into a container.
	Pack(PackArgs),

	/// List the entries of a container.
	List(ListArgs),
}
