#![warn(clippy::unwrap_used)]
#![deny(rust_2018_idioms)]

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};

use crate::args::Action;

mod args;
mod error;
mod list;
mod logs;
mod pack;

fn main() -> ExitCode {
	let logs_on = match logs::from_env() {
		Ok(on) => on,
		Err(err) => {
			eprintln!("Failed to initialise logging from RUST_LOG, continuing with none\n{err}");
			true
		}
	};

	debug!("parsing arguments");
	let args = args::Args::parse();

	if logs_on {
		warn!("ignoring logging options from args");
	} else if let Err(err) = logs::from_args(&args) {
		eprintln!("Failed to open log file: {err}");
		return ExitCode::from(1);
	}

	debug!(?args, "got arguments");

	let result = match args.action {
		Action::Pack(args) => pack::pack(args),
		Action::List(args) => list::list(args),
	};

	match result {
		Ok(()) => ExitCode::SUCCESS,
		Err(err) => {
			let code = err.exit_code();
			eprintln!("{:?}", miette::Report::new(err));
			code
		}
	}
}
