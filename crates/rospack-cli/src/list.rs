use std::path::PathBuf;

use clap::{Parser, ValueHint};
use rospack::decode::Decoder;
use tracing::info;

use crate::error::CliError;

#[derive(Debug, Clone, Parser)]
pub struct ListArgs {
	/// Input file.
	#[arg(
		value_hint = ValueHint::FilePath,
		value_name = "PATH",
	)]
	pub input: PathBuf,
}

pub(crate) fn list(args: ListArgs) -> Result<(), CliError> {
	info!(path = ?args.input, "initialise decoder");
	let container = Decoder::open(&args.input)?;
	let header = container.header();

	println!("{}", header.version());
	match header.timestamp() {
		Ok(timestamp) => println!("timestamp: {timestamp}"),
		Err(err) => println!("timestamp: {:02x?} ({err})", header.timestamp_bytes()),
	}
	println!(
		"length: {} declared, {} actual",
		header.declared_length(),
		container.file_length()
	);
	println!("checksum: {:#010x}", header.payload_checksum());
	println!("entries: {}", header.entry_count());

	info!("list entries");
	for entry in container.entries()? {
		let dir = &entry.directory;
		print!(
			"{:<16}  offset {:>10}  length {:>10}",
			dir.display_name(),
			dir.offset,
			dir.length
		);
		if let Some(sub) = &entry.subheader {
			print!("  lzma, {} bytes uncompressed", sub.uncompressed_size());
		}
		println!();
	}

	Ok(())
}
