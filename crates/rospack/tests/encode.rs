use rospack::{
	codec::{byte_sum, wrap32},
	decode::Decoder,
	encode::{Encoder, Target},
	header::{Header, Version},
	mirror::Mirror,
	timestamp::Timestamp,
};

fn ts() -> Timestamp {
	Timestamp {
		second: 1,
		minute: 2,
		hour: 3,
		day: 4,
		month: 5,
		year: 2022,
	}
}

fn later() -> Timestamp {
	Timestamp {
		second: 59,
		minute: 58,
		hour: 23,
		day: 28,
		month: 2,
		year: 2024,
	}
}

fn lzma(size: u32, tail: &[u8]) -> Vec<u8> {
	let mut data = vec![0x5D, 0x00, 0x00, 0x80, 0x00];
	data.extend(size.to_le_bytes());
	data.extend(tail);
	data
}

fn pack(target: Target, timestamp: Timestamp, files: &[(&str, Vec<u8>)]) -> Vec<u8> {
	let mut encoder = Encoder::with_timestamp(target, files.len(), timestamp);
	for (name, data) in files {
		encoder.add_file(name, data).unwrap();
	}
	encoder.finalise().unwrap().to_bytes().unwrap()
}

#[test]
fn two_file_scenario_v1() {
	let a = vec![0; 10];
	let b = lzma(7, &[]);
	let bytes = pack(
		Target::Version(Version::V1),
		ts(),
		&[("a.bin", a.clone()), ("b.bin", b.clone())],
	);

	assert_eq!(bytes.len(), 48 + 64 + 10 + 32 + b.len());

	let decoder = Decoder::new(bytes.clone()).unwrap();
	assert_eq!(decoder.header().version(), Version::V1);
	assert_eq!(decoder.header().entry_count(), 2);
	assert_eq!(decoder.header().declared_length(), bytes.len() as u64);

	let entries = decoder.entries().unwrap();
	assert_eq!(entries[0].directory.display_name(), "a.bin");
	assert_eq!(entries[0].directory.offset, 48 + 64);
	assert_eq!(entries[0].directory.length, 10);
	assert!(entries[0].subheader.is_none());

	assert_eq!(entries[1].directory.display_name(), "b.bin");
	assert_eq!(entries[1].directory.offset, 48 + 64 + 10);
	assert_eq!(entries[1].directory.length, 32 + b.len() as u32);
	let subheader = entries[1].subheader.as_ref().unwrap();
	assert_eq!(subheader.uncompressed_size(), 7);

	let payload = decoder.payload(&entries[1].directory).unwrap();
	assert_eq!(&payload[0..4], b"BL01");
	assert_eq!(&payload[20..24], &b[5..9]);
	assert_eq!(&payload[32..], &b[..]);
}

#[test]
fn declared_length_matches_for_both_versions() {
	for version in [Version::V1, Version::V2] {
		let bytes = pack(
			Target::Version(version),
			ts(),
			&[
				("one", vec![1; 100]),
				("two", lzma(1000, &[9; 33])),
				("three", vec![]),
			],
		);
		let header = Header::decode(&bytes).unwrap();
		assert_eq!(header.declared_length(), bytes.len() as u64, "{version}");
		assert_eq!(header.entry_count(), 3);
	}
}

#[test]
fn payload_checksum_covers_everything_after_the_header() {
	for version in [Version::V1, Version::V2] {
		let bytes = pack(
			Target::Version(version),
			ts(),
			&[("x", vec![0xFF; 70_000]), ("y", lzma(3, &[0xEE; 10]))],
		);
		let header = Header::decode(&bytes).unwrap();
		let rest = &bytes[version.header_size()..];
		assert_eq!(header.payload_checksum(), wrap32(u128::from(byte_sum(rest))));
	}
}

#[test]
fn v2_self_checksum() {
	let bytes = pack(
		Target::Version(Version::V2),
		ts(),
		&[("fw.bin", vec![7; 33])],
	);
	let mut head = bytes[..80].to_vec();
	let header_checksum = u32::from_le_bytes(head[12..16].try_into().unwrap());
	head[12..16].fill(0);
	assert_eq!(
		header_checksum.wrapping_add(wrap32(u128::from(byte_sum(&head)))),
		0xFFFF_FFFF
	);

	let length1 = u32::from_le_bytes(bytes[16..20].try_into().unwrap());
	let length2 = u32::from_le_bytes(bytes[48..52].try_into().unwrap());
	assert_eq!(length1 as usize, bytes.len() + 32);
	assert_eq!(length2 as usize, bytes.len() - 80);
}

#[test]
fn payloads_keep_insertion_order() {
	let files = [
		("zeta", vec![b'z'; 5]),
		("alpha", vec![b'a'; 7]),
		("mid", vec![b'm'; 3]),
	];
	let bytes = pack(Target::Version(Version::V2), ts(), &files);

	let decoder = Decoder::new(bytes.clone()).unwrap();
	let entries = decoder.entries().unwrap();
	let mut expected_offset = 80 + 3 * 32;
	for ((name, data), entry) in files.iter().zip(&entries) {
		assert_eq!(entry.directory.display_name(), *name);
		assert_eq!(entry.directory.offset as usize, expected_offset);
		assert_eq!(decoder.payload(&entry.directory).unwrap(), &data[..]);
		expected_offset += data.len();
	}

	assert_eq!(&bytes[80 + 96..], b"zzzzzaaaaaaammm");
}

#[test]
fn entry_count_is_enforced() {
	let mut encoder = Encoder::with_timestamp(Target::Version(Version::V1), 1, ts());
	encoder.add_file("a", &[1]).unwrap();
	assert!(encoder.add_file("b", &[2]).unwrap_err().is_encoding());

	let encoder = Encoder::with_timestamp(Target::Version(Version::V1), 2, ts());
	assert!(encoder.finalise().unwrap_err().is_encoding());
}

#[test]
fn non_ascii_names_are_refused() {
	let mut encoder = Encoder::with_timestamp(Target::Version(Version::V1), 1, ts());
	assert!(encoder.add_file("fïrmware", &[1]).unwrap_err().is_encoding());
}

/// Overwrite the opaque fields of a v2 container, as if it came from the vendor.
fn vendorise(bytes: &mut [u8]) {
	bytes[28..32].copy_from_slice(&[0xA0, 0xA1, 0xA2, 0xA3]);
	bytes[36..40].copy_from_slice(&[0xB0, 0xB1, 0xB2, 0xB3]);
	bytes[40..48].copy_from_slice(&[0x10, 0x20, 0x08, 0x00, 0x11, 0x09, 0xE2, 0x07]);
	bytes[56..64].copy_from_slice(&[0xC0; 8]);
	bytes[64..80].copy_from_slice(b"LGS300-11021\0\0\0\0");

	let decoder = Decoder::new(bytes.to_vec()).unwrap();
	for (index, entry) in decoder.entries().unwrap().iter().enumerate() {
		let at = 80 + index * 32;
		bytes[at + 24..at + 32].copy_from_slice(&[0xE0 + index as u8; 8]);

		if entry.subheader.is_some() {
			let offset = entry.directory.offset as usize;
			bytes[offset + 8..offset + 16].copy_from_slice(&[0x30, 0x40, 0x05, 0x00, 0x01, 0x01, 0x07, 0xE1]);
			bytes[offset + 16..offset + 20].copy_from_slice(&[0xD1; 4]);
			bytes[offset + 24..offset + 32].copy_from_slice(&[0xD2; 8]);
		}
	}
}

#[test]
fn mirroring_recovers_opaque_fields() {
	let files = [
		("kernel", vec![0x11; 64]),
		("rootfs.lzma", lzma(4096, &[0x22; 40])),
		("dtb", vec![0x33; 9]),
	];

	let mut reference = pack(Target::Version(Version::V2), ts(), &files);
	vendorise(&mut reference);

	let mirror = Mirror::new(reference.clone()).unwrap();
	assert_eq!(mirror.version(), Version::V2);
	let rebuilt = pack(Target::Mirror(mirror), later(), &files);

	assert_eq!(rebuilt.len(), reference.len());

	// opaque header fields
	assert_eq!(&rebuilt[28..32], &reference[28..32]);
	assert_eq!(&rebuilt[36..48], &reference[36..48]);
	assert_eq!(&rebuilt[56..80], &reference[56..80]);

	// directory and payloads are identical, opaque bytes included
	assert_eq!(&rebuilt[80..], &reference[80..]);

	// lengths are computed, checksums are recomputed over the mirrored bytes
	assert_eq!(&rebuilt[16..20], &reference[16..20]);
	assert_eq!(&rebuilt[48..52], &reference[48..52]);
	assert_eq!(
		u32::from_le_bytes(rebuilt[52..56].try_into().unwrap()),
		wrap32(u128::from(byte_sum(&rebuilt[80..])))
	);
}

#[test]
fn mirroring_a_rebuilt_container_is_stable() {
	let files = [("boot", lzma(77, &[1, 2, 3])), ("app", vec![0x42; 20])];

	let mut reference = pack(Target::Version(Version::V2), ts(), &files);
	vendorise(&mut reference);

	let first = pack(
		Target::Mirror(Mirror::new(reference).unwrap()),
		later(),
		&files,
	);
	let second = pack(
		Target::Mirror(Mirror::new(first.clone()).unwrap()),
		ts(),
		&files,
	);
	assert_eq!(first, second);
}

#[test]
fn mirroring_v1() {
	let files = [("a.bin", vec![0; 10]), ("b.bin", lzma(7, &[]))];
	let mut reference = pack(Target::Version(Version::V1), ts(), &files);
	reference[8..16].copy_from_slice(&[9, 9, 9, 0, 9, 9, 0xE0, 0x07]);
	reference[28..32].copy_from_slice(&[0xAA; 4]);
	reference[36..48].copy_from_slice(&[0xBB; 12]);
	reference[48 + 24..48 + 32].copy_from_slice(&[0xCC; 8]);

	let rebuilt = pack(
		Target::Mirror(Mirror::new(reference.clone()).unwrap()),
		later(),
		&files,
	);

	assert_eq!(&rebuilt[..20], &reference[..20]);
	assert_eq!(&rebuilt[24..48], &reference[24..48]);
	assert_eq!(&rebuilt[48..], &reference[48..]);
	assert_eq!(
		u32::from_le_bytes(rebuilt[20..24].try_into().unwrap()),
		wrap32(u128::from(byte_sum(&rebuilt[48..])))
	);
}

#[test]
fn unmatched_names_keep_defaults() {
	let mut reference = pack(
		Target::Version(Version::V1),
		ts(),
		&[("other", vec![1, 2, 3])],
	);
	reference[48 + 24..48 + 32].copy_from_slice(&[0xCC; 8]);

	let rebuilt = pack(
		Target::Mirror(Mirror::new(reference).unwrap()),
		ts(),
		&[("mine", lzma(5, &[]))],
	);

	let decoder = Decoder::new(rebuilt).unwrap();
	let entries = decoder.entries().unwrap();
	assert_eq!(entries[0].directory.reserved, [0; 8]);
	let subheader = entries[0].subheader.as_ref().unwrap();
	assert_eq!(subheader.reserved_a, [0; 4]);
	assert_eq!(subheader.reserved_b, [0; 8]);
	assert_eq!(subheader.timestamp, [1, 2, 3, 0, 4, 5, 0x07, 0xE6]);
}
