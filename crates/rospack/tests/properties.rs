//! Invariants that should hold for any input.

use proptest::prelude::*;

use rospack::{
	codec::{byte_sum, wrap32},
	decode::Decoder,
	encode::{Encoder, Target},
	entry::DirectoryEntry,
	header::{Header, HeaderBuilder, Version},
	timestamp::{Timestamp, YearOrder},
};

fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
	(0u8..60, 0u8..60, 0u8..24, 1u8..29, 1u8..13, 1970u16..2100).prop_map(
		|(second, minute, hour, day, month, year)| Timestamp {
			second,
			minute,
			hour,
			day,
			month,
			year,
		},
	)
}

fn version_strategy() -> impl Strategy<Value = Version> {
	prop_oneof![Just(Version::V1), Just(Version::V2)]
}

fn files_strategy() -> impl Strategy<Value = Vec<(String, Vec<u8>)>> {
	prop::collection::vec(
		(
			"[a-z0-9_.-]{1,20}",
			prop_oneof![
				prop::collection::vec(any::<u8>(), 0..200),
				prop::collection::vec(any::<u8>(), 0..200).prop_map(|mut tail| {
					let mut data = vec![0x5D, 0x00];
					data.append(&mut tail);
					data
				}),
			],
		),
		0..6,
	)
}

proptest! {
	#[test]
	fn v2_header_sums_to_all_ones(
		timestamp in timestamp_strategy(),
		entries in 0usize..1000,
		final_offset in 80u64..u64::from(u32::MAX - 32),
		checksum in any::<u128>(),
	) {
		let header = HeaderBuilder::new(Version::V2, timestamp, entries, final_offset, checksum)
			.build()
			.unwrap();
		let mut bytes = header.encode().unwrap();
		let header_checksum = u32::from_le_bytes(bytes[12..16].try_into().unwrap());
		bytes[12..16].fill(0);
		prop_assert_eq!(
			header_checksum.wrapping_add(wrap32(u128::from(byte_sum(&bytes)))),
			0xFFFF_FFFF
		);
	}

	#[test]
	fn names_are_zero_padded(name in "[ -~]{0,40}") {
		let entry = DirectoryEntry::builder(&name, 0, 0).unwrap().build();
		let len = name.len().min(16);
		prop_assert_eq!(&entry.name[..len], &name.as_bytes()[..len]);
		prop_assert!(entry.name[len..].iter().all(|b| *b == 0));
	}

	#[test]
	fn timestamps_read_back(timestamp in timestamp_strategy()) {
		for order in [YearOrder::Little, YearOrder::Big] {
			let bytes = timestamp.to_bytes(order).unwrap();
			prop_assert_eq!(bytes[3], 0);
			prop_assert_eq!(Timestamp::from_bytes(bytes, order).unwrap(), timestamp);
		}
	}

	#[test]
	fn containers_are_self_consistent(
		version in version_strategy(),
		timestamp in timestamp_strategy(),
		files in files_strategy(),
	) {
		let mut encoder = Encoder::with_timestamp(Target::Version(version), files.len(), timestamp);
		for (name, data) in &files {
			encoder.add_file(name, data).unwrap();
		}
		let bytes = encoder.finalise().unwrap().to_bytes().unwrap();

		let header = Header::decode(&bytes).unwrap();
		prop_assert_eq!(header.version(), version);
		prop_assert_eq!(header.entry_count() as usize, files.len());
		prop_assert_eq!(header.declared_length(), bytes.len() as u64);
		prop_assert_eq!(
			header.payload_checksum(),
			wrap32(u128::from(byte_sum(&bytes[version.header_size()..])))
		);

		let decoder = Decoder::new(bytes.clone()).unwrap();
		let mut expected_offset = version.header_size() + files.len() * 32;
		for ((_, data), entry) in files.iter().zip(decoder.entries().unwrap()) {
			prop_assert_eq!(entry.directory.offset as usize, expected_offset);
			let payload = decoder.payload(&entry.directory).unwrap();
			if data.starts_with(&[0x5D, 0x00]) {
				prop_assert_eq!(payload.len(), data.len() + 32);
				prop_assert_eq!(&payload[32..], &data[..]);
			} else {
				prop_assert_eq!(payload, &data[..]);
			}
			expected_offset += payload.len();
		}
		prop_assert_eq!(expected_offset, bytes.len());
	}
}
