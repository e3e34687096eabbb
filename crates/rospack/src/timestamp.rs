//! Timestamps as stored in headers and sub-headers.
//!
//! Both places store eight bytes: second, minute, hour, a reserved byte, day, month, and a
//! 16-bit year. Headers store the year little-endian, sub-headers store it big-endian.

use std::fmt;

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike};
use deku::prelude::*;

use crate::{
	codec::fit,
	error::{ErrorKind, Result, SimpleError},
};

/// Wall-clock timestamp, split into the components the format stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timestamp {
	/// Seconds, 0-59.
	pub second: u8,
	/// Minutes, 0-59.
	pub minute: u8,
	/// Hours, 0-23.
	pub hour: u8,
	/// Day of the month, 1-31.
	pub day: u8,
	/// Month, 1-12.
	pub month: u8,
	/// Full year.
	pub year: u16,
}

/// Byte order of the year component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YearOrder {
	/// As in container headers.
	Little,
	/// As in compression sub-headers.
	Big,
}

#[derive(Clone, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "little")]
struct HeaderTime {
	second: u8,
	minute: u8,
	hour: u8,
	reserved: u8,
	day: u8,
	month: u8,
	year: u16,
}

#[derive(Clone, Debug, PartialEq, Eq, DekuRead, DekuWrite)]
#[deku(endian = "big")]
struct SubheaderTime {
	second: u8,
	minute: u8,
	hour: u8,
	reserved: u8,
	day: u8,
	month: u8,
	year: u16,
}

impl Timestamp {
	/// The current local date and time.
	pub fn now() -> Result<Self> {
		Self::from_datetime(&Local::now())
	}

	/// Split a chrono datetime into components.
	///
	/// Fails if the year doesn't fit in 16 bits.
	pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Result<Self> {
		// chrono bounds the sub-year components well within a byte
		Ok(Self {
			second: dt.second() as u8,
			minute: dt.minute() as u8,
			hour: dt.hour() as u8,
			day: dt.day() as u8,
			month: dt.month() as u8,
			year: fit("year", dt.year())?,
		})
	}

	/// Encode to the eight on-disk bytes.
	pub fn to_bytes(&self, order: YearOrder) -> Result<[u8; 8]> {
		let bytes = match order {
			YearOrder::Little => HeaderTime {
				second: self.second,
				minute: self.minute,
				hour: self.hour,
				reserved: 0,
				day: self.day,
				month: self.month,
				year: self.year,
			}
			.to_bytes(),
			YearOrder::Big => SubheaderTime {
				second: self.second,
				minute: self.minute,
				hour: self.hour,
				reserved: 0,
				day: self.day,
				month: self.month,
				year: self.year,
			}
			.to_bytes(),
		}
		.map_err(SimpleError::from_deku_write)?;

		bytes.try_into().map_err(|bytes: Vec<u8>| {
			SimpleError::from(ErrorKind::Serialise)
				.with_message(format!("timestamp encoded to {} bytes", bytes.len()))
				.into()
		})
	}

	/// Decode from the eight on-disk bytes.
	///
	/// The reserved byte is ignored. Nothing is validated: mirrored timestamps are opaque and
	/// may not be a real date at all.
	pub fn from_bytes(bytes: [u8; 8], order: YearOrder) -> Result<Self> {
		let parsed = match order {
			YearOrder::Little => {
				let (_, t) =
					HeaderTime::from_bytes((bytes.as_slice(), 0)).map_err(SimpleError::from_deku)?;
				(t.second, t.minute, t.hour, t.day, t.month, t.year)
			}
			YearOrder::Big => {
				let (_, t) =
					SubheaderTime::from_bytes((bytes.as_slice(), 0)).map_err(SimpleError::from_deku)?;
				(t.second, t.minute, t.hour, t.day, t.month, t.year)
			}
		};

		let (second, minute, hour, day, month, year) = parsed;
		Ok(Self {
			second,
			minute,
			hour,
			day,
			month,
			year,
		})
	}
}

impl fmt::Display for Timestamp {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(
			f,
			"{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
			self.year, self.month, self.day, self.hour, self.minute, self.second
		)
	}
}

#[cfg(test)]
mod tests {
	use chrono::NaiveDate;

	use super::*;

	fn sample() -> Timestamp {
		Timestamp {
			second: 5,
			minute: 4,
			hour: 3,
			day: 2,
			month: 1,
			year: 2019,
		}
	}

	#[test]
	fn header_year_is_little_endian() {
		assert_eq!(
			sample().to_bytes(YearOrder::Little).unwrap(),
			[5, 4, 3, 0, 2, 1, 0xE3, 0x07]
		);
	}

	#[test]
	fn subheader_year_is_big_endian() {
		assert_eq!(
			sample().to_bytes(YearOrder::Big).unwrap(),
			[5, 4, 3, 0, 2, 1, 0x07, 0xE3]
		);
	}

	#[test]
	fn decode_matches_encode() {
		let bytes = sample().to_bytes(YearOrder::Big).unwrap();
		assert_eq!(Timestamp::from_bytes(bytes, YearOrder::Big).unwrap(), sample());
	}

	#[test]
	fn from_chrono() {
		let dt = NaiveDate::from_ymd_opt(2021, 12, 31)
			.unwrap()
			.and_hms_opt(23, 59, 58)
			.unwrap()
			.and_utc();
		let ts = Timestamp::from_datetime(&dt).unwrap();
		assert_eq!(ts.to_string(), "2021-12-31 23:59:58");
	}
}
