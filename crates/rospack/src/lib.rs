//! Rospack: encoder for the ROS firmware container format.
//!
//! A ROS container is a header, a directory of fixed 32-byte entries, and the payload of each
//! entry, all concatenated. Payloads that are LZMA streams get a 32-byte sub-header. Many header
//! and entry fields are not understood; they can be copied from an existing container with a
//! [`Mirror`](mirror::Mirror).
//!
//! ```no_run
//! use rospack::{encode::{Encoder, Target}, header::Version};
//!
//! # fn main() -> rospack::error::Result<()> {
//! let mut encoder = Encoder::new(Target::Version(Version::V2), 2)?;
//! encoder.add_file("kernel.bin", &std::fs::read("kernel.bin")?)?;
//! encoder.add_file("rootfs.lzma", &std::fs::read("rootfs.lzma")?)?;
//! encoder.finalise()?.save("container.ros".as_ref())?;
//! # Ok(())
//! # }
//! ```

#![warn(clippy::unwrap_used, missing_docs)]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod codec;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod entry;
pub mod error;
pub mod header;
pub mod mirror;
pub mod subheader;
pub mod timestamp;
