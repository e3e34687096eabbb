//! Fixed values of the ROS container format.

/// Signature marker, found at [`SIGNATURE_OFFSET`] in both header versions.
pub const SIGNATURE: [u8; 4] = *b"PACK";

/// Byte offset of the signature in a container.
pub const SIGNATURE_OFFSET: usize = 24;

/// Byte offset of the format index in a container.
pub const FORMAT_INDEX_OFFSET: usize = 4;

/// Magic of a version 1 header.
pub const V1_MAGIC: [u8; 4] = *b"LS23";

/// Format index of a version 1 header.
pub const V1_FORMAT_INDEX: [u8; 4] = *b"1.01";

/// Size in bytes of a version 1 header.
pub const V1_HEADER_SIZE: usize = 48;

/// Magic of a version 2 header.
pub const V2_MAGIC: [u8; 4] = *b"BL01";

/// Format index of a version 2 header.
pub const V2_FORMAT_INDEX: [u8; 4] = *b"2.00";

/// Size in bytes of a version 2 header.
pub const V2_HEADER_SIZE: usize = 80;

/// Default firmware version field of a version 2 header.
pub const V2_DEFAULT_FIRMWARE_VERSION: [u8; 16] = *b"Firmware\0\0\0\0\0\0\0\0";

/// Size in bytes of a directory entry.
pub const ENTRY_SIZE: usize = 32;

/// Width in bytes of the name field of a directory entry.
pub const ENTRY_NAME_WIDTH: usize = 16;

/// Magic of a compression sub-header.
pub const SUBHEADER_MAGIC: [u8; 4] = *b"BL01";

/// Format index of a compression sub-header.
pub const SUBHEADER_FORMAT_INDEX: [u8; 4] = *b"2.00";

/// Size in bytes of a compression sub-header.
pub const SUBHEADER_SIZE: usize = 32;

/// First two bytes of a payload that gets a compression sub-header.
///
/// This is `0x005D` in little-endian, the usual start of an LZMA stream.
pub const LZMA_MARKER: [u8; 2] = [0x5D, 0x00];

/// Where the uncompressed size lives in an LZMA payload.
pub const LZMA_SIZE_RANGE: std::ops::Range<usize> = 5..9;

/// Number of 16-byte steps taken when scanning a mirror for a name.
pub const MIRROR_SCAN_STEPS: usize = 60;

/// Stride in bytes of the mirror name scan.
pub const MIRROR_SCAN_STRIDE: usize = 16;
