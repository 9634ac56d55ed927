//! Chunked scanning of a single byte range.
//!
//! A worker owns one [`ByteRange`](crate::partition::ByteRange) and walks it
//! with reads no larger than the configured read step, reusing one buffer for
//! the whole range. How the bytes are fetched is abstracted by [`RangeReader`]:
//!
//! - [`PositionedReader`] issues positioned reads against a handle shared by
//!   every rank of the distributed model
//! - [`SeekingReader`] owns a private handle, seeks once to the range start
//!   and reads sequentially, as each shared-memory task does
//!
//! Both only ever touch bytes inside the range they were asked for.
pub mod reader;
pub mod scanner;

pub use reader::{PositionedReader, RangeReader, SeekingReader};
pub use scanner::{count_byte, scan_file, ChunkedScanner, DEFAULT_TARGET_BYTE};
