use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

use crate::errors::{TallyError, TallyResult};

/// Source of bytes for a range scan.
///
/// `read_at_offset` may return fewer bytes than `buf.len()`; the scanner
/// treats that as a short read and advances by what arrived. Returning
/// `Ok(0)` means no more data is available at `offset`.
pub trait RangeReader {
    fn read_at_offset(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;
}

/// Positioned reads against a handle that other workers read concurrently.
///
/// The handle's own cursor is never relied on, so any number of readers can
/// share one `File`.
#[derive(Debug, Clone, Copy)]
pub struct PositionedReader<'a> {
    file: &'a File,
}

impl<'a> PositionedReader<'a> {
    pub fn new(file: &'a File) -> Self {
        Self { file }
    }
}

#[cfg(unix)]
impl RangeReader for PositionedReader<'_> {
    fn read_at_offset(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::unix::fs::FileExt;
        self.file.read_at(buf, offset)
    }
}

#[cfg(windows)]
impl RangeReader for PositionedReader<'_> {
    fn read_at_offset(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        use std::os::windows::fs::FileExt;
        self.file.seek_read(buf, offset)
    }
}

/// A private handle positioned once at the start of the range
#[derive(Debug)]
pub struct SeekingReader {
    file: File,
    cursor: u64,
}

impl SeekingReader {
    /// Opens `path` and seeks to `start`
    pub fn open(path: &Path, start: u64) -> TallyResult<Self> {
        let file = File::open(path).map_err(|e| TallyError::file_open(path, e))?;
        Self::from_file(file, start)
    }

    pub fn from_file(mut file: File, start: u64) -> TallyResult<Self> {
        let cursor = file.seek(SeekFrom::Start(start))?;
        trace!("Positioned private handle at offset {}", cursor);
        Ok(Self { file, cursor })
    }
}

impl RangeReader for SeekingReader {
    fn read_at_offset(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        if offset != self.cursor {
            self.cursor = self.file.seek(SeekFrom::Start(offset))?;
        }
        let n = self.file.read(buf)?;
        self.cursor += n as u64;
        Ok(n)
    }
}

/// In-memory ranges, mostly useful for exercising the scanner without a file
impl<T: AsRef<[u8]>> RangeReader for io::Cursor<T> {
    fn read_at_offset(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.set_position(offset);
        self.read(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_positioned_reader_ignores_handle_cursor() {
        let tmp = temp_file(b"0123456789");
        let file = File::open(tmp.path()).unwrap();

        let mut a = PositionedReader::new(&file);
        let mut b = PositionedReader::new(&file);
        let mut buf = [0u8; 3];

        assert_eq!(a.read_at_offset(7, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"789");
        assert_eq!(b.read_at_offset(2, &mut buf).unwrap(), 3);
        assert_eq!(&buf, b"234");
        assert_eq!(a.read_at_offset(10, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_seeking_reader_starts_at_offset() {
        let tmp = temp_file(b"abcdefgh");
        let mut reader = SeekingReader::open(tmp.path(), 5).unwrap();
        let mut buf = [0u8; 8];

        let n = reader.read_at_offset(5, &mut buf).unwrap();
        assert_eq!(&buf[..n], b"fgh");
        assert_eq!(reader.read_at_offset(8, &mut buf).unwrap(), 0);

        // Asking for an offset other than the cursor repositions the handle
        let n = reader.read_at_offset(1, &mut buf[..2]).unwrap();
        assert_eq!(&buf[..n], b"bc");
    }

    #[test]
    fn test_seeking_reader_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeekingReader::open(&dir.path().join("nope.bin"), 0).unwrap_err();
        assert!(matches!(err, TallyError::FileOpen { .. }));
    }

    #[test]
    fn test_cursor_reader() {
        let mut cursor = io::Cursor::new(vec![1u8, 2, 3, 4]);
        let mut buf = [0u8; 2];
        assert_eq!(cursor.read_at_offset(2, &mut buf).unwrap(), 2);
        assert_eq!(buf, [3, 4]);
        assert_eq!(cursor.read_at_offset(4, &mut buf).unwrap(), 0);
    }
}
