use std::fs::File;
use std::io::{self, Cursor, Seek, Write};

/// A sink that supports random-access overwrite.
///
/// Appending only needs `Write`; patching header fields after the fact needs
/// this capability, so `WavWriter::finalize` is only available on seekable sinks.
pub trait SeekableWriter: Write + Seek {
    /// Cut the sink to `len` bytes, dropping anything a failed write left past it.
    fn truncate_to(&mut self, len: u64) -> io::Result<()>;
}

impl SeekableWriter for File {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

impl SeekableWriter for Cursor<Vec<u8>> {
    fn truncate_to(&mut self, len: u64) -> io::Result<()> {
        let len = usize::try_from(len).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        self.get_mut().truncate(len);
        if self.position() > len as u64 {
            self.set_position(len as u64);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_truncate_clamps_position() {
        let mut cursor = Cursor::new(vec![0u8; 10]);
        cursor.set_position(10);
        cursor.truncate_to(4).unwrap();
        assert_eq!(cursor.get_ref().len(), 4);
        assert_eq!(cursor.position(), 4);
    }
}
